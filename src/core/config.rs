use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::builders::reporter::OutputMode;
use crate::builders::selector::{DEFAULT_EXCLUDES, DEFAULT_INCLUDES};
use crate::builders::storage::{ADAPTERS_FILE_NAME, state_dir};
use crate::builders::validator::{ConfigValidator, StandardValidator};

pub const CONFIG_VERSION: &str = "1.0";
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Placeholder replaced with the environment name in `properties_path`.
pub const ENV_PLACEHOLDER: &str = "{env}";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalSettings {
    pub verbose: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self { verbose: false }
    }
}

/// Defaults for `ip-port`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanSettings {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub output: OutputMode,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            include: DEFAULT_INCLUDES.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            output: OutputMode::Csv,
        }
    }
}

/// Defaults for `flip-adapters`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FlipSettings {
    pub output: OutputMode,
    pub dry_run: bool,
    pub branch_prefix: String,
    /// Path of the properties file relative to the repository root.
    pub properties_path: String,
    pub pr_body: String,
}

impl Default for FlipSettings {
    fn default() -> Self {
        Self {
            output: OutputMode::Table,
            dry_run: true,
            branch_prefix: "toggle/adapters-".to_string(),
            properties_path: format!("env/{ENV_PLACEHOLDER}/parameters.properties"),
            pr_body: "Automated via aca flip-adapters.".to_string(),
        }
    }
}

impl FlipSettings {
    /// Resolves the properties path for one environment.
    pub fn properties_path_for(&self, env: &str) -> PathBuf {
        PathBuf::from(self.properties_path.replace(ENV_PLACEHOLDER, env))
    }

    pub fn branch_for(&self, env: &str) -> String {
        format!("{}{}", self.branch_prefix, env)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct StoreSettings {
    /// Overrides `~/.gh-aca-utils/adapters.txt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapters_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AcaConfig {
    pub version: String,
    pub scan: ScanSettings,
    pub flip: FlipSettings,
    pub store: StoreSettings,
    pub global_settings: GlobalSettings,
}

impl Default for AcaConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            scan: ScanSettings::default(),
            flip: FlipSettings::default(),
            store: StoreSettings::default(),
            global_settings: GlobalSettings::default(),
        }
    }
}

impl AcaConfig {
    /// Where the adapter store lives for this configuration.
    pub fn adapters_file(&self) -> Result<PathBuf> {
        match &self.store.adapters_file {
            Some(path) => Ok(path.clone()),
            None => Ok(state_dir()?.join(ADAPTERS_FILE_NAME)),
        }
    }
}

/// Serialization formats accepted for the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension; anything unknown is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    pub fn parse(self, content: &str) -> Result<AcaConfig> {
        match self {
            ConfigFormat::Toml => toml::from_str(content).context("Failed to parse TOML config"),
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML config")
            }
            ConfigFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON config")
            }
        }
    }

    pub fn serialize(self, config: &AcaConfig) -> Result<String> {
        match self {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).context("Failed to serialize config to TOML")
            }
            ConfigFormat::Yaml => {
                serde_yaml::to_string(config).context("Failed to serialize config to YAML")
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(config).context("Failed to serialize config to JSON")
            }
        }
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<AcaConfig>;
    fn save_config(&self, config: &AcaConfig) -> Result<()>;
    fn get_config_path(&self) -> Result<PathBuf>;
}

/// Locates, loads and validates the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Uses `path` when given; otherwise `~/.gh-aca-utils/config.toml`.
    ///
    /// An explicitly given file must exist. The default file is optional and
    /// built-in defaults apply when it is missing.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(config_path) => Ok(Self::new_at(config_path)),
            None => Ok(Self {
                config_path: state_dir()?.join(CONFIG_FILE_NAME),
                explicit: false,
            }),
        }
    }

    pub fn new_at(config_path: PathBuf) -> Self {
        Self {
            config_path,
            explicit: true,
        }
    }

    /// Writes a default configuration unless one already exists.
    /// Returns `true` when a file was written.
    pub fn initialize(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        self.save_config(&AcaConfig::default())?;
        Ok(true)
    }

    /// Loads the configuration and fails when validation reports issues.
    pub fn load_validated(&self) -> Result<AcaConfig> {
        let config = self.load_config()?;
        let issues = StandardValidator::new().validate_config(&config)?;
        if !issues.is_empty() {
            anyhow::bail!(
                "Configuration validation failed ({}):\n  - {}",
                self.config_path.display(),
                issues.join("\n  - ")
            );
        }
        Ok(config)
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<AcaConfig> {
        if !self.config_path.exists() {
            if self.explicit {
                anyhow::bail!("Config file not found: {}", self.config_path.display());
            }
            debug!(path = %self.config_path.display(), "no config file; using defaults");
            return Ok(AcaConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;
        debug!(path = %self.config_path.display(), "loaded config file");
        ConfigFormat::from_path(&self.config_path).parse(&content)
    }

    fn save_config(&self, config: &AcaConfig) -> Result<()> {
        let content = ConfigFormat::from_path(&self.config_path).serialize(config)?;
        fs::write(&self.config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.config_path.clone())
    }
}

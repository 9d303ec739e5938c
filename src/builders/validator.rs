use anyhow::Result;
use std::collections::HashSet;

use crate::builders::selector::compile_glob;
use crate::core::config::{self, AcaConfig};

/// The `ConfigValidator` trait defines the public interface for validating the
/// tool's configuration.
///
/// This trait allows for the implementation of different validation strategies,
/// such as a strict validator or a more permissive one, by adhering to a common
/// set of methods.
pub trait ConfigValidator {
    /// Performs a full validation of the `AcaConfig` and returns a list of
    /// issues found. An empty list means the configuration is usable.
    fn validate_config(&self, config: &AcaConfig) -> Result<Vec<String>>;

    /// Validates one list of glob patterns.
    ///
    /// # Arguments
    /// * `label`: Name of the setting, used in messages.
    /// * `patterns`: The glob patterns to compile.
    fn validate_globs(&self, label: &str, patterns: &[String]) -> Vec<String>;
}

/// The `StandardValidator` performs the checks every command relies on before
/// it touches a repository.
pub struct StandardValidator;

impl StandardValidator {
    /// Creates a new instance of `StandardValidator`.
    pub fn new() -> Self {
        Self
    }

    /// Reports glob patterns that appear more than once in the same list.
    fn check_duplicate_globs(&self, label: &str, patterns: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        patterns
            .iter()
            .filter(|p| !seen.insert(p.as_str()))
            .map(|p| format!("Duplicate {label} pattern: {p}"))
            .collect()
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    fn validate_config(&self, config: &AcaConfig) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if config.version != config::CONFIG_VERSION {
            issues.push(format!("Unsupported config version: {}", config.version));
        }

        issues.extend(self.validate_globs("include", &config.scan.include));
        issues.extend(self.validate_globs("exclude", &config.scan.exclude));

        if !config.flip.properties_path.contains(config::ENV_PLACEHOLDER) {
            issues.push(format!(
                "flip.properties_path must contain {}: {}",
                config::ENV_PLACEHOLDER,
                config.flip.properties_path
            ));
        }
        if config.flip.branch_prefix.trim().is_empty() {
            issues.push("flip.branch_prefix cannot be empty".to_string());
        }

        Ok(issues)
    }

    fn validate_globs(&self, label: &str, patterns: &[String]) -> Vec<String> {
        let mut issues: Vec<String> = patterns
            .iter()
            .filter_map(|p| {
                compile_glob(p)
                    .err()
                    .map(|e| format!("Invalid {label} pattern {p}: {e}"))
            })
            .collect();
        issues.extend(self.check_duplicate_globs(label, patterns));
        issues
    }
}

/// Checks a repository identifier such as `ORG/REPO`.
///
/// The value is handed to `gh` and `git` as an argument, so it must not look
/// like an option.
pub fn validate_repo(repo: &str) -> Result<()> {
    let repo = repo.trim();
    if repo.is_empty() {
        anyhow::bail!("--repo ORG/REPO is required");
    }
    if repo.starts_with('-') {
        anyhow::bail!("invalid repository identifier: {repo:?}");
    }
    Ok(())
}

/// Checks an environment name used as a single directory under `env/` and
/// returns it without trailing path separators.
pub fn validate_env_name(env: &str) -> Result<&str> {
    if env.is_empty() {
        anyhow::bail!("--env is required (e.g., dev)");
    }
    let env = env.trim_end_matches(['/', '\\']);
    if env.is_empty() || env == "." || env.contains("..") || env.contains('/') || env.contains('\\') {
        anyhow::bail!("invalid environment name: {env:?}");
    }
    Ok(env)
}

/// Rejects an adapter list that is empty or contains an empty name.
pub fn validate_adapter_names(adapters: &[String]) -> Result<()> {
    if adapters.is_empty() {
        anyhow::bail!("no valid adapters provided");
    }
    if let Some(bad) = adapters.iter().find(|a| a.trim().is_empty()) {
        anyhow::bail!("empty adapter name not allowed: {bad:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let issues = StandardValidator::new()
            .validate_config(&AcaConfig::default())
            .unwrap();
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_config_issues_are_collected() {
        let mut config = AcaConfig::default();
        config.version = "2.0".to_string();
        config.scan.include = vec!["[".to_string(), "**/*.ini".to_string(), "**/*.ini".to_string()];
        config.flip.branch_prefix = " ".to_string();
        let issues = StandardValidator::new().validate_config(&config).unwrap();
        assert_eq!(issues.len(), 4, "{issues:?}");
        assert!(issues[0].contains("Unsupported config version"));
        assert!(issues.iter().any(|i| i.starts_with("Invalid include pattern [")));
        assert!(issues.iter().any(|i| i.starts_with("Duplicate include pattern")));
    }

    #[test]
    fn test_validate_repo() {
        assert!(validate_repo("org/repo").is_ok());
        assert!(validate_repo("").unwrap_err().to_string().contains("repo"));
        assert!(validate_repo("--upload-pack=evil").is_err());
    }

    #[test]
    fn test_validate_env_name() {
        assert_eq!(validate_env_name("dev").unwrap(), "dev");
        assert_eq!(validate_env_name("dev/").unwrap(), "dev");
        assert_eq!(validate_env_name("dev\\").unwrap(), "dev");
        for bad in ["", ".", "..", "/", "./", "../prod", "a/b", "a\\b"] {
            assert!(validate_env_name(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_adapter_names() {
        assert!(validate_adapter_names(&["a".to_string()]).is_ok());
        assert!(validate_adapter_names(&[]).is_err());
        assert!(validate_adapter_names(&["a".to_string(), "  ".to_string()]).is_err());
    }
}

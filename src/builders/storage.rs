use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Directory under the user's home that holds the tool's state.
pub const STATE_DIR_NAME: &str = ".gh-aca-utils";
pub const ADAPTERS_FILE_NAME: &str = "adapters.txt";

/// Persists the default list of adapter names between invocations.
pub trait AdapterStore {
    /// Replaces the stored list.
    fn save(&mut self, adapters: &[String]) -> Result<()>;
    /// Returns the stored list; empty when nothing has been stored yet.
    fn load(&self) -> Result<Vec<String>>;
    /// Removes the stored list. Clearing an empty store succeeds.
    fn clear(&mut self) -> Result<()>;
    /// Human-readable location, used in messages.
    fn location(&self) -> String;
}

/// Stores one adapter name per line in a plain text file.
pub struct FileAdapterStore {
    path: PathBuf,
}

impl FileAdapterStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl AdapterStore for FileAdapterStore {
    fn save(&mut self, adapters: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create adapter store directory")?;
        }
        let mut content = adapters.join("\n");
        content.push('\n');
        fs::write(&self.path, content).context("Failed to write adapter file")?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read adapter file {}", self.path.display())
                });
            }
        };
        Ok(parse_adapter_list(&content))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to clear adapters file"),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the list in memory; nothing survives the process.
#[derive(Default)]
pub struct MemoryAdapterStore {
    adapters: Vec<String>,
}

impl MemoryAdapterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdapterStore for MemoryAdapterStore {
    fn save(&mut self, adapters: &[String]) -> Result<()> {
        self.adapters = adapters.to_vec();
        Ok(())
    }

    fn load(&self) -> Result<Vec<String>> {
        Ok(self.adapters.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.adapters.clear();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Parses stored content: CRLF is normalized, lines are trimmed, and blank
/// lines and `#` comments are dropped.
pub fn parse_adapter_list(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `~/.gh-aca-utils`, resolved from `HOME` (or `USERPROFILE` on Windows).
pub fn state_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("Failed to get home directory")?;
    Ok(PathBuf::from(home).join(STATE_DIR_NAME))
}

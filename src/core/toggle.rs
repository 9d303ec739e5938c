use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::builders::properties::PropertiesFile;

/// One adapter flip. `old` and `new` are always `"0"` and `"1"` in some order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "adapter")]
    pub adapter_key: String,
    #[serde(rename = "old")]
    pub old_value: String,
    #[serde(rename = "new")]
    pub new_value: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

/// Why a requested adapter was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No key/value line in the file carries the adapter key.
    NotFound,
    /// The value is something other than `0` or `1`; it is kept for reporting.
    NonBinaryValue(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "not found"),
            SkipReason::NonBinaryValue(_) => write!(f, "non-binary value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub key: String,
    pub reason: SkipReason,
}

/// Everything a toggle run produced.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    /// The reconstructed file content. Equal to the input when nothing changed.
    pub content: String,
    pub changes: Vec<ChangeRecord>,
    pub skipped: Vec<Skip>,
}

impl ToggleOutcome {
    /// `true` when the caller must not write anything back.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// `true` when keys were requested but every one of them was skipped.
    pub fn all_failed(&self) -> bool {
        self.changes.is_empty() && !self.skipped.is_empty()
    }
}

/// Flips binary adapter flags inside a properties file.
///
/// # Arguments
/// * `content`: The full file content.
/// * `requested`: Adapter keys in the order they should be applied. Repeated
///   keys are applied once.
/// * `file_path`: Label recorded on every `ChangeRecord`.
///
/// # Returns
/// The new content, one `ChangeRecord` per flipped key and one `Skip` per key
/// that was absent or held a non-binary value. Untouched lines are carried
/// over verbatim; flipped lines are rewritten as `key=value`.
pub fn toggle<S: AsRef<str>>(content: &str, requested: &[S], file_path: &str) -> ToggleOutcome {
    let mut file = PropertiesFile::parse(content);
    let mut changes = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = Vec::<&str>::new();

    for key in requested.iter().map(AsRef::as_ref) {
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let Some(current) = file.value(key) else {
            warn!(adapter = key, file = file_path, "adapter not found");
            skipped.push(Skip {
                key: key.to_string(),
                reason: SkipReason::NotFound,
            });
            continue;
        };

        let flipped = match current.as_str() {
            "0" => "1",
            "1" => "0",
            _ => {
                warn!(
                    adapter = key,
                    value = current.as_str(),
                    file = file_path,
                    "adapter has non-binary value; skipping"
                );
                skipped.push(Skip {
                    key: key.to_string(),
                    reason: SkipReason::NonBinaryValue(current),
                });
                continue;
            }
        };

        file.set(key, flipped);
        debug!(adapter = key, old = current.as_str(), new = flipped, "flipped adapter");
        changes.push(ChangeRecord {
            adapter_key: key.to_string(),
            old_value: current,
            new_value: flipped.to_string(),
            file_path: file_path.to_string(),
        });
    }

    let content = if changes.is_empty() {
        content.to_string()
    } else {
        file.render()
    };

    ToggleOutcome {
        content,
        changes,
        skipped,
    }
}

use std::collections::HashMap;

use crate::builders::patterns::{classify, is_comment_or_blank};

/// One physical line of a properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLine {
    /// The line exactly as read, without the `\n` terminator. A `\r` from a
    /// CRLF file stays part of the line.
    pub raw: String,
    /// The key when the line classified as a pair.
    pub key: Option<String>,
}

/// The full, ordered line set of one properties file.
///
/// Every line is retained so the file can be written back byte-for-byte,
/// except for the lines that were explicitly rewritten.
#[derive(Debug, Clone, Default)]
pub struct PropertiesFile {
    lines: Vec<PropertyLine>,
    index: HashMap<String, usize>,
}

impl PropertiesFile {
    /// Splits `content` on `\n` and indexes every key/value line.
    ///
    /// Comment and blank lines are never indexed. When a key appears more than
    /// once, the last occurrence wins.
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();
        let mut index = HashMap::new();

        for (idx, raw) in content.split('\n').enumerate() {
            let key = if is_comment_or_blank(raw) {
                None
            } else {
                let parsed = classify(raw);
                parsed.matched.then_some(parsed.key)
            };
            if let Some(key) = &key {
                index.insert(key.clone(), idx);
            }
            lines.push(PropertyLine {
                raw: raw.to_string(),
                key,
            });
        }

        Self { lines, index }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[PropertyLine] {
        &self.lines
    }

    /// Index of the line that holds `key`, if any.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Current trimmed value of `key`, re-read from its line.
    pub fn value(&self, key: &str) -> Option<String> {
        let idx = self.position(key)?;
        let parsed = classify(&self.lines[idx].raw);
        parsed.matched.then(|| parsed.value.trim().to_string())
    }

    /// Rewrites the line holding `key` as `key=value`.
    ///
    /// The separator and spacing of the original line are not preserved.
    /// Returns `false` when the key is not indexed.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.position(key) {
            Some(idx) => {
                self.lines[idx].raw = format!("{key}={value}");
                true
            }
            None => false,
        }
    }

    /// Joins all lines back together with `\n`.
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.raw.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

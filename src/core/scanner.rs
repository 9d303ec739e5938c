use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::builders::matchers::{find_first_ip, find_inline_port, looks_like_ip, looks_like_port};
use crate::builders::patterns::{classify, strip_quotes};

/// A single IP and/or port finding on one line of one file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "ipKey")]
    pub ip_key: String,
    #[serde(rename = "ipValue")]
    pub ip_value: String,
    #[serde(rename = "portKey")]
    pub port_key: String,
    #[serde(rename = "portValue")]
    pub port_value: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// 1-based physical line number.
    #[serde(rename = "lineNumber")]
    pub line_number: usize,
}

impl MatchRecord {
    fn is_empty(&self) -> bool {
        self.ip_key.is_empty()
            && self.ip_value.is_empty()
            && self.port_key.is_empty()
            && self.port_value.is_empty()
    }
}

/// A file the scan had to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub records: Vec<MatchRecord>,
    pub warnings: Vec<ScanWarning>,
}

/// Examines one line. Returns `None` for blank lines and lines with no finding.
///
/// Key/value lines are judged on their key and value. Anything else falls
/// back to searching the raw text for an IP literal and an inline port token.
pub fn scan_line(line: &str, file_path: &str, line_number: usize) -> Option<MatchRecord> {
    if line.trim().is_empty() {
        return None;
    }

    let mut record = MatchRecord {
        file_path: file_path.to_string(),
        line_number,
        ..MatchRecord::default()
    };

    match classify(line).as_pair() {
        Some((key, value)) => {
            if looks_like_ip(value) {
                record.ip_key = key.to_string();
                record.ip_value = strip_quotes(value).to_string();
            }
            if looks_like_port(key, value) {
                record.port_key = key.to_string();
                record.port_value = strip_quotes(value).to_string();
            }
        }
        None => {
            if let Some(ip) = find_first_ip(line) {
                record.ip_value = ip.to_string();
            }
            if let Some((key, value)) = find_inline_port(line) {
                record.port_key = key;
                record.port_value = value;
            }
        }
    }

    (!record.is_empty()).then_some(record)
}

/// Scans in-memory text. Lines are split on `\n` with a trailing `\r`
/// dropped, and a final line without a terminator still counts.
pub fn scan_text(text: &str, file_path: &str) -> Vec<MatchRecord> {
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| scan_line(line, file_path, idx + 1))
        .collect()
}

/// The Scan Engine: turns a list of already-selected files into match records.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Reports file paths relative to `root`, with `/` separators. Paths
    /// outside `root` are reported as given.
    pub fn relative_to<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn display_path(&self, path: &Path) -> String {
        let shown = path.strip_prefix(&self.root).unwrap_or(path);
        shown.to_string_lossy().replace('\\', "/")
    }

    /// Scans every file and returns records ordered by file path, then line.
    ///
    /// Unreadable files are skipped and reported as warnings; findings from
    /// the remaining files are kept.
    pub fn scan<P: AsRef<Path>>(&self, files: &[P]) -> ScanReport {
        let mut ordered: Vec<(String, &Path)> = files
            .iter()
            .map(|p| (self.display_path(p.as_ref()), p.as_ref()))
            .collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut report = ScanReport::default();
        for (shown, path) in ordered {
            match fs::read(path) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    let found = scan_text(&text, &shown);
                    debug!(file = %shown, findings = found.len(), "scanned file");
                    report.records.extend(found);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable file");
                    report.warnings.push(ScanWarning {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

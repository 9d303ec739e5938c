use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::core::scanner::MatchRecord;
use crate::core::toggle::ChangeRecord;

/// The output formats a report can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Csv,
    Table,
    Json,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Csv => write!(f, "csv"),
            OutputMode::Table => write!(f, "table"),
            OutputMode::Json => write!(f, "json"),
        }
    }
}

const MATCH_CSV_HEADER: [&str; 6] = [
    "IP Key",
    "IP Value",
    "Port Key",
    "Port Value",
    "File Path",
    "Line Number",
];
const MATCH_TABLE_HEADER: [&str; 6] = [
    "IP Key",
    "IP Value",
    "Port Key",
    "Port Value",
    "File Path",
    "Line",
];
const CHANGE_HEADER: [&str; 4] = ["Adapter", "Old", "New", "File"];

/// Renders scan findings and adapter changes.
///
/// Writing to a `dyn Write` keeps the commands printing to stdout while tests
/// render into a buffer.
pub trait ReportRenderer {
    fn render_matches(&self, out: &mut dyn Write, records: &[MatchRecord]) -> Result<()>;
    fn render_changes(&self, out: &mut dyn Write, changes: &[ChangeRecord]) -> Result<()>;
}

/// The renderer behind every command's output.
pub struct ConsoleReporter {
    mode: OutputMode,
}

impl ConsoleReporter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn write_json<T: Serialize>(out: &mut dyn Write, rows: &T) -> Result<()> {
        let body = serde_json::to_string_pretty(rows).context("Failed to encode JSON report")?;
        writeln!(out, "{body}")?;
        Ok(())
    }

    fn write_csv_row(out: &mut dyn Write, fields: &[&str]) -> Result<()> {
        let row = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{row}")?;
        Ok(())
    }
}

impl ReportRenderer for ConsoleReporter {
    fn render_matches(&self, out: &mut dyn Write, records: &[MatchRecord]) -> Result<()> {
        match self.mode {
            OutputMode::Csv => {
                writeln!(out, "{}", MATCH_CSV_HEADER.join(","))?;
                for r in records {
                    let line = r.line_number.to_string();
                    Self::write_csv_row(
                        out,
                        &[
                            r.ip_key.as_str(),
                            r.ip_value.as_str(),
                            r.port_key.as_str(),
                            r.port_value.as_str(),
                            r.file_path.as_str(),
                            line.as_str(),
                        ],
                    )?;
                }
            }
            OutputMode::Table => {
                let mut table = TextTable::new();
                table.add_row(MATCH_TABLE_HEADER);
                for r in records {
                    table.add_row([
                        r.ip_key.clone(),
                        r.ip_value.clone(),
                        r.port_key.clone(),
                        r.port_value.clone(),
                        r.file_path.clone(),
                        r.line_number.to_string(),
                    ]);
                }
                table.render(out)?;
            }
            OutputMode::Json => Self::write_json(out, &records)?,
        }
        Ok(())
    }

    fn render_changes(&self, out: &mut dyn Write, changes: &[ChangeRecord]) -> Result<()> {
        match self.mode {
            OutputMode::Csv => {
                writeln!(out, "{}", CHANGE_HEADER.join(","))?;
                for c in changes {
                    Self::write_csv_row(
                        out,
                        &[
                            c.adapter_key.as_str(),
                            c.old_value.as_str(),
                            c.new_value.as_str(),
                            c.file_path.as_str(),
                        ],
                    )?;
                }
            }
            OutputMode::Table => {
                let mut table = TextTable::new();
                table.add_row(CHANGE_HEADER);
                for c in changes {
                    table.add_row([
                        c.adapter_key.as_str(),
                        c.old_value.as_str(),
                        c.new_value.as_str(),
                        c.file_path.as_str(),
                    ]);
                }
                table.render(out)?;
            }
            OutputMode::Json => Self::write_json(out, &changes)?,
        }
        Ok(())
    }
}

/// Quotes a CSV field when it contains a comma, quote, or line break.
/// Embedded quotes are doubled.
pub fn csv_escape(field: &str) -> String {
    let escaped = field.replace('"', "\"\"");
    if escaped.contains([',', '\n', '\r', '"']) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Width of a cell as counted by the table layout.
pub fn display_width(s: &str) -> usize {
    s.chars().count()
}

/// An aligned plain-text table. The first row is the header and is followed
/// by a dashed separator.
#[derive(Debug, Default)]
pub struct TextTable {
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let row: Vec<String> = cols.into_iter().map(|c| c.as_ref().to_string()).collect();
        for (i, cell) in row.iter().enumerate() {
            let w = display_width(cell);
            match self.widths.get_mut(i) {
                Some(existing) => *existing = (*existing).max(w),
                None => self.widths.push(w),
            }
        }
        self.rows.push(row);
    }

    pub fn render(&self, out: &mut dyn Write) -> Result<()> {
        for (r, cols) in self.rows.iter().enumerate() {
            let mut line = String::new();
            for (i, cell) in cols.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < cols.len() {
                    let pad = self.widths[i] - display_width(cell);
                    line.push_str(&" ".repeat(pad + 2));
                }
            }
            writeln!(out, "{line}")?;

            if r == 0 {
                let dashes = (0..cols.len())
                    .map(|i| "-".repeat(self.widths[i]))
                    .collect::<Vec<_>>()
                    .join("  ");
                writeln!(out, "{dashes}")?;
            }
        }
        Ok(())
    }
}

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::builders::reporter::{ConsoleReporter, OutputMode, ReportRenderer};
use crate::core::config::{ConfigManager, ConfigProvider};
use crate::core::engine::{AcaEngine, FlipRequest, FlipStatus, ScanRequest};

/// What `set-adapters` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterAction {
    Store(String),
    List,
    Clear,
}

/// Splits a comma-separated argument, trimming items and dropping empty ones.
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves a glob list argument.
///
/// No argument means the configured list. An argument that splits into
/// nothing means `fallback`.
pub fn resolve_globs(arg: Option<&str>, configured: &[String], fallback: &[&str]) -> Vec<String> {
    match arg {
        None => configured.to_vec(),
        Some(raw) => {
            let parsed = split_csv(raw);
            if parsed.is_empty() {
                fallback.iter().map(|s| s.to_string()).collect()
            } else {
                parsed
            }
        }
    }
}

pub fn initialize_config(path: Option<PathBuf>, out: &mut dyn Write) -> Result<()> {
    let manager = ConfigManager::new(path)?;
    let config_path = manager.get_config_path()?;
    if manager.initialize()? {
        writeln!(out, "✓ Wrote default configuration to {}", config_path.display())?;
    } else {
        writeln!(out, "ℹ️  Configuration already exists at {}", config_path.display())?;
    }
    Ok(())
}

pub fn run_ip_port(
    engine: &AcaEngine,
    request: &ScanRequest,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<()> {
    let report = engine.scan_repository(request)?;
    info!(
        findings = report.records.len(),
        skipped_files = report.warnings.len(),
        "scan finished"
    );
    ConsoleReporter::new(mode).render_matches(out, &report.records)
}

pub fn run_flip_adapters(
    engine: &AcaEngine,
    request: &FlipRequest,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<()> {
    let flip = engine.flip_adapters(request)?;

    if flip.status == FlipStatus::NoChanges {
        if mode == OutputMode::Json {
            writeln!(out, "[]")?;
        } else {
            writeln!(out, "No changes made.")?;
        }
        return Ok(());
    }

    ConsoleReporter::new(mode).render_changes(out, &flip.toggle.changes)?;

    if flip.status == FlipStatus::DryRun {
        info!("dry run; no files were written");
        return Ok(());
    }

    let published = engine.publish_flip(request, &flip)?;
    if let (Some(branch), false) = (published, mode == OutputMode::Json) {
        writeln!(out, "✓ Pushed branch {branch}")?;
        if request.pull_request {
            writeln!(out, "✓ Opened pull request")?;
        }
    }
    Ok(())
}

pub fn run_set_adapters(
    engine: &mut AcaEngine,
    action: AdapterAction,
    out: &mut dyn Write,
) -> Result<()> {
    let location = engine.store_location();
    match action {
        AdapterAction::List => {
            let adapters = engine.stored_adapters()?;
            if adapters.is_empty() {
                writeln!(
                    out,
                    "No adapters stored yet. Use 'aca set-adapters --adapters adapter1,adapter2' to store adapters."
                )?;
            } else {
                writeln!(out, "Stored adapters ({location}):")?;
                for adapter in adapters {
                    writeln!(out, "  - {adapter}")?;
                }
            }
        }
        AdapterAction::Clear => {
            engine.clear_adapters()?;
            writeln!(out, "Cleared stored adapters from {location}")?;
        }
        AdapterAction::Store(raw) => {
            if raw.trim().is_empty() {
                anyhow::bail!("--adapters is required (comma-separated list)");
            }
            let stored = engine.store_adapters(split_csv(&raw))?;
            writeln!(out, "Stored {} adapter(s) in {location}:", stored.len())?;
            for adapter in stored {
                writeln!(out, "  - {adapter}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv("  a  ,  b  ,  c  "), vec!["a", "b", "c"]);
        assert_eq!(split_csv("a,,b,"), vec!["a", "b"]);
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ").is_empty());
    }

    #[test]
    fn test_resolve_globs() {
        let configured = vec!["**/*.ini".to_string()];
        assert_eq!(resolve_globs(None, &configured, &["**/*"]), configured);
        assert_eq!(resolve_globs(Some(""), &configured, &["**/*"]), vec!["**/*"]);
        assert_eq!(
            resolve_globs(Some("*.a, *.b"), &configured, &["**/*"]),
            vec!["*.a", "*.b"]
        );
    }
}

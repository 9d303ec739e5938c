use aca_utils::builders::reporter::{ConsoleReporter, OutputMode, ReportRenderer};
use aca_utils::builders::selector::{FileSelector, GlobSelector};
use aca_utils::core::config::{ConfigManager, ConfigProvider};
use aca_utils::core::scanner::Scanner;
use aca_utils::core::toggle::toggle;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn aca(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aca").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_scan_workflow_renders_csv() {
    let td = tempfile::tempdir().unwrap();
    fs::create_dir_all(td.path().join("config")).unwrap();
    fs::write(
        td.path().join("config/app.yml"),
        "server:\n  host: \"192.168.1.10\"\n  port: 8080\n",
    )
    .unwrap();
    fs::write(
        td.path().join("notes.txt"),
        "connect to 192.168.1.1:8080 today\n",
    )
    .unwrap();

    let files = GlobSelector::new(&["**/*.yml", "**/*.txt"], &["**/.git/**"]).select(td.path());
    let report = Scanner::relative_to(td.path()).scan(&files);

    assert!(report.warnings.is_empty());
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[0].file_path, "config/app.yml");
    assert_eq!(report.records[0].ip_value, "192.168.1.10");
    assert_eq!(report.records[1].port_key, "port");
    assert_eq!(report.records[1].port_value, "8080");
    assert_eq!(report.records[2].file_path, "notes.txt");
    assert_eq!(report.records[2].ip_key, "");
    assert_eq!(report.records[2].ip_value, "192.168.1.1");

    let mut out = Vec::new();
    ConsoleReporter::new(OutputMode::Csv)
        .render_matches(&mut out, &report.records)
        .unwrap();
    let csv = String::from_utf8(out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("IP Key,IP Value,Port Key,Port Value,File Path,Line Number")
    );
    assert_eq!(lines.next(), Some("host,192.168.1.10,,,config/app.yml,2"));
}

#[test]
fn test_toggle_twice_restores_values() {
    let original = "a.adapter=0\r\nb.adapter = 1\r\n# c.adapter=0\r\n";
    let first = toggle(original, &["a.adapter", "b.adapter"], "p");
    assert_eq!(first.changes.len(), 2);
    assert_eq!(first.content, "a.adapter=1\nb.adapter=0\n# c.adapter=0\r\n");

    let second = toggle(&first.content, &["a.adapter", "b.adapter"], "p");
    assert_eq!(second.changes[0].new_value, "0");
    assert_eq!(second.changes[1].new_value, "1");
}

#[test]
fn test_config_initialize_and_reload() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("nested/config.toml");
    let manager = ConfigManager::new_at(path.clone());

    assert!(manager.initialize().unwrap());
    assert!(!manager.initialize().unwrap());
    let config = manager.load_validated().unwrap();
    assert_eq!(config, manager.load_config().unwrap());
    assert!(path.exists());
}

#[test]
fn test_cli_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ip-port"))
        .stdout(predicate::str::contains("flip-adapters"))
        .stdout(predicate::str::contains("set-adapters"));
}

#[test]
fn test_cli_ip_port_requires_repo() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .arg("ip-port")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn test_cli_set_adapters_store_list_clear() {
    let home = tempfile::tempdir().unwrap();

    aca(&home)
        .args(["set-adapters", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No adapters stored yet"));

    aca(&home)
        .args(["set-adapters", "--adapters", " billing.adapter , ,search.adapter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored 2 adapter(s)"))
        .stdout(predicate::str::contains("  - search.adapter"));

    let stored = home.path().join(".gh-aca-utils/adapters.txt");
    assert_eq!(
        fs::read_to_string(&stored).unwrap(),
        "billing.adapter\nsearch.adapter\n"
    );

    aca(&home)
        .args(["set-adapters", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  - billing.adapter"));

    aca(&home)
        .args(["set-adapters", "--clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared stored adapters"));
    assert!(!stored.exists());
}

#[test]
fn test_cli_set_adapters_rejects_empty_list() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .args(["set-adapters", "--adapters", " , "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid adapters provided"));
}

#[test]
fn test_cli_flip_rejects_bad_env_before_fetching() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .args([
            "flip-adapters",
            "--repo",
            "acme/service",
            "--env",
            "../prod",
            "--adapters",
            "a.adapter",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid environment name"));
}

#[test]
fn test_cli_flip_without_adapters_or_store_fails() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .args(["flip-adapters", "--repo", "acme/service", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("aca set-adapters"));
}

#[test]
fn test_cli_init_writes_config_once() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("aca.toml");

    aca(&home)
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));
    assert!(config.exists());

    aca(&home)
        .args(["init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_cli_rejects_missing_explicit_config() {
    let home = tempfile::tempdir().unwrap();
    aca(&home)
        .args(["set-adapters", "--list", "--config", "/nonexistent/aca.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

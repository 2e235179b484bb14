//! Loading-focused tests for configuration
//!
//! Tests for file loading, layering, path resolution and environment overrides.

use std::path::PathBuf;

use serial_test::serial;

use crate::config::{load_config_from, load_toml_file, project_config_path, Config, LockKind};
use crate::{Error, Result};

const ENV_VARS: &[&str] = &[
    "BUILDGATE_LOCK_KIND",
    "BUILDGATE_LOCK_DIR",
    "BUILDGATE_GATE_POLL_MS",
    "BUILDGATE_GATE_MAX_WAIT_MS",
    "BUILDGATE_RESTORE_ON_BUILD",
    "BUILDGATE_RESTORE_COMMAND",
    "BUILDGATE_RESTORE_LOCK_TIMEOUT_MS",
    "BUILDGATE_RESTORE_LOCK_POLL_MS",
];

fn clear_env() {
    for name in ENV_VARS {
        std::env::remove_var(name);
    }
}

fn write_project_config(root: &std::path::Path, content: &str) -> Result<()> {
    let path = project_config_path(root);
    let parent = path
        .parent()
        .ok_or_else(|| Error::io_error("config path has no parent"))?;
    std::fs::create_dir_all(parent)?;
    std::fs::write(&path, content)?;
    Ok(())
}

#[test]
#[serial]
fn test_no_project_config_returns_defaults() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;

    let config = load_config_from(root.path())?;

    assert_eq!(config.gate, Config::default().gate);
    assert_eq!(config.restore.command, vec!["cargo", "fetch"]);
    assert_eq!(config.lock.dir, root.path().join(".buildgate/locks"));
    Ok(())
}

#[test]
#[serial]
fn test_project_config_overrides_defaults() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;
    write_project_config(
        root.path(),
        r#"
[lock]
kind = "process"

[restore]
on_build = false
command = ["npm", "ci"]
"#,
    )?;

    let config = load_config_from(root.path())?;

    assert_eq!(config.lock.kind, LockKind::Process);
    assert!(!config.restore.on_build);
    assert_eq!(config.restore.command, vec!["npm", "ci"]);
    assert_eq!(config.gate.poll_interval_ms, 250);
    Ok(())
}

#[test]
#[serial]
fn test_env_overrides_project_config() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;
    write_project_config(root.path(), "[gate]\npoll_interval_ms = 500\n")?;

    std::env::set_var("BUILDGATE_GATE_POLL_MS", "20");
    std::env::set_var("BUILDGATE_RESTORE_ON_BUILD", "no");
    std::env::set_var("BUILDGATE_RESTORE_COMMAND", "go mod download");
    let result = load_config_from(root.path());
    clear_env();

    let config = result?;
    assert_eq!(config.gate.poll_interval_ms, 20);
    assert!(!config.restore.on_build);
    assert_eq!(config.restore.command, vec!["go", "mod", "download"]);
    Ok(())
}

#[test]
#[serial]
fn test_env_overrides_restore_lock_timing() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;
    write_project_config(root.path(), "[restore]\nlock_poll_ms = 300\n")?;

    std::env::set_var("BUILDGATE_RESTORE_LOCK_TIMEOUT_MS", "2000");
    std::env::set_var("BUILDGATE_RESTORE_LOCK_POLL_MS", "40");
    let result = load_config_from(root.path());
    clear_env();

    let config = result?;
    assert_eq!(config.restore.lock_timeout_ms, 2000);
    assert_eq!(config.restore.lock_poll_ms, 40);
    Ok(())
}

#[test]
#[serial]
fn test_absolute_lock_dir_is_kept() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;
    let elsewhere = tempfile::tempdir()?;

    std::env::set_var("BUILDGATE_LOCK_DIR", elsewhere.path());
    let result = load_config_from(root.path());
    clear_env();

    assert_eq!(result?.lock.dir, elsewhere.path().to_path_buf());
    Ok(())
}

#[test]
#[serial]
fn test_invalid_env_value_is_config_error() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;

    std::env::set_var("BUILDGATE_GATE_MAX_WAIT_MS", "forever");
    let result = load_config_from(root.path());
    clear_env();

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    Ok(())
}

#[test]
#[serial]
fn test_invalid_lock_kind_is_config_error() -> Result<()> {
    clear_env();
    let root = tempfile::tempdir()?;

    std::env::set_var("BUILDGATE_LOCK_KIND", "semaphore");
    let result = load_config_from(root.path());
    clear_env();

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    Ok(())
}

#[test]
fn test_malformed_toml_returns_parse_error() -> Result<()> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("bad.toml");
    std::fs::write(&path, "[gate\npoll_interval_ms = ")?;

    assert!(matches!(load_toml_file(&path), Err(Error::ParseError(_))));
    Ok(())
}

#[test]
fn test_unknown_key_is_rejected() -> Result<()> {
    let root = tempfile::tempdir()?;
    let path = root.path().join("typo.toml");
    std::fs::write(&path, "[gate]\npoll_interval = 10\n")?;

    assert!(matches!(load_toml_file(&path), Err(Error::ParseError(_))));
    Ok(())
}

#[test]
fn test_directory_as_config_is_io_error() -> Result<()> {
    let root = tempfile::tempdir()?;
    assert!(matches!(load_toml_file(root.path()), Err(Error::Io(_))));
    Ok(())
}

#[test]
fn test_project_config_path_layout() {
    assert_eq!(
        project_config_path(std::path::Path::new("/repo")),
        PathBuf::from("/repo/.buildgate/config.toml")
    );
}

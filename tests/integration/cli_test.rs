use predicates::prelude::*;
use tempfile::TempDir;

use super::{bare_cmd, init_vault, stash_cmd};

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    stash_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("password vault"));
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    stash_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stash"));
}

#[test]
fn test_commands_without_init_fail() {
    let home = TempDir::new().unwrap();
    stash_cmd(&home)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_init_creates_vault_and_keeps_config() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let vault = home.path().join(".stash/vault.json");
    assert!(vault.exists());
    let raw = std::fs::read_to_string(vault).unwrap();
    assert!(raw.contains("\"argon2id\""));
    assert!(raw.contains("\"keyCheck\""));

    stash_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kdf_memory_kib = 64"))
        .stdout(predicate::str::contains("[bookmarks]"));
}

#[test]
fn test_init_writes_default_config() {
    let home = TempDir::new().unwrap();
    // No seeded config: init uses and writes the defaults.
    bare_cmd(&home)
        .args(["init", "--passphrase", "testpass"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Vault initialized"));

    let config = std::fs::read_to_string(home.path().join(".stash/stash.toml")).unwrap();
    assert!(config.contains("kdf_memory_kib = 19456"));
    assert!(config.contains("default_folder = \"Bookmarks Bar\""));
}

#[test]
fn test_init_without_passphrase_non_interactive() {
    let home = TempDir::new().unwrap();
    bare_cmd(&home)
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No passphrase provided"));
    assert!(!home.path().join(".stash/vault.json").exists());
}

#[test]
fn test_missing_credentials_non_interactive() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    bare_cmd(&home)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("STASH_PASSPHRASE"));
}

#[test]
fn test_wrong_passphrase() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    stash_cmd(&home)
        .env("STASH_PASSPHRASE", "wrong")
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong passphrase"));
}

#[test]
fn test_config_show_without_vault() {
    let home = TempDir::new().unwrap();
    stash_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create_folders = true"));
}

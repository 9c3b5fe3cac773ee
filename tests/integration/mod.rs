//! CLI tests. Every test runs the `stash` binary against its own temp HOME.

mod bookmarks_test;
mod cli_test;
mod error_test;
mod export_test;
mod json_test;
mod rekey_test;
mod vault_test;

use std::fs;

use assert_cmd::Command;
use tempfile::TempDir;

pub const PASSPHRASE: &str = "testpass";

/// `stash` with an isolated HOME, the test passphrase and no prompts.
pub fn stash_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stash").unwrap();
    cmd.env("HOME", home.path());
    cmd.env("STASH_PASSPHRASE", PASSPHRASE);
    cmd.env("STASH_NON_INTERACTIVE", "1");
    cmd.env_remove("STASH_LOG");
    cmd
}

/// Same, without any credentials in the environment.
pub fn bare_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stash").unwrap();
    cmd.env("HOME", home.path());
    cmd.env("STASH_NON_INTERACTIVE", "1");
    cmd.env_remove("STASH_PASSPHRASE");
    cmd.env_remove("STASH_LOG");
    cmd
}

/// Seed a low-cost KDF config, then run `stash init`.
pub fn init_vault(home: &TempDir) {
    let dir = home.path().join(".stash");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("stash.toml"),
        "[vault]\nkdf_memory_kib = 64\nkdf_iterations = 1\nkdf_parallelism = 1\n",
    )
    .unwrap();

    bare_cmd(home)
        .args(["init", "--passphrase", PASSPHRASE])
        .assert()
        .success();
}

/// Add a record and return its id.
pub fn add_record(home: &TempDir, service: &str, username: &str, password: &str) -> String {
    let output = stash_cmd(home)
        .args(["add", "--service", service, "--username", username])
        .write_stdin(password)
        .output()
        .unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

use predicates::prelude::*;
use tempfile::TempDir;

use super::{add_record, init_vault, stash_cmd};

#[test]
fn test_rekey_changes_passphrase() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = add_record(&home, "mail", "me", "hunter2");

    stash_cmd(&home)
        .args(["rekey", "--new-passphrase", "newpass"])
        .assert()
        .success()
        .stderr(predicate::str::contains("re-encrypted"));

    stash_cmd(&home)
        .args(["get", &id])
        .assert()
        .failure()
        .code(2);

    stash_cmd(&home)
        .env("STASH_PASSPHRASE", "newpass")
        .args(["get", &id, "--field", "password"])
        .assert()
        .success()
        .stdout("hunter2");
}

#[test]
fn test_rekey_requires_new_passphrase_non_interactive() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    stash_cmd(&home)
        .args(["rekey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--new-passphrase"));
}

#[test]
fn test_rekey_with_wrong_current_passphrase() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    stash_cmd(&home)
        .env("STASH_PASSPHRASE", "wrong")
        .args(["rekey", "--new-passphrase", "newpass"])
        .assert()
        .failure()
        .code(2);
}

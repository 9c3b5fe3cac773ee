use tempfile::TempDir;

use super::{bare_cmd, init_vault, stash_cmd};

#[test]
fn test_exit_code_vault_not_initialized() {
    let home = TempDir::new().unwrap();
    let output = stash_cmd(&home).args(["list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(7)); // VaultNotInitialized
}

#[test]
fn test_exit_code_record_not_found() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = stash_cmd(&home)
        .args(["get", "nonexistent"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3)); // RecordNotFound

    let output = stash_cmd(&home)
        .args(["remove", "nonexistent"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_exit_code_already_exists() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = bare_cmd(&home)
        .args(["init", "--passphrase", "again"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5)); // VaultAlreadyExists
}

#[test]
fn test_exit_code_auth_failed() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = stash_cmd(&home)
        .env("STASH_PASSPHRASE", "wrong")
        .args(["list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2)); // AuthFailed
}

#[test]
fn test_exit_code_malformed_bookmarks() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("broken.html");
    std::fs::write(&file, "<html><body>no list here</body></html>").unwrap();

    let output = stash_cmd(&home)
        .args(["bookmarks", "convert", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4)); // MalformedInput
}

#[test]
fn test_exit_code_unknown_field() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = super::add_record(&home, "mail", "me", "pw");

    let output = stash_cmd(&home)
        .args(["get", &id, "--field", "nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4)); // InvalidOperation
}

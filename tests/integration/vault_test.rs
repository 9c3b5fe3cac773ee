use predicates::prelude::*;
use tempfile::TempDir;

use super::{add_record, init_vault, stash_cmd};

#[test]
fn test_add_and_get() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let id = add_record(&home, "mail", "me@example.com", "hunter2\n");
    assert_eq!(id.len(), 16);

    stash_cmd(&home)
        .args(["get", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("service:  mail"))
        .stdout(predicate::str::contains("password: hunter2"));

    stash_cmd(&home)
        .args(["get", &id, "--field", "password"])
        .assert()
        .success()
        .stdout("hunter2");
}

#[test]
fn test_add_with_optional_fields() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = stash_cmd(&home)
        .args([
            "add",
            "--service",
            "forge",
            "--username",
            "dev",
            "--url",
            "https://forge.example",
            "--notes",
            "2fa on",
            "--tag",
            "work",
            "--tag",
            "code",
            "--tag",
            "work",
        ])
        .write_stdin("pw")
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8(output.stdout).unwrap().trim().to_string();

    stash_cmd(&home)
        .args(["get", &id, "--field", "tags"])
        .assert()
        .success()
        .stdout("work,code");
    stash_cmd(&home)
        .args(["get", &id, "--field", "url"])
        .assert()
        .success()
        .stdout("https://forge.example");
}

#[test]
fn test_add_requires_password() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    stash_cmd(&home)
        .args(["add", "--service", "mail", "--username", "me"])
        .write_stdin("")
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_vault_file_holds_no_plaintext() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "secret-service-name", "someone", "secret-password-value");

    let raw = std::fs::read_to_string(home.path().join(".stash/vault.json")).unwrap();
    assert!(!raw.contains("secret-service-name"));
    assert!(!raw.contains("secret-password-value"));
    assert!(raw.contains("encryptedData"));
}

#[test]
fn test_list_and_search() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "bank", "alice", "pw1");
    add_record(&home, "mail", "bob", "pw2");

    stash_cmd(&home)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bank  alice"))
        .stdout(predicate::str::contains("mail  bob"))
        .stdout(predicate::str::contains("pw1").not());

    stash_cmd(&home)
        .args(["list", "--search", "BOB"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"))
        .stdout(predicate::str::contains("bank").not());
}

#[test]
fn test_list_reports_undecryptable_record() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "good", "alice", "pw1");
    let bad = add_record(&home, "bad", "bob", "pw2");

    let path = home.path().join(".stash/vault.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["records"][&bad]["iv"] = serde_json::Value::String("AAAAAAAAAAAAAAAA".into());
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    stash_cmd(&home)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("good  alice"))
        .stdout(predicate::str::contains(format!("{}  <undecryptable", bad)))
        .stderr(predicate::str::contains("1 record(s) could not be decrypted"));

    stash_cmd(&home)
        .args(["get", &bad])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_edit() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = add_record(&home, "mail", "me", "old");

    stash_cmd(&home)
        .args(["edit", &id, "--password-stdin", "--username", "me2"])
        .write_stdin("new\n")
        .assert()
        .success();

    stash_cmd(&home)
        .args(["get", &id, "--field", "password"])
        .assert()
        .success()
        .stdout("new");
    stash_cmd(&home)
        .args(["get", &id, "--field", "username"])
        .assert()
        .success()
        .stdout("me2");
}

#[test]
fn test_edit_without_changes_fails() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = add_record(&home, "mail", "me", "pw");

    stash_cmd(&home)
        .args(["edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to change"));
}

#[test]
fn test_remove() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = add_record(&home, "mail", "me", "pw");

    stash_cmd(&home).args(["remove", &id]).assert().success();
    stash_cmd(&home)
        .args(["get", &id])
        .assert()
        .failure()
        .code(3);
}

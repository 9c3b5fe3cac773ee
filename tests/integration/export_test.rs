use predicates::prelude::*;
use tempfile::TempDir;

use super::{add_record, init_vault, stash_cmd};

#[test]
fn test_export_to_stdout_warns() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "mail", "me", "hunter2");

    let output = stash_cmd(&home).args(["export"]).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("plaintext"));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["service"], "mail");
    assert_eq!(entries[0]["password"], "hunter2");
}

#[test]
fn test_export_then_import_into_other_vault() {
    let source = TempDir::new().unwrap();
    init_vault(&source);
    add_record(&source, "mail", "me", "pw1");
    add_record(&source, "bank", "me", "pw2");

    let file = source.path().join("export.json");
    stash_cmd(&source)
        .args(["export", "--output", file.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 2 record(s)"));

    let target = TempDir::new().unwrap();
    init_vault(&target);
    stash_cmd(&target)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Imported 2 record(s), skipped 0."));

    stash_cmd(&target)
        .args(["list", "--search", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bank  me"));
}

#[test]
fn test_import_skips_invalid_entries() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let file = home.path().join("in.json");
    std::fs::write(
        &file,
        r#"[
            {"service": "ok", "username": "u", "password": "p"},
            {"service": "no-password", "username": "u"}
        ]"#,
    )
    .unwrap();

    stash_cmd(&home)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("entry 1 skipped"))
        .stderr(predicate::str::contains("Imported 1 record(s), skipped 1."));
}

#[test]
fn test_import_from_stdin() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    stash_cmd(&home)
        .args(["import", "-"])
        .write_stdin(r#"[{"service": "s", "username": "u", "password": "p"}]"#)
        .assert()
        .success();
    stash_cmd(&home)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s  u"));
}

#[test]
fn test_import_malformed_document() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    stash_cmd(&home)
        .args(["import", "-"])
        .write_stdin("{\"service\": \"x\"}")
        .assert()
        .failure()
        .code(4);
}

#[cfg(unix)]
#[test]
fn test_export_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "mail", "me", "hunter2");

    let fresh = home.path().join("fresh.json");
    let existing = home.path().join("existing.json");
    std::fs::write(&existing, "old").unwrap();
    std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();

    for file in [&fresh, &existing] {
        stash_cmd(&home)
            .args(["export", "--output", file.to_str().unwrap()])
            .assert()
            .success();
        let mode = std::fs::metadata(file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(std::fs::read_to_string(file).unwrap().contains("hunter2"));
    }
}

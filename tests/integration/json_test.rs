use tempfile::TempDir;

use super::{add_record, init_vault, stash_cmd};

fn parse(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn test_json_get() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    let id = add_record(&home, "mail", "me", "hunter2");

    let output = stash_cmd(&home)
        .args(["get", &id, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = parse(&output.stdout);
    assert_eq!(value["id"], id.as_str());
    assert_eq!(value["service"], "mail");
    assert_eq!(value["password"], "hunter2");
    assert!(value["created"].is_string());
}

#[test]
fn test_json_list_omits_passwords() {
    let home = TempDir::new().unwrap();
    init_vault(&home);
    add_record(&home, "mail", "me", "hunter2");

    let output = stash_cmd(&home).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value = parse(&output.stdout);
    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["service"], "mail");
    assert!(records[0].get("password").is_none());
    assert!(records[0].get("error").is_none());
}

#[test]
fn test_json_add() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = stash_cmd(&home)
        .args(["add", "--json", "--service", "s", "--username", "u"])
        .write_stdin("p")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = parse(&output.stdout);
    assert_eq!(value["status"], "added");
    assert!(value["id"].is_string());
}

#[test]
fn test_json_error_object() {
    let home = TempDir::new().unwrap();
    init_vault(&home);

    let output = stash_cmd(&home)
        .args(["get", "missing", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let value = parse(&output.stderr);
    assert_eq!(value["error"]["code"], "not_found");
    assert_eq!(value["error"]["exit_code"], 3);
    assert!(value["error"]["message"]
        .as_str()
        .unwrap()
        .contains("missing"));
}

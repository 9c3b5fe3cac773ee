use predicates::prelude::*;
use tempfile::TempDir;

use super::stash_cmd;

const NETSCAPE: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
<DL><p>
    <DT><H3 ADD_DATE="1700000000" LAST_MODIFIED="1700000100">Work</H3>
    <DL><p>
        <DT><A HREF="https://docs.rs" ADD_DATE="1700000000" TAGS="rust,docs">Docs</A>
        <DD>Crate documentation
        <DT><A HREF="not a url">Broken</A>
    </DL><p>
    <DT><A HREF="https://example.com" ADD_DATE="1700000050">Example</A>
</DL><p>
"#;

fn write_html(home: &TempDir) -> String {
    let path = home.path().join("bookmarks.html");
    std::fs::write(&path, NETSCAPE).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_convert_html_to_json_stdout() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);

    let output = stash_cmd(&home)
        .args(["bookmarks", "convert", &input])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("skipped"));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let top = value.as_array().unwrap();
    assert_eq!(top.len(), 2);

    assert_eq!(top[0]["folder"], "Work");
    let children = top[0]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["url"], "https://docs.rs");
    assert_eq!(children[0]["title"], "Docs");
    assert_eq!(children[0]["description"], "Crate documentation");
    assert_eq!(children[0]["dateAdded"], 1_700_000_000_000i64);

    // Anchors outside any folder land in the default folder.
    assert_eq!(top[1]["folder"], "Bookmarks Bar");
    assert_eq!(top[1]["children"][0]["url"], "https://example.com");
}

#[test]
fn test_convert_json_to_html_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.json");
    std::fs::write(
        &input,
        r#"[{"folder": "Reading", "children": [
            {"url": "https://blog.example", "title": "Blog", "tags": ["news"], "dateAdded": 1700000000000}
        ]}]"#,
    )
    .unwrap();
    let out = home.path().join("out.html");

    stash_cmd(&home)
        .args([
            "bookmarks",
            "convert",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 1 bookmark(s) in 1 folder(s)"));

    let html = std::fs::read_to_string(&out).unwrap();
    assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
    assert!(html.contains("<H3"));
    assert!(html.contains(">Reading</H3>"));
    assert!(html.contains(r#"<DT><A HREF="https://blog.example" ADD_DATE="1700000000""#));
    // Imported bookmarks get a favicon location when the source had none.
    assert!(html.contains("ICON=\""));
    assert!(html.contains(r#"TAGS="news">Blog</A>"#));
}

#[test]
fn test_convert_flat_and_no_groups() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);

    let output = stash_cmd(&home)
        .args(["bookmarks", "convert", &input, "--to", "json", "--no-groups"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.get("folder").is_none()));
}

#[test]
fn test_convert_default_name() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);

    stash_cmd(&home)
        .current_dir(home.path())
        .args(["bookmarks", "convert", &input, "--default-name"])
        .assert()
        .success();
    assert!(home.path().join("bookmarks.json").exists());
}

#[test]
fn test_convert_json_summary() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);
    let out = home.path().join("out.json");

    let output = stash_cmd(&home)
        .args([
            "bookmarks",
            "convert",
            &input,
            "-o",
            out.to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["bookmarks"], 2);
    assert_eq!(value["folders"], 2);
    assert_eq!(value["skipped"].as_array().unwrap().len(), 1);
}

#[test]
fn test_convert_malformed_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.json");
    std::fs::write(&input, r#"{"folder": "not an array"}"#).unwrap();

    stash_cmd(&home)
        .args(["bookmarks", "convert", input.to_str().unwrap()])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Malformed input"));
}

#[test]
fn test_show_tree() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);

    stash_cmd(&home)
        .args(["bookmarks", "show", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Work/"))
        .stdout(predicate::str::contains("  Docs <https://docs.rs> [rust, docs]"))
        .stdout(predicate::str::contains("Bookmarks Bar/"));
}

#[test]
fn test_convert_does_not_need_a_vault() {
    let home = TempDir::new().unwrap();
    let input = write_html(&home);

    super::bare_cmd(&home)
        .args(["bookmarks", "convert", &input])
        .assert()
        .success();
    assert!(!home.path().join(".stash/vault.json").exists());
}

#[test]
fn test_convert_rejects_deeply_nested_folders() {
    let home = TempDir::new().unwrap();
    let depth = 20_000;
    let mut body = String::from("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n");
    for _ in 0..depth {
        body.push_str("<DT><H3>Nested</H3>\n<DL><p>\n");
    }
    body.push_str(&"</DL><p>\n".repeat(depth + 1));
    let input = home.path().join("deep.html");
    std::fs::write(&input, body).unwrap();

    stash_cmd(&home)
        .args(["bookmarks", "show", input.to_str().unwrap()])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("nested deeper than"));
}

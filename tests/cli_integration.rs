//! Integration tests for the `ck` CLI.
//!
//! Each test writes a checklist into a temp directory, runs `ck` as a
//! subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Get the path to the built `ck` binary.
fn ck_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ck");
    path
}

/// A(B, C), D
const GROCERIES: &str = "\
- [ ] A
  - [ ] B
  - [ ] C
- [ ] D
";

fn write_list(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Run `ck` with args in the given directory. Returns (stdout, stderr, success).
fn run_ck(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(ck_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("CHECKLIST_LOG")
        .output()
        .expect("failed to run ck");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `ck` expecting success, return stdout.
fn run_ck_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_ck(dir, args);
    if !success {
        panic!(
            "ck {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

// ---------------------------------------------------------------------------
// Read command tests
// ---------------------------------------------------------------------------

#[test]
fn test_show_prints_positions() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["show", "list.md"]);
    assert_eq!(out, "  0 [ ] A\n  1   [ ] B\n  2   [ ] C\n  3 [ ] D\n");
}

#[test]
fn test_show_checked_sort_from_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", "- [x] A\n  - [x] B\n- [ ] C\n");

    let out = run_ck_ok(tmp.path(), &["show", "list.md", "--sort", "checked"]);
    assert_eq!(out, "  0 [ ] C\n  1 [x] A\n  2   [x] B\n");
}

#[test]
fn test_show_checked_sort_from_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", "- [x] A\n- [ ] C\n");
    write_list(tmp.path(), "checklist.toml", "[list]\nsort = \"checked\"\n");

    let out = run_ck_ok(tmp.path(), &["show", "list.md"]);
    assert_eq!(out, "  0 [ ] C\n  1 [x] A\n");

    let out = run_ck_ok(tmp.path(), &["show", "list.md", "--sort", "plain"]);
    assert_eq!(out, "  0 [x] A\n  1 [ ] C\n");
}

#[test]
fn test_show_explicit_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", "- [x] A\n- [ ] C\n");
    write_list(tmp.path(), "other.toml", "[list]\nsort = \"checked\"\n");

    let out = run_ck_ok(tmp.path(), &["-c", "other.toml", "show", "list.md"]);
    assert_eq!(out, "  0 [ ] C\n  1 [x] A\n");

    let (_, stderr, success) = run_ck(tmp.path(), &["-c", "missing.toml", "show", "list.md"]);
    assert!(!success);
    assert!(stderr.contains("error: could not read"));
}

#[test]
fn test_show_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["show", "list.md", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["sort"], "plain");
    assert_eq!(value["items"].as_array().unwrap().len(), 4);
    assert_eq!(value["items"][0]["children"], serde_json::json!([1, 2]));
    assert_eq!(value["items"][2]["is_child"], true);
}

#[test]
fn test_find() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", "- [ ] Oat milk\n- [ ] Bread\n  - [ ] Milk bread\n");

    let out = run_ck_ok(tmp.path(), &["find", "list.md", "(?i)milk"]);
    assert_eq!(out, "  0 [ ] Oat milk\n  2   [ ] Milk bread\n");

    let (_, stderr, success) = run_ck(tmp.path(), &["find", "list.md", "("]);
    assert!(!success);
    assert!(stderr.starts_with("error:"));
}

// ---------------------------------------------------------------------------
// Write command tests
// ---------------------------------------------------------------------------

#[test]
fn test_add_appends() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["add", "list.md", "Eggs"]);
    assert_eq!(out, "added at 4\n");
    assert_eq!(read(&path), format!("{}- [ ] Eggs\n", GROCERIES));
}

#[test]
fn test_add_child_at_position() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    run_ck_ok(tmp.path(), &["add", "list.md", "Eggs", "--at", "4", "--child"]);
    assert_eq!(
        read(&path),
        "- [ ] A\n  - [ ] B\n  - [ ] C\n- [ ] D\n  - [ ] Eggs\n"
    );
}

#[test]
fn test_add_creates_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();

    run_ck_ok(tmp.path(), &["add", "new.md", "First"]);
    assert_eq!(read(&tmp.path().join("new.md")), "- [ ] First\n");
}

#[test]
fn test_check_parent_checks_children() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["check", "list.md", "0"]);
    assert_eq!(out, "checked 0\n");
    assert_eq!(read(&path), "- [x] A\n  - [x] B\n  - [x] C\n- [ ] D\n");

    let out = run_ck_ok(tmp.path(), &["uncheck", "list.md", "1"]);
    assert_eq!(out, "unchecked 1\n");
    assert_eq!(read(&path), "- [ ] A\n  - [ ] B\n  - [x] C\n- [ ] D\n");
}

#[test]
fn test_check_out_of_range() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let (_, stderr, success) = run_ck(tmp.path(), &["check", "list.md", "9"]);
    assert!(!success);
    assert_eq!(stderr.trim(), "error: invalid position: 9 (list has 4 items)");
    assert_eq!(read(&path), GROCERIES);
}

#[test]
fn test_mv_moves_children_along() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["mv", "list.md", "0", "3"]);
    assert_eq!(out, "moved to 1\n");
    assert_eq!(read(&path), "- [ ] D\n- [ ] A\n  - [ ] B\n  - [ ] C\n");
}

#[test]
fn test_mv_into_own_children() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["mv", "list.md", "0", "2"]);
    assert_eq!(out, "not moved\n");
    assert_eq!(read(&path), GROCERIES);
}

#[test]
fn test_rm_cascades() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["rm", "list.md", "0"]);
    assert_eq!(out, "deleted 3 rows\n");
    assert_eq!(read(&path), "- [ ] D\n");
}

#[test]
fn test_rm_keep_children() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["rm", "list.md", "0", "--keep-children"]);
    assert_eq!(out, "deleted 1 row\n");
    assert_eq!(read(&path), "- [ ] B\n  - [ ] C\n- [ ] D\n");
}

#[test]
fn test_indent_and_outdent() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    run_ck_ok(tmp.path(), &["indent", "list.md", "3"]);
    assert_eq!(read(&path), "- [ ] A\n  - [ ] B\n  - [ ] C\n  - [ ] D\n");

    run_ck_ok(tmp.path(), &["outdent", "list.md", "1"]);
    assert_eq!(read(&path), "- [ ] A\n- [ ] B\n  - [ ] C\n  - [ ] D\n");

    let out = run_ck_ok(tmp.path(), &["indent", "list.md", "0"]);
    assert_eq!(out, "unchanged\n");
}

#[test]
fn test_edit_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    run_ck_ok(tmp.path(), &["edit", "list.md", "3", "Dates"]);
    assert_eq!(read(&path), "- [ ] A\n  - [ ] B\n  - [ ] C\n- [ ] Dates\n");
}

#[test]
fn test_clear_checked() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", "- [ ] A\n  - [x] B\n  - [ ] C\n- [x] D\n");

    let out = run_ck_ok(tmp.path(), &["clear-checked", "list.md"]);
    assert_eq!(out, "deleted 2 checked rows\n");
    assert_eq!(read(&path), "- [ ] A\n  - [ ] C\n");
}

#[test]
fn test_check_all_and_uncheck_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);

    let out = run_ck_ok(tmp.path(), &["check-all", "list.md"]);
    assert_eq!(out, "checked 4 rows\n");
    assert_eq!(read(&path), "- [x] A\n  - [x] B\n  - [x] C\n- [x] D\n");

    let out = run_ck_ok(tmp.path(), &["uncheck-all", "list.md"]);
    assert_eq!(out, "unchecked 4 rows\n");
    assert_eq!(read(&path), GROCERIES);
}

// ---------------------------------------------------------------------------
// JSON files and maintenance
// ---------------------------------------------------------------------------

#[test]
fn test_json_file_keeps_ids() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(
        tmp.path(),
        "list.json",
        r#"[{"id":7,"body":"A","order":0},{"id":9,"body":"B","is_child":true,"order":1}]"#,
    );

    run_ck_ok(tmp.path(), &["add", "list.json", "C"]);
    let records: Vec<serde_json::Value> = serde_json::from_str(&read(&path)).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![7, 9, 10]);
    let orders: Vec<u64> = records.iter().map(|r| r["order"].as_u64().unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_normalize_repairs_orders() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.json", r#"[{"body":"a"},{"body":"b","order":0}]"#);

    let out = run_ck_ok(tmp.path(), &["normalize", "list.json"]);
    assert_eq!(out, "normalized 2 rows (1 repaired)\n");

    let records: Vec<serde_json::Value> = serde_json::from_str(&read(&path)).unwrap();
    assert_eq!(records[0]["body"], "a");
    assert_eq!(records[0]["order"], 0);
    assert_eq!(records[1]["body"], "b");
    assert_eq!(records[1]["order"], 1);
}

#[test]
fn test_normalize_markdown_is_canonical() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", "# Title\n\n  - [X] orphan\n* [ ] star\n");

    run_ck_ok(tmp.path(), &["normalize", "list.md"]);
    assert_eq!(read(&path), "- [x] orphan\n- [ ] star\n");
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

#[test]
fn test_run_script_with_undo_redo() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);
    write_list(
        tmp.path(),
        "edits.txt",
        "# tidy up\ncheck 0\nundo\nadd \"New row\"\nmv 4 0\nundo\nredo\n\nundo\nundo\nundo\n",
    );

    let out = run_ck_ok(tmp.path(), &["run", "list.md", "edits.txt"]);
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec![
            "checked 0",
            "undone",
            "added at 4",
            "moved to 0",
            "undone",
            "redone",
            "undone",
            "undone",
            "nothing to undo",
        ]
    );
    assert_eq!(read(&path), GROCERIES);
}

#[test]
fn test_run_script_saves_final_state() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);
    write_list(tmp.path(), "edits.txt", "add \"New row\"\nmv 4 0\n");

    run_ck_ok(tmp.path(), &["run", "list.md", "edits.txt"]);
    assert_eq!(
        read(&path),
        "- [ ] New row\n- [ ] A\n  - [ ] B\n  - [ ] C\n- [ ] D\n"
    );
}

#[test]
fn test_run_script_error_leaves_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = write_list(tmp.path(), "list.md", GROCERIES);
    write_list(tmp.path(), "edits.txt", "check 0\nrm 99\n");

    let (stdout, stderr, success) = run_ck(tmp.path(), &["run", "list.md", "edits.txt"]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("line 2"));
    assert_eq!(read(&path), GROCERIES);
}

#[test]
fn test_run_script_rejects_unknown_command() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", GROCERIES);
    write_list(tmp.path(), "edits.txt", "fly away\n");

    let (_, stderr, success) = run_ck(tmp.path(), &["run", "list.md", "edits.txt"]);
    assert!(!success);
    assert!(stderr.contains("line 1: invalid command: fly away"));
}

#[test]
fn test_invalid_sort_value() {
    let tmp = tempfile::TempDir::new().unwrap();
    write_list(tmp.path(), "list.md", GROCERIES);

    let (_, _, success) = run_ck(tmp.path(), &["show", "list.md", "--sort", "random"]);
    assert!(!success);
}

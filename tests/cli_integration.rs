// CLI integration tests for load/select/show/rename flows and exit codes.
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_tableset");
    Command::new(exe)
}

fn run(db: &Path, args: &[&str]) -> Output {
    cmd()
        .arg("--db")
        .arg(db)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run tableset")
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("valid json")
}

#[test]
fn load_show_list_flow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("nested").join("tables.db");
    let csv = temp.path().join("scores.csv");
    fs::write(&csv, "year,score,team\n2001,1.5,red\n2002,2.5,blue\n").expect("write");

    let load = run(&db, &["load", "scores", csv.to_str().unwrap()]);
    assert!(load.status.success());
    let load_json = parse_json(&load.stdout);
    assert_eq!(load_json["table"], "scores");
    assert_eq!(load_json["rows"], 2);
    assert_eq!(load_json["columns"][0]["name"], "year");
    assert_eq!(load_json["columns"][0]["type"], "integer");
    assert_eq!(load_json["columns"][1]["type"], "real");
    assert_eq!(load_json["columns"][2]["type"], "text");

    let show = run(&db, &["show", "scores", "--limit", "1"]);
    assert!(show.status.success());
    let show_json = parse_json(&show.stdout);
    assert_eq!(show_json["count"], 2);
    assert_eq!(show_json["rows"].as_array().unwrap().len(), 1);
    assert_eq!(show_json["rows"][0][0], 2001);
    assert_eq!(show_json["rows"][0][2], "red");

    let import = run(&db, &["import", "scores"]);
    assert!(import.status.success());
    assert_eq!(parse_json(&import.stdout)["registry"]["status"], "authoritative");

    let rename = run(&db, &["rename", "scores", "scores_2024"]);
    assert!(rename.status.success());

    let list = run(&db, &["list"]);
    assert!(list.status.success());
    let list_json = parse_json(&list.stdout);
    let tables = list_json["tables"].as_array().expect("tables");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["name"], "scores_2024");
    assert_eq!(tables[0]["provenance"], "table");
}

#[test]
fn select_show_includes_rows() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");

    let exec = run(
        &db,
        &["exec", "CREATE TABLE t(a INTEGER); INSERT INTO t VALUES (1), (2), (3);"],
    );
    assert!(exec.status.success());

    let select = run(&db, &["select", "SELECT sum(a) AS total FROM t", "--show"]);
    assert!(select.status.success());
    let json = parse_json(&select.stdout);
    assert_eq!(json["reused"], false);
    assert!(json["table"].as_str().unwrap().starts_with("stencila_"));
    assert_eq!(json["result"]["rows"][0][0], 6);
    assert_eq!(json["result"]["columns"][0]["name"], "total");
}

#[test]
fn list_flags_select_results_from_earlier_runs() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");

    let exec = run(&db, &["exec", "CREATE TABLE t(a INTEGER); INSERT INTO t VALUES (1);"]);
    assert!(exec.status.success());
    assert!(run(&db, &["import", "t"]).status.success());
    let select = run(&db, &["select", "SELECT a FROM t"]);
    assert!(select.status.success());
    let cached = parse_json(&select.stdout)["table"].clone();

    let list = run(&db, &["list"]);
    assert!(list.status.success());
    let list_json = parse_json(&list.stdout);
    let tables = list_json["tables"].as_array().expect("tables");
    assert_eq!(tables.len(), 2);
    for table in tables {
        if table["name"] == cached {
            assert_eq!(table["live"], false);
        } else {
            assert_eq!(table["name"], "t");
            assert_eq!(table["live"], true);
        }
    }
}

#[test]
fn malformed_row_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");
    let csv = temp.path().join("bad.csv");
    fs::write(&csv, "a,b\n1,2\n3,4\n5,6\n7,8,9\n").expect("write");

    let load = run(&db, &["load", "bad", csv.to_str().unwrap()]);
    assert_eq!(load.status.code().unwrap(), 6);
    let err = parse_json(&load.stderr);
    assert_eq!(err["error"]["kind"], "MalformedRow");
    assert_eq!(err["error"]["line"], 5);
    assert_eq!(err["error"]["expected"], 2);
    assert_eq!(err["error"]["actual"], 3);
}

#[test]
fn unsupported_format_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");
    let input = temp.path().join("data.txt");
    fs::write(&input, "a\n1\n").expect("write");

    let load = run(&db, &["load", "t", input.to_str().unwrap()]);
    assert_eq!(load.status.code().unwrap(), 5);
}

#[test]
fn show_missing_table_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");

    let show = run(&db, &["show", "missing"]);
    assert_eq!(show.status.code().unwrap(), 3);
}

#[test]
fn rename_conflict_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");

    let exec = run(&db, &["exec", "CREATE TABLE a(x); CREATE TABLE b(y);"]);
    assert!(exec.status.success());
    let rename = run(&db, &["rename", "a", "b"]);
    assert_eq!(rename.status.code().unwrap(), 4);
}

#[test]
fn usage_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db = temp.path().join("tables.db");

    let output = run(&db, &["load", "only-a-name"]);
    assert_eq!(output.status.code().unwrap(), 2);
}

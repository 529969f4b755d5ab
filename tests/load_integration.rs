// Bulk load tests: typing, staging swap, malformed rows, dialects.
use std::fs;
use std::path::PathBuf;

use tableset::api::{Cell, ErrorKind, Tableset, TablesetOptions};

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write input");
    path
}

fn tableset() -> Tableset {
    Tableset::open_in_memory(TablesetOptions::default()).expect("tableset")
}

fn declared_types(tableset: &Tableset, name: &str) -> Vec<(String, String)> {
    tableset
        .table(name)
        .columns()
        .expect("columns")
        .into_iter()
        .map(|column| (column.name, column.declared_type))
        .collect()
}

#[test]
fn load_infers_types_and_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "a,b,c\n1,2.5,x\n2,3.5,y\n");
    let tableset = tableset();

    let table = tableset.load("t", &path, true).expect("load");
    assert_eq!(table.name(), "t");
    assert_eq!(
        declared_types(&tableset, "t"),
        vec![
            ("a".to_string(), "INTEGER".to_string()),
            ("b".to_string(), "REAL".to_string()),
            ("c".to_string(), "TEXT".to_string()),
        ]
    );
    assert_eq!(
        table.rows().expect("rows"),
        vec![
            vec![Cell::Integer(1), Cell::Real(2.5), Cell::Text("x".into())],
            vec![Cell::Integer(2), Cell::Real(3.5), Cell::Text("y".into())],
        ]
    );
    assert!(!tableset.exists("stencila_t_temp").expect("exists"));
}

#[test]
fn load_report_describes_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "id,label\n1,a\n2,b\n3,c\n");
    let tableset = tableset();

    let report = tableset.load_with_report("t", &path, true).expect("load");
    assert_eq!(report.table, "t");
    assert_eq!(report.rows, 3);
    let names: Vec<_> = report.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "label"]);
}

#[test]
fn malformed_row_reports_line_and_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "a,b\n1,2\n3,4\n5,6\n7,8,9\n10,11\n");
    let tableset = tableset();

    let err = tableset.load("t", &path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRow);
    assert_eq!(err.line(), Some(5));
    assert_eq!(err.expected(), Some(2));
    assert_eq!(err.actual(), Some(3));
    assert!(!tableset.exists("t").expect("exists"));
    assert!(!tableset.exists("stencila_t_temp").expect("exists"));
}

#[test]
fn failed_load_leaves_existing_table_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = write_file(&dir, "good.csv", "a,b\n1,2\n3,4\n");
    let bad = write_file(&dir, "bad.csv", "a,b\n5,6\n7\n");
    let tableset = tableset();

    tableset.load("t", &good, true).expect("load good");
    let before = tableset.table("t").rows().expect("rows");

    let err = tableset.load("t", &bad, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRow);
    assert_eq!(err.line(), Some(3));
    assert_eq!(tableset.table("t").rows().expect("rows"), before);
}

#[test]
fn reload_replaces_existing_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_file(&dir, "first.csv", "a\n1\n2\n");
    let second = write_file(&dir, "second.csv", "x,y\nfoo,1.5\n");
    let tableset = tableset();

    tableset.load("t", &first, true).expect("load");
    let table = tableset.load("t", &second, true).expect("reload");
    assert_eq!(table.count().expect("count"), 1);
    assert_eq!(
        declared_types(&tableset, "t"),
        vec![
            ("x".to_string(), "TEXT".to_string()),
            ("y".to_string(), "REAL".to_string()),
        ]
    );
}

#[test]
fn reload_keeps_dependent_views_working() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = write_file(&dir, "first.csv", "a,b\n1,x\n2,y\n");
    let second = write_file(&dir, "second.csv", "a,b\n7,z\n");
    let tableset = tableset();

    tableset.load("t", &first, true).expect("load");
    tableset
        .execute("CREATE VIEW v AS SELECT a FROM t")
        .expect("create view");
    tableset.load("t", &second, true).expect("reload under view");

    assert!(!tableset.exists("stencila_t_temp").expect("exists"));
    let through_view = tableset.select("SELECT a FROM v", false).expect("select view");
    assert_eq!(
        through_view.rows().expect("view rows"),
        vec![vec![Cell::Integer(7)]]
    );
}

#[test]
fn headerless_files_get_synthesized_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "1,x\n2,y\n");
    let tableset = tableset();

    let table = tableset.load("t", &path, false).expect("load");
    let names: Vec<_> = declared_types(&tableset, "t")
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["_1", "_2"]);
    assert_eq!(table.count().expect("count"), 2);
}

#[test]
fn tsv_files_split_on_tabs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.tsv", "name\tnote\nann\t\"a, b\"\nbob\tc\\td\n");
    let tableset = tableset();

    let table = tableset.load("t", &path, true).expect("load");
    assert_eq!(
        table.rows().expect("rows"),
        vec![
            vec![Cell::Text("ann".into()), Cell::Text("a, b".into())],
            vec![Cell::Text("bob".into()), Cell::Text("ctd".into())],
        ]
    );
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "a\n1\n\n2\n   \n3\n\n");
    let tableset = tableset();

    let table = tableset.load("t", &path, true).expect("load");
    assert_eq!(table.count().expect("count"), 3);
}

#[test]
fn empty_numeric_cells_are_null() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "n,s\n1,a\n,\n");
    let tableset = tableset();

    let table = tableset.load("t", &path, true).expect("load");
    assert_eq!(
        table.rows().expect("rows"),
        vec![
            vec![Cell::Integer(1), Cell::Text("a".into())],
            vec![Cell::Null, Cell::Text(String::new())],
        ]
    );
}

#[test]
fn inference_only_samples_configured_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.csv", "v\n1\n2\nthree\n");
    let tableset =
        Tableset::open_in_memory(TablesetOptions::new().with_sample_rows(2)).expect("tableset");

    let table = tableset.load("t", &path, true).expect("load");
    assert_eq!(
        declared_types(&tableset, "t"),
        vec![("v".to_string(), "INTEGER".to_string())]
    );
    assert_eq!(table.count().expect("count"), 3);
}

#[test]
fn unknown_suffix_is_unsupported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "data.json", "{}\n");
    let err = tableset().load("t", &path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = tableset()
        .load("t", dir.path().join("missing.csv"), true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.path().is_some());
}

#[test]
fn empty_file_has_no_columns() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(&dir, "empty.csv", "");
    let err = tableset().load("t", &path, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

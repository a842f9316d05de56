use std::fs;

use tempfile::TempDir;

use rift_history::export::{ExportError, Record, export_csv};

fn ab(a: i64, b: i64) -> Record {
    Record::new().with("a", a).with("b", b)
}

#[test]
fn header_comes_from_first_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let report = export_csv(&[ab(1, 2), ab(3, 4)], &path).expect("export succeeds");

    assert!(report.written);
    assert_eq!(report.rows, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1,2\n3,4\n");
}

#[test]
fn empty_input_writes_no_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");

    let report = export_csv(&[], &path).expect("empty export is not an error");

    assert!(!report.written);
    assert_eq!(report.rows, 0);
    assert!(!path.exists());
}

#[test]
fn rows_with_different_keys_are_rejected_before_writing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let odd = Record::new().with("b", 1_i64).with("a", 2_i64);

    let err = export_csv(&[ab(1, 2), odd], &path).expect_err("schema mismatch");

    match err {
        ExportError::SchemaMismatch {
            row,
            expected,
            found,
        } => {
            assert_eq!(row, 1);
            assert_eq!(expected, "a,b");
            assert_eq!(found, "b,a");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!path.exists());
}

#[test]
fn text_cells_are_quoted_and_absent_cells_left_blank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out.csv");
    let row = Record::new()
        .with("name", "Lame d'infini, rouge")
        .with("lane", None::<String>)
        .with("win", Some(false))
        .with("kp", Some(0.25_f64));

    export_csv(&[row], &path).expect("export succeeds");

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "name,lane,win,kp\n\"Lame d'infini, rouge\",,false,0.25\n"
    );
}

#[test]
fn unwritable_destination_is_an_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").unwrap();
    let path = blocker.join("out.csv");

    let err = export_csv(&[ab(1, 2)], &path).expect_err("parent is a file");

    assert!(matches!(err, ExportError::Create { .. }));
}

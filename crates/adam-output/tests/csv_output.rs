//! Tests for CSV export.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use adam_model::{Table, Value};
use adam_output::{write_csv, write_csv_output};

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn adtte() -> Table {
    Table::from_rows(
        "ADTTE",
        ["STUDYID", "USUBJID", "PARAM", "ADT", "CNSR", "AVAL"],
        vec![
            vec![
                Value::text("CDISC01"),
                Value::text("001"),
                Value::text("Overall Survival, ITT"),
                date(2014, 7, 2),
                Value::Integer(1),
                Value::Integer(181),
            ],
            vec![
                Value::text("CDISC01"),
                Value::text("002"),
                Value::text("Overall Survival, ITT"),
                date(2012, 9, 2),
                Value::Integer(0),
                Value::Missing,
            ],
        ],
    )
    .unwrap()
}

#[test]
fn writes_header_dates_and_blanks() {
    let dir = TempDir::new().expect("temp dir");
    let summary = write_csv_output(dir.path(), &adtte(), None).expect("write csv");

    assert_eq!(summary.path, dir.path().join("adtte.csv"));
    assert_eq!(summary.records, 2);
    let contents = fs::read_to_string(&summary.path).expect("read back");
    insta::assert_snapshot!(contents, @r#"
    STUDYID,USUBJID,PARAM,ADT,CNSR,AVAL
    CDISC01,001,"Overall Survival, ITT",2014-07-02,1,181
    CDISC01,002,"Overall Survival, ITT",2012-09-02,0,
    "#);
}

#[test]
fn identical_tables_give_identical_digests() {
    let dir = TempDir::new().expect("temp dir");
    let first = write_csv(&adtte(), &dir.path().join("a/adtte.csv")).expect("first");
    let second = write_csv(&adtte(), &dir.path().join("b/adtte.csv")).expect("second");
    assert_eq!(first.sha256, second.sha256);
    assert_eq!(first.sha256.len(), 64);

    let mut changed = adtte();
    changed
        .set_column("CNSR", vec![Value::Integer(0), Value::Integer(0)])
        .unwrap();
    let third = write_csv(&changed, &dir.path().join("c/adtte.csv")).expect("third");
    assert_ne!(first.sha256, third.sha256);
}

#[test]
fn custom_file_name_is_used() {
    let dir = TempDir::new().expect("temp dir");
    let summary =
        write_csv_output(dir.path(), &adtte(), Some("adtte_os.csv")).expect("write csv");
    assert!(summary.path.ends_with("adtte_os.csv"));
    assert!(summary.path.exists());
}

//! Tests for CSV loading.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::TempDir;

use adam_ingest::{TableSchema, read_csv_table};
use adam_model::Value;

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

#[test]
fn reads_typed_subject_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(
        &dir,
        "adsl.csv",
        "STUDYID,USUBJID,TRTSDT,DTHDT,AGE\n\
         CDISC01,001,2014-01-02,,63\n\
         CDISC01,002,02-Aug-2012,2012-09-02,71\n",
    );
    let schema = TableSchema::new()
        .with_dates(["TRTSDT", "DTHDT"])
        .with_integers(["AGE"]);
    let table = read_csv_table(&path, "ADSL", &schema).expect("read table");

    assert_eq!(table.name(), "ADSL");
    assert_eq!(table.height(), 2);
    assert_eq!(table.columns(), ["STUDYID", "USUBJID", "TRTSDT", "DTHDT", "AGE"]);
    // Identifiers stay text, leading zeros included.
    assert_eq!(table.value(0, "USUBJID"), Some(&Value::text("001")));
    assert_eq!(
        table.value(1, "TRTSDT"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2012, 8, 2).unwrap()))
    );
    assert_eq!(table.value(0, "DTHDT"), Some(&Value::Missing));
    assert_eq!(table.value(1, "AGE"), Some(&Value::Integer(71)));
}

#[test]
fn partial_dates_load_as_missing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "ae.csv", "USUBJID,ASTDT\n001,2014-03\n001,2014-03-09\n");
    let schema = TableSchema::new().with_dates(["ASTDT"]);
    let table = read_csv_table(&path, "ADAE", &schema).expect("read table");

    assert_eq!(table.value(0, "ASTDT"), Some(&Value::Missing));
    assert!(table.value(1, "ASTDT").is_some_and(|value| value.as_date().is_some()));
}

#[test]
fn declared_column_must_exist() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "adsl.csv", "USUBJID\n001\n");
    let schema = TableSchema::new().with_dates(["TRTSDT"]);
    let err = read_csv_table(&path, "ADSL", &schema).unwrap_err();
    assert!(format!("{err:#}").contains("TRTSDT"));
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let err = read_csv_table(&path, "ADSL", &TableSchema::default()).unwrap_err();
    assert!(format!("{err:#}").contains("absent.csv"));
}

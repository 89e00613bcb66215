//! Subject lookup over source tables.

use std::collections::HashMap;

use adam_model::{Result, Table, Value};

use crate::group::group_positions;

/// Row positions of a table grouped by subject identifier.
///
/// Rows keep their original order within a subject and are never
/// deduplicated. Rows with a missing subject identifier are not indexed.
#[derive(Debug, Clone)]
pub struct SubjectIndex {
    rows: HashMap<Value, Vec<usize>>,
}

impl SubjectIndex {
    /// Index `table` by `subject_column`.
    ///
    /// Fails with `MalformedInput` when the column does not exist.
    pub fn build(table: &Table, subject_column: &str) -> Result<Self> {
        let col = table.require_column(subject_column)?;
        let keys = table.rows().map(|row| {
            let value = &row.values()[col];
            (!value.is_missing()).then(|| value.clone())
        });
        Ok(Self {
            rows: group_positions(keys),
        })
    }

    /// Row positions for a subject; empty when the subject has no rows.
    pub fn rows_for(&self, subject: &Value) -> &[usize] {
        self.rows.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subject_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adam_model::TteError;

    #[test]
    fn indexes_rows_in_order() {
        let table = Table::from_rows(
            "AE",
            ["USUBJID", "AETERM"],
            vec![
                vec![Value::text("S1"), Value::text("HEADACHE")],
                vec![Value::text("S2"), Value::text("NAUSEA")],
                vec![Value::text("S1"), Value::text("HEADACHE")],
                vec![Value::Missing, Value::text("RASH")],
            ],
        )
        .unwrap();
        let index = SubjectIndex::build(&table, "USUBJID").unwrap();
        assert_eq!(index.rows_for(&Value::text("S1")), &[0, 2]);
        assert_eq!(index.rows_for(&Value::text("S3")), &[] as &[usize]);
        assert_eq!(index.subject_count(), 2);
    }

    #[test]
    fn missing_subject_column_is_malformed() {
        let table = Table::from_rows("AE", ["SUBJID"], vec![]).unwrap();
        let err = SubjectIndex::build(&table, "USUBJID").unwrap_err();
        assert!(matches!(err, TteError::MalformedInput(_)));
    }
}

//! Left join of subject-level attributes onto derived records.

use adam_model::{Result, Table, TteError, Value};

use crate::group::sorted_runs;

/// Attach the columns of `subject_table` to every row of `derived`.
///
/// Every derived row is kept exactly once and in order. Rows without a
/// matching subject get `Missing` in the attached columns. Subject columns
/// already present in `derived` (the join keys included) are not attached
/// again. Keys containing a missing value never match.
///
/// Fails with `AmbiguousJoin` when `subject_table` holds a key more than
/// once, since that would silently duplicate derived rows. Subject rows whose
/// key has a missing part are left out of the lookup, so they are also exempt
/// from this duplicate check.
pub fn merge_subject_attributes(
    derived: &Table,
    subject_table: &Table,
    join_keys: &[&str],
) -> Result<Table> {
    let left_cols = join_keys
        .iter()
        .map(|key| derived.require_column(key))
        .collect::<Result<Vec<_>>>()?;
    let right_cols = join_keys
        .iter()
        .map(|key| subject_table.require_column(key))
        .collect::<Result<Vec<_>>>()?;

    let runs = sorted_runs(
        subject_table
            .rows()
            .map(|row| join_key(row.values(), &right_cols)),
    );
    let mut lookup = std::collections::HashMap::with_capacity(runs.len());
    for (key, positions) in runs {
        if positions.len() > 1 {
            return Err(TteError::AmbiguousJoin {
                table: subject_table.name().to_string(),
                key: render_key(&key),
                count: positions.len(),
            });
        }
        lookup.insert(key, positions[0]);
    }

    let attached: Vec<(usize, &String)> = subject_table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| !derived.has_column(column))
        .collect();

    let mut columns: Vec<String> = derived.columns().to_vec();
    columns.extend(attached.iter().map(|(_, column)| (*column).clone()));
    let mut merged = Table::new(derived.name(), columns)?;

    for row in derived.rows() {
        let matched = join_key(row.values(), &left_cols)
            .and_then(|key| lookup.get(&key).copied())
            .and_then(|position| subject_table.row(position));
        let mut values = row.values().to_vec();
        for &(col, _) in &attached {
            values.push(matched.map_or(Value::Missing, |subject| subject.values()[col].clone()));
        }
        merged.push_row(values)?;
    }
    Ok(merged)
}

fn join_key(values: &[Value], cols: &[usize]) -> Option<Vec<Value>> {
    let key: Vec<Value> = cols.iter().map(|&col| values[col].clone()).collect();
    (!key.iter().any(Value::is_missing)).then_some(key)
}

fn render_key(key: &[Value]) -> String {
    key.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Value {
        Value::text(value)
    }

    fn derived() -> Table {
        Table::from_rows(
            "ADTTE",
            ["USUBJID", "PARAMCD"],
            vec![
                vec![text("S1"), text("OS")],
                vec![text("S9"), text("OS")],
                vec![text("S1"), text("PFS")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn left_join_keeps_unmatched_rows() {
        let adsl = Table::from_rows(
            "ADSL",
            ["USUBJID", "ARM", "AGE"],
            vec![vec![text("S1"), text("Placebo"), Value::Integer(63)]],
        )
        .unwrap();
        let merged = merge_subject_attributes(&derived(), &adsl, &["USUBJID"]).unwrap();

        assert_eq!(merged.height(), 3);
        assert_eq!(merged.columns(), ["USUBJID", "PARAMCD", "ARM", "AGE"]);
        assert_eq!(merged.value(0, "ARM"), Some(&text("Placebo")));
        assert_eq!(merged.value(1, "USUBJID"), Some(&text("S9")));
        assert_eq!(merged.value(1, "ARM"), Some(&Value::Missing));
        assert_eq!(merged.value(2, "AGE"), Some(&Value::Integer(63)));
    }

    #[test]
    fn duplicate_subjects_are_ambiguous() {
        let adsl = Table::from_rows(
            "ADSL",
            ["USUBJID", "ARM"],
            vec![
                vec![text("S1"), text("Placebo")],
                vec![text("S1"), text("Xanomeline")],
            ],
        )
        .unwrap();
        let err = merge_subject_attributes(&derived(), &adsl, &["USUBJID"]).unwrap_err();
        match err {
            TteError::AmbiguousJoin { key, count, .. } => {
                assert_eq!(key, "S1");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn subjects_with_missing_keys_skip_the_duplicate_check() {
        let adsl = Table::from_rows(
            "ADSL",
            ["USUBJID", "ARM"],
            vec![
                vec![text("S1"), text("Placebo")],
                vec![Value::Missing, text("Screen Failure")],
                vec![Value::Missing, text("Screen Failure")],
            ],
        )
        .unwrap();
        let merged = merge_subject_attributes(&derived(), &adsl, &["USUBJID"]).unwrap();

        assert_eq!(merged.height(), 3);
        assert_eq!(merged.value(0, "ARM"), Some(&text("Placebo")));
        assert_eq!(merged.value(1, "ARM"), Some(&Value::Missing));
    }

    #[test]
    fn missing_join_key_is_malformed() {
        let adsl = Table::from_rows("ADSL", ["SUBJID"], vec![]).unwrap();
        let err = merge_subject_attributes(&derived(), &adsl, &["USUBJID"]).unwrap_err();
        assert!(matches!(err, TteError::MalformedInput(_)));
    }
}

//! Analysis sequence number (`ASEQ`) derivation.

use adam_model::{Result, Table, Value, columns};

use crate::group::sorted_runs;

/// Sort `table` by `group_keys` then `order_keys` and number rows 1, 2, 3, …
/// within each group, writing the result to `ASEQ`.
///
/// The sort is stable: rows with identical keys keep their relative order.
/// For ADTTE the group is (`STUDYID`, `USUBJID`) and the order is `PARAMCD`,
/// so numbering follows parameter codes rather than derivation order.
pub fn derive_sequence(table: &mut Table, group_keys: &[&str], order_keys: &[&str]) -> Result<()> {
    let group_cols = group_keys
        .iter()
        .map(|key| table.require_column(key))
        .collect::<Result<Vec<_>>>()?;
    let order_cols = order_keys
        .iter()
        .map(|key| table.require_column(key))
        .collect::<Result<Vec<_>>>()?;

    let runs = sorted_runs(
        (0..table.height()).map(|position| Some(key_of_row(table, position, &group_cols))),
    );

    let mut order = Vec::with_capacity(table.height());
    for (_, mut positions) in runs {
        positions.sort_by_cached_key(|&position| key_of_row(table, position, &order_cols));
        order.extend(positions);
    }

    table.reorder_rows(&order)?;
    let mut seqs = Vec::with_capacity(order.len());
    let mut previous: Option<Vec<Value>> = None;
    let mut seq = 0;
    for position in 0..table.height() {
        let key = key_of_row(table, position, &group_cols);
        if previous.as_ref() == Some(&key) {
            seq += 1;
        } else {
            seq = 1;
            previous = Some(key);
        }
        seqs.push(Value::Integer(seq));
    }
    table.set_column(columns::ASEQ, seqs)
}

fn key_of_row(table: &Table, position: usize, cols: &[usize]) -> Vec<Value> {
    table
        .row(position)
        .map(|row| cols.iter().map(|&col| row.values()[col].clone()).collect())
        .unwrap_or_default()
}

//! Analysis value (`AVAL`) derivation.
//!
//! `AVAL` is the number of whole calendar days from the start date to the
//! chosen event or censoring date (`end - start`). Unlike the SDTM study day
//! there is no "+1": a same-day event has `AVAL = 0`, and an end date before
//! the start date gives a negative value that is kept as-is.

use chrono::NaiveDate;

use adam_model::{Result, Table, TteError, Value, columns};

/// Unit recorded in `AVALU` next to every derived duration.
pub const DURATION_UNIT: &str = "DAYS";

/// Whole days from `start` to `end`; negative when `end` precedes `start`.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use adam_tte::duration::days_between;
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
/// assert_eq!(days_between(start, end), 30);
/// assert_eq!(days_between(end, start), -30);
/// ```
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Set `AVAL` and `AVALU` on every row of `table`.
///
/// Rows with a missing start or end date get missing `AVAL` and `AVALU`.
/// Fails with `MalformedInput` when either column is absent or holds a
/// non-date value.
pub fn derive_duration(table: &mut Table, start_field: &str, end_field: &str) -> Result<()> {
    let start_col = table.require_column(start_field)?;
    let end_col = table.require_column(end_field)?;

    let mut avals = Vec::with_capacity(table.height());
    let mut units = Vec::with_capacity(table.height());
    for row in table.rows() {
        let values = row.values();
        let start = date_cell(table, start_field, &values[start_col])?;
        let end = date_cell(table, end_field, &values[end_col])?;
        match (start, end) {
            (Some(start), Some(end)) => {
                avals.push(Value::Integer(days_between(start, end)));
                units.push(Value::text(DURATION_UNIT));
            }
            _ => {
                avals.push(Value::Missing);
                units.push(Value::Missing);
            }
        }
    }
    table.set_column(columns::AVAL, avals)?;
    table.set_column(columns::AVALU, units)?;
    Ok(())
}

fn date_cell(table: &Table, column: &str, value: &Value) -> Result<Option<NaiveDate>> {
    match value {
        Value::Date(date) => Ok(Some(*date)),
        Value::Missing => Ok(None),
        other => Err(TteError::MalformedInput(format!(
            "column {column} in table {} holds a {} value, expected a date",
            table.name(),
            other.kind_name()
        ))),
    }
}

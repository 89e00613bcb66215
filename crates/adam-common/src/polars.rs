//! Polars AnyValue and DataFrame conversion functions.
//!
//! Loaders read CSV files into Polars DataFrames; derivations run on
//! [`Table`]. This module converts between the two in both directions.

use chrono::NaiveDate;
use polars::prelude::{AnyValue, Column, DataFrame, PolarsResult};

use adam_model::{Result, Table, Value};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats numeric types without
/// unnecessary trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use adam_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("hello")), "hello");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "Y" } else { "N" }.to_string(),
        AnyValue::Date(days) => date_from_epoch_days(days)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Converts a Polars `AnyValue` into a typed cell.
///
/// Integers and integral floats become [`Value::Integer`], Polars dates become
/// [`Value::Date`], blank strings and nulls become [`Value::Missing`], and
/// everything else is kept as text.
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Missing,
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).map_or_else(|_| Value::text(v.to_string()), Value::Integer),
        AnyValue::Float32(v) => float_to_value(f64::from(v)),
        AnyValue::Float64(v) => float_to_value(v),
        AnyValue::Date(days) => date_from_epoch_days(days).map_or(Value::Missing, Value::Date),
        other => Value::text(any_to_string(other)),
    }
}

fn float_to_value(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::Integer(v as i64)
    } else if v.is_nan() {
        Value::Missing
    } else {
        Value::Text(format_numeric(v))
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_FROM_CE)?)
}

/// Converts a DataFrame into a typed [`Table`], preserving column and row order.
pub fn dataframe_to_table(name: &str, df: &DataFrame) -> Result<Table> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|column| column.to_string())
        .collect();
    let mut table = Table::new(name, columns)?;
    let source_columns = df.get_columns();
    for idx in 0..df.height() {
        let row = source_columns
            .iter()
            .map(|column| any_to_value(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

/// Converts a [`Table`] into a DataFrame for export.
///
/// Columns whose non-missing values are all integers become `Int64`; every
/// other column becomes a string column with dates rendered as ISO 8601.
pub fn table_to_dataframe(table: &Table) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(table.columns().len());
    for (col_idx, name) in table.columns().iter().enumerate() {
        let cells: Vec<&Value> = table.rows().map(|row| &row.values()[col_idx]).collect();
        let all_integer = cells
            .iter()
            .all(|value| matches!(value, Value::Integer(_) | Value::Missing));
        let column = if all_integer {
            let values: Vec<Option<i64>> = cells.iter().map(|value| value.as_integer()).collect();
            Column::new(name.as_str().into(), values)
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|value| (!value.is_missing()).then(|| value.to_string()))
                .collect();
            Column::new(name.as_str().into(), values)
        };
        columns.push(column);
    }
    DataFrame::new(columns)
}

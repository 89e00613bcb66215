//! CSV loading into typed tables.
//!
//! Every column is read as text first so that values such as `"001"` or
//! `"NA"` survive untouched. Columns named in the [`TableSchema`] are then
//! converted: dates through [`parse_date_precision`], integers through
//! `i64::from_str`. Undeclared columns stay text.

use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use adam_common::dataframe_to_table;
use adam_model::{Table, Value};

use crate::datetime::{DatePrecision, parse_date_precision};

/// Typed columns of one input table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Columns parsed as calendar dates. Partial or unparseable values
    /// become missing.
    #[serde(default)]
    pub date_columns: Vec<String>,
    /// Columns parsed as integers. A non-integer value is an error.
    #[serde(default)]
    pub integer_columns: Vec<String>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dates<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_integers<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integer_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }
}

/// Read a CSV file with a header row into a DataFrame of string columns.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))?;
    Ok(df)
}

/// Load a CSV file as table `name`, typing the columns listed in `schema`.
pub fn read_csv_table(path: &Path, name: &str, schema: &TableSchema) -> Result<Table> {
    let df = read_csv_frame(path)?;
    let mut table = dataframe_to_table(name, &df)
        .with_context(|| format!("Failed to load {} as {name}", path.display()))?;
    apply_schema(&mut table, schema)
        .with_context(|| format!("Failed to type columns of {}", path.display()))?;
    debug!(
        table = name,
        path = %path.display(),
        rows = table.height(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

/// Convert the declared columns of an all-text table in place.
pub fn apply_schema(table: &mut Table, schema: &TableSchema) -> Result<()> {
    for column in &schema.date_columns {
        let values = typed_column(table, column, |cell| Ok(date_value(cell)))?;
        let unparsed = count_lost(table, column, &values);
        if unparsed > 0 {
            warn!(
                table = table.name(),
                column = column.as_str(),
                unparsed,
                "incomplete or unrecognised dates treated as missing"
            );
        }
        table.set_column(column, values)?;
    }
    for column in &schema.integer_columns {
        let name = table.name().to_string();
        let values = typed_column(table, column, |cell| integer_value(&name, column, cell))?;
        table.set_column(column, values)?;
    }
    Ok(())
}

fn typed_column<F>(table: &Table, column: &str, mut convert: F) -> Result<Vec<Value>>
where
    F: FnMut(&Value) -> Result<Value>,
{
    let col = table.require_column(column)?;
    table
        .rows()
        .map(|row| convert(&row.values()[col]))
        .collect()
}

fn date_value(cell: &Value) -> Value {
    match cell {
        Value::Text(text) => match parse_date_precision(text) {
            DatePrecision::Complete(date) => Value::Date(date),
            _ => Value::Missing,
        },
        other => other.clone(),
    }
}

fn integer_value(table: &str, column: &str, cell: &Value) -> Result<Value> {
    match cell {
        Value::Text(text) => match text.trim().parse::<i64>() {
            Ok(value) => Ok(Value::Integer(value)),
            Err(_) => bail!("column {column} in table {table} holds non-integer value \"{text}\""),
        },
        other => Ok(other.clone()),
    }
}

fn count_lost(table: &Table, column: &str, converted: &[Value]) -> usize {
    let Some(col) = table.column_index(column) else {
        return 0;
    };
    table
        .rows()
        .zip(converted)
        .filter(|(row, value)| !row.values()[col].is_missing() && value.is_missing())
        .count()
}

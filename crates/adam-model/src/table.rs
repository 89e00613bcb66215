//! In-memory tables with named, typed columns.

use std::collections::HashMap;

use crate::error::{Result, TteError};
use crate::value::Value;

/// A named table with ordered columns and ordered rows.
///
/// Column names are unique and every row holds exactly one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    positions: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Result<Self> {
        let name = name.into();
        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if positions.insert(column.clone(), idx).is_some() {
                return Err(TteError::MalformedInput(format!(
                    "duplicate column {column} in table {name}"
                )));
            }
        }
        Ok(Self {
            name,
            columns,
            positions,
            rows: Vec::new(),
        })
    }

    /// Build a table from column names and row values in one step.
    pub fn from_rows<C, S>(name: impl Into<String>, columns: C, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(name, columns.into_iter().map(Into::into).collect())?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Position of a column that must exist.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| TteError::missing_column(&self.name, column))
    }

    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(TteError::MalformedInput(format!(
                "row {} of table {} has {} values, expected {}",
                self.rows.len(),
                self.name,
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        (index < self.rows.len()).then_some(RowView { table: self, index })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = RowView<'_>> + '_ {
        (0..self.rows.len()).map(move |index| RowView { table: self, index })
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|values| &values[col])
    }

    /// Add a column, or replace the values of an existing one.
    pub fn set_column(&mut self, column: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(TteError::MalformedInput(format!(
                "column {column} has {} values but table {} has {} rows",
                values.len(),
                self.name,
                self.rows.len()
            )));
        }
        match self.column_index(column) {
            Some(col) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.positions.insert(column.to_string(), self.columns.len());
                self.columns.push(column.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Rearrange rows so that row `i` of the result is row `order[i]` of `self`.
    ///
    /// `order` must be a permutation of `0..height`.
    pub fn reorder_rows(&mut self, order: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.rows.len()];
        if order.len() != self.rows.len()
            || order
                .iter()
                .any(|&idx| idx >= seen.len() || std::mem::replace(&mut seen[idx], true))
        {
            return Err(TteError::MalformedInput(format!(
                "row order for table {} is not a permutation",
                self.name
            )));
        }
        let mut taken: Vec<Option<Vec<Value>>> = self.rows.drain(..).map(Some).collect();
        self.rows = order
            .iter()
            .filter_map(|&idx| taken[idx].take())
            .collect();
        Ok(())
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn table_name(&self) -> &'a str {
        &self.table.name
    }

    /// Value of a column, or `None` when the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let col = self.table.column_index(column)?;
        Some(&self.table.rows[self.index][col])
    }

    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }
}

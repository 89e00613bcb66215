//! Row predicates for source filters.
//!
//! A source filter answers one question: does this row qualify? Two
//! implementations exist behind [`RowPredicate`]:
//!
//! - [`Condition`], a serializable expression tree used by study configuration files
//! - [`PredicateFn`], a wrapper around a plain closure for programmatic callers
//!
//! Evaluation must be pure. Failures (unknown column, a literal that cannot be
//! compared with the cell) are reported as `Err(message)` and become fatal
//! `FilterEvaluation` errors in the deriver.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::RowView;
use crate::value::Value;

/// A single-method row filter.
pub trait RowPredicate: Send + Sync {
    fn evaluate(&self, row: &RowView<'_>) -> Result<bool, String>;

    /// Human-readable form for logs and `Debug` output.
    fn describe(&self) -> String {
        "<custom predicate>".to_string()
    }
}

/// Closure-backed predicate.
pub struct PredicateFn<F>(pub F);

impl<F> RowPredicate for PredicateFn<F>
where
    F: Fn(&RowView<'_>) -> Result<bool, String> + Send + Sync,
{
    fn evaluate(&self, row: &RowView<'_>) -> Result<bool, String> {
        (self.0)(row)
    }
}

impl<F> fmt::Debug for PredicateFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateFn")
    }
}

/// Literal operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "\"{value}\""),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Filter expression evaluated against one row.
///
/// A missing cell makes every comparison false, `ne` included; only
/// `is_missing` matches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Eq { column: String, value: Literal },
    Ne { column: String, value: Literal },
    In { column: String, values: Vec<Literal> },
    Lt { column: String, value: Literal },
    Le { column: String, value: Literal },
    Gt { column: String, value: Literal },
    Ge { column: String, value: Literal },
    IsMissing { column: String },
    NotMissing { column: String },
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::Ne {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_in<L: Into<Literal>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = L>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_missing(column: impl Into<String>) -> Self {
        Self::NotMissing {
            column: column.into(),
        }
    }

    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::And {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Or {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn negate(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// Column names referenced anywhere in the expression.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Eq { column, .. }
            | Self::Ne { column, .. }
            | Self::In { column, .. }
            | Self::Lt { column, .. }
            | Self::Le { column, .. }
            | Self::Gt { column, .. }
            | Self::Ge { column, .. }
            | Self::IsMissing { column }
            | Self::NotMissing { column } => {
                if !out.contains(&column.as_str()) {
                    out.push(column);
                }
            }
            Self::And { conditions } | Self::Or { conditions } => {
                for condition in conditions {
                    condition.collect_columns(out);
                }
            }
            Self::Not { condition } => condition.collect_columns(out),
        }
    }

    pub fn evaluate(&self, row: &RowView<'_>) -> Result<bool, String> {
        match self {
            Self::Eq { column, value } => {
                compare(cell(row, column)?, value).map(|ord| ord == Some(Ordering::Equal))
            }
            Self::Ne { column, value } => compare(cell(row, column)?, value)
                .map(|ord| matches!(ord, Some(Ordering::Less | Ordering::Greater))),
            Self::In { column, values } => {
                let cell = cell(row, column)?;
                for value in values {
                    if compare(cell, value)? == Some(Ordering::Equal) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Lt { column, value } => {
                compare(cell(row, column)?, value).map(|ord| ord == Some(Ordering::Less))
            }
            Self::Le { column, value } => compare(cell(row, column)?, value)
                .map(|ord| matches!(ord, Some(Ordering::Less | Ordering::Equal))),
            Self::Gt { column, value } => {
                compare(cell(row, column)?, value).map(|ord| ord == Some(Ordering::Greater))
            }
            Self::Ge { column, value } => compare(cell(row, column)?, value)
                .map(|ord| matches!(ord, Some(Ordering::Greater | Ordering::Equal))),
            Self::IsMissing { column } => Ok(cell(row, column)?.is_missing()),
            Self::NotMissing { column } => Ok(!cell(row, column)?.is_missing()),
            Self::And { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or { conditions } => {
                for condition in conditions {
                    if condition.evaluate(row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not { condition } => condition.evaluate(row).map(|matched| !matched),
        }
    }
}

impl RowPredicate for Condition {
    fn evaluate(&self, row: &RowView<'_>) -> Result<bool, String> {
        Condition::evaluate(self, row)
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

fn cell<'a>(row: &RowView<'a>, column: &str) -> Result<&'a Value, String> {
    row.get(column)
        .ok_or_else(|| format!("unknown column {column} in table {}", row.table_name()))
}

/// Order a cell against a literal, coercing the literal to the cell's type.
///
/// Returns `Ok(None)` for missing cells.
fn compare(cell: &Value, literal: &Literal) -> Result<Option<Ordering>, String> {
    let ordering = match (cell, literal) {
        (Value::Missing, _) => return Ok(None),
        (Value::Text(text), Literal::Text(lit)) => text.as_str().cmp(lit.as_str()),
        (Value::Text(text), Literal::Integer(lit)) => {
            let parsed = text
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("cannot compare text value \"{text}\" with {literal}"))?;
            parsed.cmp(lit)
        }
        (Value::Integer(value), Literal::Integer(lit)) => value.cmp(lit),
        (Value::Integer(value), Literal::Text(lit)) => {
            let parsed = lit
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("cannot compare integer value {value} with {literal}"))?;
            value.cmp(&parsed)
        }
        (Value::Date(date), Literal::Text(lit)) => {
            let parsed = NaiveDate::parse_from_str(lit.trim(), "%Y-%m-%d")
                .map_err(|_| format!("literal {literal} is not an ISO 8601 date"))?;
            date.cmp(&parsed)
        }
        (Value::Date(_), Literal::Integer(_)) => {
            return Err(format!("cannot compare date value with {literal}"));
        }
    };
    Ok(Some(ordering))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn table() -> Table {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        Table::from_rows(
            "ADRS",
            ["USUBJID", "AVALC", "ADT", "AVISITN"],
            vec![
                vec![
                    Value::text("S1"),
                    Value::text("PD"),
                    Value::Date(date),
                    Value::Integer(3),
                ],
                vec![
                    Value::text("S2"),
                    Value::Missing,
                    Value::Missing,
                    Value::Missing,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn equality_and_membership() {
        let table = table();
        let row = table.row(0).unwrap();
        assert!(Condition::eq("AVALC", "PD").evaluate(&row).unwrap());
        assert!(!Condition::ne("AVALC", "PD").evaluate(&row).unwrap());
        assert!(Condition::is_in("AVALC", ["CR", "PD"]).evaluate(&row).unwrap());
        assert!(Condition::eq("AVISITN", 3).evaluate(&row).unwrap());
    }

    #[test]
    fn missing_cells_never_compare() {
        let table = table();
        let row = table.row(1).unwrap();
        assert!(!Condition::eq("AVALC", "PD").evaluate(&row).unwrap());
        assert!(!Condition::ne("AVALC", "PD").evaluate(&row).unwrap());
        assert!(
            Condition::IsMissing {
                column: "AVALC".to_string()
            }
            .evaluate(&row)
            .unwrap()
        );
    }

    #[test]
    fn date_comparisons_parse_literals() {
        let table = table();
        let row = table.row(0).unwrap();
        let before_cutoff = Condition::Le {
            column: "ADT".to_string(),
            value: Literal::from("2021-03-01"),
        };
        assert!(before_cutoff.evaluate(&row).unwrap());

        let bad = Condition::eq("ADT", "March");
        assert!(bad.evaluate(&row).is_err());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let table = table();
        let row = table.row(0).unwrap();
        let err = Condition::eq("PARAMCD", "OVR").evaluate(&row).unwrap_err();
        assert!(err.contains("PARAMCD"));
    }

    #[test]
    fn boolean_combinators() {
        let table = table();
        let row = table.row(0).unwrap();
        let condition = Condition::and([
            Condition::not_missing("ADT"),
            Condition::negate(Condition::eq("AVALC", "CR")),
        ]);
        assert!(condition.evaluate(&row).unwrap());
        assert_eq!(condition.columns(), vec!["ADT", "AVALC"]);
    }

    #[test]
    fn deserializes_tagged_json() {
        let json = r#"{"op":"and","conditions":[
            {"op":"eq","column":"PARAMCD","value":"OVR"},
            {"op":"in","column":"AVALC","values":["PD", 5]}
        ]}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(
            condition,
            Condition::and([
                Condition::eq("PARAMCD", "OVR"),
                Condition::In {
                    column: "AVALC".to_string(),
                    values: vec![Literal::from("PD"), Literal::Integer(5)],
                },
            ])
        );
    }
}

//! Candidate collection for one subject.

use std::collections::HashMap;

use chrono::NaiveDate;

use adam_model::{Result, SourceAttributes, SourceDefinition, SourceKind, Table, TteError, Value};

use crate::index::SubjectIndex;

/// A dated row that passed its source's filter.
///
/// Candidates only live while one subject is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub date: NaiveDate,
    pub kind: SourceKind,
    pub attributes: &'a SourceAttributes,
    pub source_seq: Option<i64>,
}

impl Candidate<'_> {
    pub fn is_event(&self) -> bool {
        self.kind.is_event()
    }
}

/// Source tables by name, each indexed by subject.
///
/// Built once per derivation call and read-only afterwards, so it can be
/// shared across worker threads.
#[derive(Debug)]
pub struct IndexedTables<'a> {
    tables: HashMap<&'a str, (&'a Table, SubjectIndex)>,
}

impl<'a> IndexedTables<'a> {
    /// Index every table referenced by `sources`.
    ///
    /// Fails with `MalformedInput` when a referenced table was not supplied or
    /// lacks the subject, date or sequence column.
    pub fn build<'s>(
        tables: &HashMap<&'a str, &'a Table>,
        sources: impl IntoIterator<Item = &'s SourceDefinition>,
        subject_column: &str,
    ) -> Result<Self> {
        let mut indexed: HashMap<&'a str, (&'a Table, SubjectIndex)> = HashMap::new();
        for source in sources {
            let name = source.source_table();
            let (&key, &table) = tables
                .get_key_value(name)
                .ok_or_else(|| TteError::missing_table(name))?;
            table.require_column(source.date_field())?;
            if let Some(field) = source.sequence_field() {
                table.require_column(field)?;
            }
            if !indexed.contains_key(key) {
                let index = SubjectIndex::build(table, subject_column)?;
                indexed.insert(key, (table, index));
            }
        }
        Ok(Self { tables: indexed })
    }

    fn get(&self, name: &str) -> Result<&(&'a Table, SubjectIndex)> {
        self.tables
            .get(name)
            .ok_or_else(|| TteError::missing_table(name))
    }
}

/// Collect the candidates of one subject across `sources`, in source order
/// and then row order.
///
/// A subject absent from a source table contributes nothing. Rows with a
/// missing date are skipped. Filter failures are fatal.
pub fn collect_candidates<'s>(
    subject: &Value,
    sources: &'s [SourceDefinition],
    tables: &IndexedTables<'_>,
) -> Result<Vec<Candidate<'s>>> {
    let mut candidates = Vec::new();
    for source in sources {
        let (table, index) = tables.get(source.source_table())?;
        for &position in index.rows_for(subject) {
            let Some(row) = table.row(position) else {
                continue;
            };
            let accepted = source
                .accepts(&row)
                .map_err(|message| TteError::FilterEvaluation {
                    table: table.name().to_string(),
                    subject: subject.to_string(),
                    message,
                })?;
            if !accepted {
                continue;
            }
            let date = match row.get(source.date_field()) {
                Some(Value::Date(date)) => *date,
                Some(Value::Missing) => continue,
                Some(other) => {
                    return Err(TteError::MalformedInput(format!(
                        "column {} in table {} holds a {} value, expected a date",
                        source.date_field(),
                        table.name(),
                        other.kind_name()
                    )));
                }
                None => return Err(TteError::missing_column(table.name(), source.date_field())),
            };
            let source_seq = match source.sequence_field() {
                Some(field) => read_sequence(table, field, row.get(field))?,
                None => None,
            };
            candidates.push(Candidate {
                date,
                kind: source.kind(),
                attributes: source.attributes(),
                source_seq,
            });
        }
    }
    Ok(candidates)
}

fn read_sequence(table: &Table, field: &str, value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        Some(Value::Integer(seq)) => Ok(Some(*seq)),
        Some(Value::Missing) => Ok(None),
        Some(Value::Text(text)) => text.parse::<i64>().map(Some).map_err(|_| {
            TteError::MalformedInput(format!(
                "column {field} in table {} holds non-integer value \"{text}\"",
                table.name()
            ))
        }),
        Some(Value::Date(_)) => Err(TteError::MalformedInput(format!(
            "column {field} in table {} holds a date, expected an integer",
            table.name()
        ))),
        None => Err(TteError::missing_column(table.name(), field)),
    }
}

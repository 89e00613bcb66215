//! Per-parameter time-to-event derivation.
//!
//! For every subject of the subject-level table, candidates are collected
//! from the event sources and then the censoring sources, the earliest one is
//! selected, and a [`DerivedRecord`] is emitted. Subjects without any
//! candidate produce no record.
//!
//! # Tie-break contract
//!
//! At equal dates the first candidate in collection order wins, and events
//! are collected before censoring observations. Callers that want "event
//! beats censor at the same date" must therefore list the event that should
//! win in `events`, not in `censors`. The deriver does not enforce any other
//! precedence.
//!
//! The chosen date is not required to fall on or after the start date.

use std::collections::HashMap;

use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, debug_span};

use adam_model::{
    DerivedRecord, ParameterAttributes, Result, RowView, SourceDefinition, Table, TteError, Value,
    columns,
};

use crate::collect::{IndexedTables, collect_candidates};
use crate::select::select_earliest;

/// Options controlling how a derivation runs.
///
/// Subject and source tables are keyed by the ADaM identifiers `STUDYID`
/// and `USUBJID`.
#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    /// Evaluate subjects on the rayon thread pool. Output order is unchanged.
    pub parallel: bool,
}

impl DeriveOptions {
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Everything needed to derive one analysis parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub parameter: ParameterAttributes,
    /// Subject-level column holding the start date (e.g. `TRTSDT`, `RANDDT`).
    pub start_date_field: String,
    /// Event sources, evaluated before `censors`.
    pub events: Vec<SourceDefinition>,
    pub censors: Vec<SourceDefinition>,
}

impl ParameterSpec {
    pub fn new(
        parameter: ParameterAttributes,
        start_date_field: impl Into<String>,
        events: Vec<SourceDefinition>,
        censors: Vec<SourceDefinition>,
    ) -> Self {
        Self {
            parameter,
            start_date_field: start_date_field.into(),
            events,
            censors,
        }
    }

    /// Event sources followed by censoring sources, the collection order.
    pub fn sources(&self) -> Vec<SourceDefinition> {
        self.events
            .iter()
            .chain(self.censors.iter())
            .cloned()
            .collect()
    }
}

/// Input tables addressable by name from source definitions.
#[derive(Debug, Default, Clone)]
pub struct SourceTables<'a> {
    tables: HashMap<&'a str, &'a Table>,
}

impl<'a> SourceTables<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its own name, replacing any previous one.
    pub fn insert(&mut self, table: &'a Table) {
        self.tables.insert(table.name(), table);
    }

    #[must_use]
    pub fn with(mut self, table: &'a Table) -> Self {
        self.insert(table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&'a Table> {
        self.tables.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl<'a> FromIterator<&'a Table> for SourceTables<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Table>>(iter: I) -> Self {
        let mut tables = Self::new();
        for table in iter {
            tables.insert(table);
        }
        tables
    }
}

/// Derive one record per subject for one parameter.
///
/// Records come out in subject-table order. All structural checks (tables
/// supplied, identifier/date columns present) run before any subject is
/// evaluated.
pub fn derive_param_tte(
    subject_table: &Table,
    spec: &ParameterSpec,
    tables: &SourceTables<'_>,
    options: &DeriveOptions,
) -> Result<Vec<DerivedRecord>> {
    let span = debug_span!("derive_param_tte", paramcd = %spec.parameter.paramcd);
    let _guard = span.enter();

    let study_col = subject_table.require_column(columns::STUDYID)?;
    let subject_col = subject_table.require_column(columns::USUBJID)?;
    let start_col = subject_table.require_column(&spec.start_date_field)?;

    let sources = spec.sources();
    let indexed = IndexedTables::build(&tables.tables, sources.iter(), columns::USUBJID)?;

    let derive_row = |row: RowView<'_>| -> Result<Option<DerivedRecord>> {
        let values = row.values();
        let subject = &values[subject_col];
        if subject.is_missing() {
            return Ok(None);
        }
        let start_date = match &values[start_col] {
            value @ (Value::Date(_) | Value::Missing) => value.clone(),
            other => {
                return Err(TteError::MalformedInput(format!(
                    "start date column {} in table {} holds a {} value, expected a date",
                    spec.start_date_field,
                    subject_table.name(),
                    other.kind_name()
                )));
            }
        };
        let candidates = collect_candidates(subject, &sources, &indexed)?;
        let Some(chosen) = select_earliest(candidates) else {
            return Ok(None);
        };
        let attributes = chosen.attributes;
        Ok(Some(DerivedRecord {
            study_id: values[study_col].clone(),
            subject_id: subject.clone(),
            paramcd: spec.parameter.paramcd.clone(),
            param: spec.parameter.param.clone(),
            start_date,
            date: chosen.date,
            kind: chosen.kind,
            event_description: attributes.event_description().to_string(),
            censor_description: attributes.censor_description().map(str::to_string),
            source_domain: attributes.source_domain().to_string(),
            source_variable: attributes.source_variable().to_string(),
            source_seq: chosen.source_seq,
        }))
    };

    let slots: Vec<Option<DerivedRecord>> = if options.parallel {
        (0..subject_table.height())
            .into_par_iter()
            .map(|position| match subject_table.row(position) {
                Some(row) => derive_row(row),
                None => Ok(None),
            })
            .collect::<Result<_>>()?
    } else {
        subject_table
            .rows()
            .map(derive_row)
            .collect::<Result<_>>()?
    };

    let records: Vec<DerivedRecord> = slots.into_iter().flatten().collect();
    let events = records.iter().filter(|record| record.kind.is_event()).count();
    debug!(
        subjects = subject_table.height(),
        records = records.len(),
        events,
        censored = records.len() - events,
        dropped = subject_table.height() - records.len(),
        "parameter derived"
    );
    Ok(records)
}

/// Derive several parameters and stack the results in the given order.
pub fn derive_parameters(
    subject_table: &Table,
    specs: &[ParameterSpec],
    tables: &SourceTables<'_>,
    options: &DeriveOptions,
) -> Result<Vec<DerivedRecord>> {
    let mut stacked = Vec::new();
    for spec in specs {
        stacked.extend(derive_param_tte(subject_table, spec, tables, options)?);
    }
    Ok(stacked)
}

//! End-to-end ADTTE assembly.
//!
//! Stages, in order:
//!
//! 1. derive every parameter and stack the records ([`derive_parameters`])
//! 2. lay the records out as a table
//! 3. `AVAL` from `STARTDT` to `ADT` ([`derive_duration`])
//! 4. `ASEQ` within `STUDYID`/`USUBJID` by `PARAMCD` ([`derive_sequence`])
//! 5. left join of the subject-level table ([`merge_subject_attributes`])

use std::collections::BTreeMap;

use tracing::info;

use adam_model::{DerivedRecord, Result, Table, columns, records_to_table};

use crate::derive::{DeriveOptions, ParameterSpec, SourceTables, derive_parameters};
use crate::duration::derive_duration;
use crate::merge::merge_subject_attributes;
use crate::sequence::derive_sequence;

/// Name given to the assembled dataset.
pub const ADTTE: &str = "ADTTE";

/// Record counts for one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSummary {
    pub paramcd: String,
    pub param: String,
    pub records: usize,
    pub events: usize,
    pub censored: usize,
}

/// The assembled dataset and its per-parameter counts.
#[derive(Debug, Clone)]
pub struct AdtteResult {
    pub table: Table,
    pub summaries: Vec<ParameterSummary>,
}

/// Count records per parameter, in the order parameters were requested.
pub fn summarize(specs: &[ParameterSpec], records: &[DerivedRecord]) -> Vec<ParameterSummary> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.paramcd.as_str()).or_default();
        entry.0 += 1;
        if record.kind.is_event() {
            entry.1 += 1;
        }
    }
    specs
        .iter()
        .map(|spec| {
            let (records, events) = counts
                .get(spec.parameter.paramcd.as_str())
                .copied()
                .unwrap_or_default();
            ParameterSummary {
                paramcd: spec.parameter.paramcd.clone(),
                param: spec.parameter.param.clone(),
                records,
                events,
                censored: records - events,
            }
        })
        .collect()
}

/// Run every stage and return the merged ADTTE table.
pub fn build_adtte(
    subject_table: &Table,
    specs: &[ParameterSpec],
    tables: &SourceTables<'_>,
    options: &DeriveOptions,
) -> Result<AdtteResult> {
    let records = derive_parameters(subject_table, specs, tables, options)?;
    let summaries = summarize(specs, &records);
    info!(
        parameters = specs.len(),
        records = records.len(),
        "parameters derived"
    );

    let mut table = records_to_table(ADTTE, records)?;
    derive_duration(&mut table, columns::STARTDT, columns::ADT)?;
    derive_sequence(
        &mut table,
        &[columns::STUDYID, columns::USUBJID],
        &[columns::PARAMCD],
    )?;
    let table = merge_subject_attributes(
        &table,
        subject_table,
        &[columns::STUDYID, columns::USUBJID],
    )?;
    info!(
        records = table.height(),
        columns = table.columns().len(),
        "ADTTE assembled"
    );
    Ok(AdtteResult { table, summaries })
}

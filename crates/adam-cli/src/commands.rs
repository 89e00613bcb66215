use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, trace};

use adam_cli::config::StudyConfig;
use adam_cli::logging::{redact_error, redact_value};
use adam_ingest::read_csv_table;
use adam_model::{Table, columns};
use adam_output::write_csv_output;
use adam_tte::{DeriveOptions, SourceTables, build_adtte};

use crate::cli::{CheckArgs, DeriveArgs};
use crate::summary::print_check_table;
use crate::types::DeriveResult;

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let config = StudyConfig::load(&args.config)?;
    println!("Study: {}", config.study_label());
    print_check_table(&config);
    Ok(())
}

pub fn run_derive(args: &DeriveArgs) -> Result<DeriveResult> {
    let config = StudyConfig::load(&args.config)?;
    let study_id = config.study_label().to_string();
    let study_span = info_span!("study", study_id = %study_id);
    let _study_guard = study_span.enter();
    let output_dir = args.output_dir.clone().unwrap_or_else(|| {
        args.config
            .parent()
            .map(|dir| dir.join("output"))
            .unwrap_or_else(|| "output".into())
    });

    // Stage 1: ingest
    let ingest_start = Instant::now();
    let tables = info_span!("ingest").in_scope(|| load_tables(&config))?;
    info!(
        tables = tables.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );
    let subject_table = tables
        .get(config.subject_table.name.as_str())
        .context("subject table was not loaded")?;

    // Stage 2: derive
    let derive_start = Instant::now();
    let specs = config.parameter_specs();
    let sources: SourceTables<'_> = tables.values().collect();
    let options = DeriveOptions::default().with_parallel(args.parallel);
    let adtte = info_span!("derive", parameters = specs.len())
        .in_scope(|| build_adtte(subject_table, &specs, &sources, &options))
        .map_err(redact_error)
        .context("derive ADTTE")?;
    info!(
        records = adtte.table.height(),
        duration_ms = derive_start.elapsed().as_millis(),
        "derivation complete"
    );
    trace_records(&adtte.table);

    // Stage 3: output
    let output = if args.dry_run {
        info!("dry run: no output written");
        None
    } else {
        let summary = info_span!("output", dir = %output_dir.display()).in_scope(|| {
            write_csv_output(&output_dir, &adtte.table, args.output_name.as_deref())
        })?;
        Some(summary)
    };

    Ok(DeriveResult {
        study_id,
        output_dir,
        subjects: subject_table.height(),
        records: adtte.table.height(),
        parameters: adtte.summaries,
        output,
    })
}

fn load_tables(config: &StudyConfig) -> Result<BTreeMap<&str, Table>> {
    let mut tables = BTreeMap::new();
    for table in config.all_tables() {
        let loaded = read_csv_table(&table.path, &table.name, &table.schema)
            .with_context(|| format!("load table {}", table.name))?;
        info!(
            table = table.name.as_str(),
            rows = loaded.height(),
            "table loaded"
        );
        tables.insert(table.name.as_str(), loaded);
    }
    Ok(tables)
}

fn trace_records(adtte: &Table) {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return;
    }
    for row in adtte.rows() {
        let cell = |column: &str| row.get(column).map(ToString::to_string).unwrap_or_default();
        let usubjid = cell(columns::USUBJID);
        trace!(
            usubjid = redact_value(&usubjid),
            paramcd = %cell(columns::PARAMCD),
            adt = %cell(columns::ADT),
            cnsr = %cell(columns::CNSR),
            "record derived"
        );
    }
}

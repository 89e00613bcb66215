//! CSV export of derived datasets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use tracing::info;

use adam_common::table_to_dataframe;
use adam_model::Table;

use crate::checksum::compute_file_sha256;
use crate::common::{dataset_file_name, ensure_parent_dir};

/// What was written, for summaries and reproducibility checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    pub records: usize,
    /// Hex SHA-256 of the written file. Identical tables give identical digests.
    pub sha256: String,
}

/// Write `table` as a CSV file with a header row.
///
/// Dates are written as `YYYY-MM-DD`, missing values as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<OutputSummary> {
    let mut df = table_to_dataframe(table)
        .with_context(|| format!("convert {} for export", table.name()))?;
    ensure_parent_dir(path)?;
    {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        CsvWriter::new(&mut writer)
            .include_header(true)
            .finish(&mut df)
            .with_context(|| format!("write {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flush {}", path.display()))?;
    }
    let sha256 = compute_file_sha256(path)?;
    info!(
        dataset = table.name(),
        path = %path.display(),
        records = table.height(),
        "dataset written"
    );
    Ok(OutputSummary {
        path: path.to_path_buf(),
        records: table.height(),
        sha256,
    })
}

/// Write `table` into `output_dir` as `<name>.csv`, defaulting to the
/// lowercase table name.
pub fn write_csv_output(
    output_dir: &Path,
    table: &Table,
    file_name: Option<&str>,
) -> Result<OutputSummary> {
    let name = file_name.map_or_else(|| dataset_file_name(table.name(), "csv"), str::to_string);
    write_csv(table, &output_dir.join(name))
}

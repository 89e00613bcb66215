//! JSON study configuration.
//!
//! A configuration names the subject-level table, the source tables and the
//! parameters to derive. Table paths are resolved against the directory
//! holding the configuration file.
//!
//! ```json
//! {
//!   "study_id": "CDISCPILOT01",
//!   "subject_table": { "name": "ADSL", "path": "adsl.csv", "date_columns": ["TRTSDT", "TRTEDT"] },
//!   "tables": [{ "name": "ADAE", "path": "adae.csv", "date_columns": ["ASTDT"] }],
//!   "parameters": [{
//!     "paramcd": "TTAE", "param": "Time to First Adverse Event", "start_date": "TRTSDT",
//!     "events": [{ "table": "ADAE", "date": "ASTDT", "event_description": "ADVERSE EVENT" }],
//!     "censors": [{ "table": "ADSL", "date": "TRTEDT", "event_description": "END OF TREATMENT" }]
//!   }]
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use adam_ingest::TableSchema;
use adam_model::{
    CensorAttributes, Condition, EventAttributes, ParameterAttributes, SourceDefinition,
};
use adam_tte::ParameterSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub study_id: Option<String>,
    pub subject_table: TableConfig,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
    pub parameters: Vec<ParameterConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Name that source entries refer to, e.g. `ADAE`.
    pub name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub schema: TableSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub paramcd: String,
    pub param: String,
    /// Subject-level start date column.
    pub start_date: String,
    #[serde(default)]
    pub events: Vec<SourceConfig>,
    #[serde(default)]
    pub censors: Vec<SourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub table: String,
    pub date: String,
    #[serde(default)]
    pub filter: Option<Condition>,
    /// Column copied into `SRCSEQ`.
    #[serde(default)]
    pub sequence: Option<String>,
    pub event_description: String,
    /// Defaults to the table name.
    #[serde(default)]
    pub source_domain: Option<String>,
    /// Defaults to the date column.
    #[serde(default)]
    pub source_variable: Option<String>,
    /// Censoring sources only.
    #[serde(default)]
    pub censor_description: Option<String>,
}

impl SourceConfig {
    fn source_domain(&self) -> String {
        self.source_domain.clone().unwrap_or_else(|| self.table.clone())
    }

    fn source_variable(&self) -> String {
        self.source_variable
            .clone()
            .unwrap_or_else(|| self.date.clone())
    }

    fn event_source(&self) -> SourceDefinition {
        let source = SourceDefinition::event(
            &self.table,
            &self.date,
            EventAttributes {
                event_description: self.event_description.clone(),
                source_domain: self.source_domain(),
                source_variable: self.source_variable(),
            },
        );
        self.refine(source)
    }

    fn censor_source(&self) -> SourceDefinition {
        let source = SourceDefinition::censor(
            &self.table,
            &self.date,
            CensorAttributes {
                event_description: self.event_description.clone(),
                source_domain: self.source_domain(),
                source_variable: self.source_variable(),
                censor_description: self.censor_description.clone(),
            },
        );
        self.refine(source)
    }

    fn refine(&self, mut source: SourceDefinition) -> SourceDefinition {
        if let Some(filter) = &self.filter {
            source = source.with_condition(filter.clone());
        }
        if let Some(sequence) = &self.sequence {
            source = source.with_sequence_field(sequence);
        }
        source
    }
}

impl ParameterConfig {
    pub fn to_spec(&self) -> ParameterSpec {
        ParameterSpec::new(
            ParameterAttributes::new(&self.paramcd, &self.param),
            &self.start_date,
            self.events.iter().map(SourceConfig::event_source).collect(),
            self.censors
                .iter()
                .map(SourceConfig::censor_source)
                .collect(),
        )
    }
}

impl StudyConfig {
    /// Parse a configuration from JSON text without resolving paths.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("parse study configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file, resolving table paths
    /// against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let mut config =
            Self::from_json(&text).with_context(|| format!("load {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        debug!(
            path = %path.display(),
            tables = config.tables.len() + 1,
            parameters = config.parameters.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Make relative table paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for table in std::iter::once(&mut self.subject_table).chain(self.tables.iter_mut()) {
            if table.path.is_relative() {
                table.path = base.join(&table.path);
            }
        }
    }

    /// Subject table first, then the source tables in file order.
    pub fn all_tables(&self) -> impl Iterator<Item = &TableConfig> {
        std::iter::once(&self.subject_table).chain(self.tables.iter())
    }

    pub fn study_label(&self) -> &str {
        self.study_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or("STUDY")
    }

    pub fn parameter_specs(&self) -> Vec<ParameterSpec> {
        self.parameters
            .iter()
            .map(ParameterConfig::to_spec)
            .collect()
    }

    fn table(&self, name: &str) -> Option<&TableConfig> {
        self.all_tables().find(|table| table.name == name)
    }

    /// Structural checks that need no data: unique table names and parameter
    /// codes, known source tables, at least one source per parameter, and
    /// every date column declared in its table's `date_columns`.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for table in self.all_tables() {
            if !names.insert(table.name.as_str()) {
                bail!("table {} is declared more than once", table.name);
            }
        }

        let mut codes = BTreeSet::new();
        for parameter in &self.parameters {
            if !codes.insert(parameter.paramcd.as_str()) {
                bail!("parameter {} is declared more than once", parameter.paramcd);
            }
            if parameter.events.is_empty() && parameter.censors.is_empty() {
                bail!("parameter {} has no event or censor sources", parameter.paramcd);
            }
            if !declares_date(&self.subject_table, &parameter.start_date) {
                bail!(
                    "parameter {}: start date {} is not in the date_columns of {}",
                    parameter.paramcd,
                    parameter.start_date,
                    self.subject_table.name
                );
            }
            for source in parameter.events.iter().chain(parameter.censors.iter()) {
                let Some(table) = self.table(&source.table) else {
                    bail!(
                        "parameter {} refers to unknown table {}",
                        parameter.paramcd,
                        source.table
                    );
                };
                if !declares_date(table, &source.date) {
                    bail!(
                        "parameter {}: date {} is not in the date_columns of {}",
                        parameter.paramcd,
                        source.date,
                        table.name
                    );
                }
            }
            if let Some(source) = parameter
                .events
                .iter()
                .find(|source| source.censor_description.is_some())
            {
                bail!(
                    "parameter {}: censor_description on event source {}.{}",
                    parameter.paramcd,
                    source.table,
                    source.date
                );
            }
        }
        Ok(())
    }
}

fn declares_date(table: &TableConfig, column: &str) -> bool {
    table.schema.date_columns.iter().any(|declared| declared == column)
}

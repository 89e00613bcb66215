//! Derived time-to-event records and the ADTTE column layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::source::SourceKind;
use crate::table::Table;
use crate::value::Value;

/// ADTTE variable names.
pub mod columns {
    pub const STUDYID: &str = "STUDYID";
    pub const USUBJID: &str = "USUBJID";
    pub const PARAMCD: &str = "PARAMCD";
    pub const PARAM: &str = "PARAM";
    pub const STARTDT: &str = "STARTDT";
    pub const ADT: &str = "ADT";
    pub const CNSR: &str = "CNSR";
    pub const EVNTDESC: &str = "EVNTDESC";
    pub const CNSDTDSC: &str = "CNSDTDSC";
    pub const SRCDOM: &str = "SRCDOM";
    pub const SRCVAR: &str = "SRCVAR";
    pub const SRCSEQ: &str = "SRCSEQ";
    pub const AVAL: &str = "AVAL";
    pub const AVALU: &str = "AVALU";
    pub const ASEQ: &str = "ASEQ";
}

/// Column order of a freshly derived record table.
pub const RECORD_COLUMNS: [&str; 12] = [
    columns::STUDYID,
    columns::USUBJID,
    columns::PARAMCD,
    columns::PARAM,
    columns::STARTDT,
    columns::ADT,
    columns::CNSR,
    columns::EVNTDESC,
    columns::CNSDTDSC,
    columns::SRCDOM,
    columns::SRCVAR,
    columns::SRCSEQ,
];

/// Identity of one analysis parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterAttributes {
    /// Short code, e.g. "OS".
    pub paramcd: String,
    /// Label, e.g. "Overall Survival".
    pub param: String,
}

impl ParameterAttributes {
    pub fn new(paramcd: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            paramcd: paramcd.into(),
            param: param.into(),
        }
    }
}

/// One subject's outcome for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub study_id: Value,
    pub subject_id: Value,
    pub paramcd: String,
    pub param: String,
    /// Read from the subject-level start date column; may be missing.
    pub start_date: Value,
    /// The earliest qualifying candidate date.
    pub date: NaiveDate,
    pub kind: SourceKind,
    pub event_description: String,
    pub censor_description: Option<String>,
    pub source_domain: String,
    pub source_variable: String,
    pub source_seq: Option<i64>,
}

impl DerivedRecord {
    pub fn censor_flag(&self) -> i64 {
        self.kind.censor_flag()
    }

    fn into_row(self) -> Vec<Value> {
        let censor_flag = self.censor_flag();
        vec![
            self.study_id,
            self.subject_id,
            Value::Text(self.paramcd),
            Value::Text(self.param),
            self.start_date,
            Value::Date(self.date),
            Value::Integer(censor_flag),
            Value::text(self.event_description),
            Value::from(self.censor_description),
            Value::text(self.source_domain),
            Value::text(self.source_variable),
            Value::from(self.source_seq),
        ]
    }
}

/// Lay records out as a table with [`RECORD_COLUMNS`], preserving order.
pub fn records_to_table(name: &str, records: Vec<DerivedRecord>) -> Result<Table> {
    let mut table = Table::new(name, RECORD_COLUMNS.iter().map(|c| (*c).to_string()).collect())?;
    for record in records {
        table.push_row(record.into_row())?;
    }
    Ok(table)
}

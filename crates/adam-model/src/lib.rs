//! Data model for ADaM time-to-event (ADTTE) derivations.
//!
//! - [`value`]: typed cells ([`Value`])
//! - [`table`]: in-memory tables with named columns ([`Table`], [`RowView`])
//! - [`condition`]: row filters ([`Condition`], [`RowPredicate`])
//! - [`source`]: event and censoring source declarations ([`SourceDefinition`])
//! - [`record`]: derived records and the ADTTE column layout ([`DerivedRecord`])
//! - [`error`]: the fatal error taxonomy ([`TteError`])

pub mod condition;
pub mod error;
pub mod record;
pub mod source;
pub mod table;
pub mod value;

pub use condition::{Condition, Literal, PredicateFn, RowPredicate};
pub use error::{Result, TteError};
pub use record::{DerivedRecord, ParameterAttributes, RECORD_COLUMNS, columns, records_to_table};
pub use source::{
    CensorAttributes, EventAttributes, SourceAttributes, SourceDefinition, SourceKind,
};
pub use table::{RowView, Table};
pub use value::Value;

//! Loading of subject-level and source tables for ADTTE derivation.

pub mod csv;
pub mod datetime;

pub use csv::{TableSchema, apply_schema, read_csv_frame, read_csv_table};
pub use datetime::{DatePrecision, parse_date, parse_date_precision};

//! Output generation for derived ADaM datasets.
//!
//! - **CSV**: one file per dataset, header row, ISO 8601 dates
//! - **SHA-256**: digest of every written file

mod checksum;
mod common;
mod csv;

pub use checksum::compute_file_sha256;
pub use common::dataset_file_name;
pub use csv::{OutputSummary, write_csv, write_csv_output};

//! Shared utilities for ADaM crates.
//!
//! This crate provides the bridge between Polars DataFrames, used at the
//! ingest and export boundaries, and the typed [`adam_model::Table`] the
//! derivations operate on.

pub mod polars;

pub use crate::polars::{
    any_to_string, any_to_value, dataframe_to_table, format_numeric, table_to_dataframe,
};

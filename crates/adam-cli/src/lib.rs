//! Library components of the `adtte` command-line tool.

pub mod config;
pub mod logging;

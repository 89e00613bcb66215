use thiserror::Error;

/// Fatal errors raised by a derivation call.
///
/// None of these is retried: the derivation is pure, so the same input
/// always produces the same failure.
#[derive(Debug, Error)]
pub enum TteError {
    /// A required table or column is absent, or a column holds the wrong kind of value.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A source filter failed while evaluating a row.
    #[error("filter on table {table} failed for subject {subject}: {message}")]
    FilterEvaluation {
        table: String,
        subject: String,
        message: String,
    },

    /// The right-hand table of a merge holds the same key more than once.
    #[error("ambiguous join: key {key} appears {count} times in {table}")]
    AmbiguousJoin {
        table: String,
        key: String,
        count: usize,
    },
}

impl TteError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        Self::MalformedInput(format!("column {column} not found in table {table}"))
    }

    pub fn missing_table(table: &str) -> Self {
        Self::MalformedInput(format!("table {table} was not supplied"))
    }
}

pub type Result<T> = std::result::Result<T, TteError>;

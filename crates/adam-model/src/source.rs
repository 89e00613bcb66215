//! Candidate source definitions.
//!
//! A [`SourceDefinition`] declares where event or censoring dates come from:
//! one table, an optional row filter, the date column, and the descriptive
//! attributes stamped onto any record the source wins.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, PredicateFn, RowPredicate};
use crate::table::RowView;

/// Whether a source produces events or censoring observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Event,
    Censor,
}

impl SourceKind {
    /// Value of the `CNSR` output column: 0 for events, 1 for censoring.
    pub fn censor_flag(self) -> i64 {
        match self {
            Self::Event => 0,
            Self::Censor => 1,
        }
    }

    pub fn is_event(self) -> bool {
        self == Self::Event
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => f.write_str("event"),
            Self::Censor => f.write_str("censor"),
        }
    }
}

/// Attributes stamped on records produced by an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAttributes {
    /// `EVNTDESC`, e.g. "DEATH" or "DISEASE PROGRESSION".
    pub event_description: String,
    /// `SRCDOM`, the domain the date was read from.
    pub source_domain: String,
    /// `SRCVAR`, the variable the date was read from.
    pub source_variable: String,
}

/// Attributes stamped on records produced by a censoring source.
///
/// `event_description` describes why the subject was censored and lands in
/// the same `EVNTDESC` column as event descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensorAttributes {
    pub event_description: String,
    pub source_domain: String,
    pub source_variable: String,
    /// `CNSDTDSC`, the censoring date description.
    #[serde(default)]
    pub censor_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAttributes {
    Event(EventAttributes),
    Censor(CensorAttributes),
}

impl SourceAttributes {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Event(_) => SourceKind::Event,
            Self::Censor(_) => SourceKind::Censor,
        }
    }

    pub fn event_description(&self) -> &str {
        match self {
            Self::Event(attrs) => &attrs.event_description,
            Self::Censor(attrs) => &attrs.event_description,
        }
    }

    pub fn source_domain(&self) -> &str {
        match self {
            Self::Event(attrs) => &attrs.source_domain,
            Self::Censor(attrs) => &attrs.source_domain,
        }
    }

    pub fn source_variable(&self) -> &str {
        match self {
            Self::Event(attrs) => &attrs.source_variable,
            Self::Censor(attrs) => &attrs.source_variable,
        }
    }

    /// Always `None` for event sources.
    pub fn censor_description(&self) -> Option<&str> {
        match self {
            Self::Event(_) => None,
            Self::Censor(attrs) => attrs.censor_description.as_deref(),
        }
    }
}

/// Immutable declaration of one event or censoring source.
#[derive(Clone)]
pub struct SourceDefinition {
    source_table: String,
    date_field: String,
    sequence_field: Option<String>,
    predicate: Option<Arc<dyn RowPredicate>>,
    attributes: SourceAttributes,
}

impl SourceDefinition {
    pub fn event(
        source_table: impl Into<String>,
        date_field: impl Into<String>,
        attributes: EventAttributes,
    ) -> Self {
        Self::new(source_table, date_field, SourceAttributes::Event(attributes))
    }

    pub fn censor(
        source_table: impl Into<String>,
        date_field: impl Into<String>,
        attributes: CensorAttributes,
    ) -> Self {
        Self::new(source_table, date_field, SourceAttributes::Censor(attributes))
    }

    fn new(
        source_table: impl Into<String>,
        date_field: impl Into<String>,
        attributes: SourceAttributes,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            date_field: date_field.into(),
            sequence_field: None,
            predicate: None,
            attributes,
        }
    }

    /// Restrict the source to rows matching a condition.
    #[must_use]
    pub fn with_condition(self, condition: Condition) -> Self {
        self.with_row_predicate(Arc::new(condition))
    }

    /// Restrict the source to rows accepted by a closure.
    #[must_use]
    pub fn with_predicate<F>(self, predicate: F) -> Self
    where
        F: Fn(&RowView<'_>) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.with_row_predicate(Arc::new(PredicateFn(predicate)))
    }

    #[must_use]
    pub fn with_row_predicate(mut self, predicate: Arc<dyn RowPredicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Copy this column's integer value into `SRCSEQ`.
    #[must_use]
    pub fn with_sequence_field(mut self, field: impl Into<String>) -> Self {
        self.sequence_field = Some(field.into());
        self
    }

    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    pub fn date_field(&self) -> &str {
        &self.date_field
    }

    pub fn sequence_field(&self) -> Option<&str> {
        self.sequence_field.as_deref()
    }

    pub fn predicate(&self) -> Option<&dyn RowPredicate> {
        self.predicate.as_deref()
    }

    pub fn attributes(&self) -> &SourceAttributes {
        &self.attributes
    }

    pub fn kind(&self) -> SourceKind {
        self.attributes.kind()
    }

    /// Apply the filter to a row; rows always qualify when no filter is set.
    pub fn accepts(&self, row: &RowView<'_>) -> Result<bool, String> {
        match &self.predicate {
            Some(predicate) => predicate.evaluate(row),
            None => Ok(true),
        }
    }
}

impl fmt::Debug for SourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDefinition")
            .field("kind", &self.kind())
            .field("source_table", &self.source_table)
            .field("date_field", &self.date_field)
            .field("sequence_field", &self.sequence_field)
            .field(
                "predicate",
                &self.predicate.as_ref().map(|predicate| predicate.describe()),
            )
            .field("attributes", &self.attributes)
            .finish()
    }
}

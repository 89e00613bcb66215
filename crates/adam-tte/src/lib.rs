//! ADaM time-to-event derivation.
//!
//! For each analysis parameter (OS, PFS, ...) every subject gets at most one
//! record: the earliest qualifying date across the parameter's event and
//! censoring sources. The stages are exposed separately so callers can run
//! only the pieces they need:
//!
//! - [`index`]: subject lookup over source tables
//! - [`collect`]: qualifying dated rows for one subject
//! - [`select`]: earliest-candidate selection
//! - [`derive`]: per-parameter derivation over a subject-level table
//! - [`duration`]: `AVAL`/`AVALU`
//! - [`sequence`]: `ASEQ`
//! - [`merge`]: subject-level attribute join
//! - [`pipeline`]: all of the above, in order

pub mod collect;
pub mod derive;
pub mod duration;
pub mod group;
pub mod index;
pub mod merge;
pub mod pipeline;
pub mod select;
pub mod sequence;

pub use collect::{Candidate, IndexedTables, collect_candidates};
pub use derive::{DeriveOptions, ParameterSpec, SourceTables, derive_param_tte, derive_parameters};
pub use duration::{DURATION_UNIT, days_between, derive_duration};
pub use index::SubjectIndex;
pub use merge::merge_subject_attributes;
pub use pipeline::{ADTTE, AdtteResult, ParameterSummary, build_adtte, summarize};
pub use select::select_earliest;
pub use sequence::derive_sequence;

use std::path::PathBuf;

use adam_output::OutputSummary;
use adam_tte::ParameterSummary;

#[derive(Debug)]
pub struct DeriveResult {
    pub study_id: String,
    pub output_dir: PathBuf,
    pub subjects: usize,
    pub records: usize,
    pub parameters: Vec<ParameterSummary>,
    /// `None` on a dry run.
    pub output: Option<OutputSummary>,
}

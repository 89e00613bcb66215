//! Shared filesystem helpers for output writers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Ensure the parent directory of a path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

/// File name for a dataset: lowercase name plus extension.
pub fn dataset_file_name(dataset: &str, extension: &str) -> String {
    format!("{}.{extension}", dataset.trim().to_lowercase())
}

//! Formatting files on disk with a shared step.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use stylist_step::{FormatError, FormatterStep};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite files whose formatting differs.
    Write,
    /// Only report files whose formatting differs.
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Formatted,
    WouldFormat,
}

impl FileOutcome {
    #[must_use]
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to read '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to format '{}'", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<FileOutcome, FileError>,
}

/// Formats a single file with `step`.
///
/// # Errors
///
/// * If the file cannot be read or written
/// * If the step fails to initialize or rejects the content
pub fn format_file(step: &FormatterStep, path: &Path, mode: Mode) -> Result<FileOutcome, FileError> {
    let original = fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let formatted = step.format(&original).map_err(|source| FileError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    if formatted == original {
        log::trace!("{} is already formatted", path.display());
        return Ok(FileOutcome::Unchanged);
    }

    match mode {
        Mode::Check => Ok(FileOutcome::WouldFormat),
        Mode::Write => {
            fs::write(path, formatted).map_err(|source| FileError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!("Formatted {}", path.display());
            Ok(FileOutcome::Formatted)
        }
    }
}

/// Formats `paths` in parallel, all sharing `step`. Reports come back in the
/// order of `paths`.
#[must_use]
pub fn format_files(step: &FormatterStep, paths: &[PathBuf], mode: Mode) -> Vec<FileReport> {
    log::debug!(
        "Running {} on {} file(s) ({mode:?})",
        step.name(),
        paths.len()
    );

    paths
        .par_iter()
        .map(|path| FileReport {
            path: path.clone(),
            outcome: format_file(step, path, mode),
        })
        .collect()
}

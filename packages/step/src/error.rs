use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{ArtifactCoordinate, DelegateError};

/// Failure to build or initialize a formatter step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Missing required argument '{0}'")]
    MissingArgument(&'static str),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error("Failed to load formatter: {0}")]
    Load(#[source] DelegateError),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Failure of a single `format` call.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The step could not be initialized. The same cause is reported on every
    /// call; initialization is never retried.
    #[error(transparent)]
    Initialization(Arc<StepError>),
    /// The wrapped engine failed. This is the engine's own error.
    #[error(transparent)]
    Delegate(DelegateError),
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Invalid artifact coordinate '{0}', expected 'group:artifact:version[:classifier]'")]
    InvalidCoordinate(String),
    #[error(
        "Could not provision artifact '{coordinate}': nothing at '{}'. Install it into the local repository (for example with `mvn dependency:get -Dartifact={}`) or configure a repository that contains it.",
        .path.display(),
        .coordinate.maven_artifact()
    )]
    NotFound {
        coordinate: ArtifactCoordinate,
        path: PathBuf,
    },
    #[error("No local artifact repository could be determined: set M2_REPO or configure an explicit repository path")]
    NoRepository,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Resolution of the `npm` executable and `.npmrc` configuration.
//!
//! ```rust,no_run
//! use stylist_npm::NpmPathResolver;
//!
//! let resolver = NpmPathResolver::new(None, None, vec![".npmrc".into()]);
//!
//! let npm = resolver.resolve_npm_executable()?;
//! let npmrc = resolver.resolve_npmrc_content()?;
//! # Ok::<(), stylist_npm::NpmError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use stylist_env::{EnvProvider, standard::StandardEnv};
use thiserror::Error;

mod executable;
mod npmrc;

pub use executable::{NPM_ENV_VAR, NpmExecutableResolver};
pub use npmrc::NpmrcResolver;

#[derive(Debug, Error)]
pub enum NpmError {
    #[error(
        "Can't automatically determine npm executable and none was specifically supplied!\n\n{explanation}"
    )]
    ExecutableNotFound { explanation: String },
    #[error("Failed to read npmrc file '{}'", .path.display())]
    ReadNpmrc {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolves the npm executable and `.npmrc` content for one configuration.
///
/// Explicit values are returned as given. Missing ones are discovered on
/// every call; nothing is cached.
#[derive(Clone)]
pub struct NpmPathResolver {
    explicit_npm_executable: Option<PathBuf>,
    explicit_npmrc_file: Option<PathBuf>,
    additional_npmrc_locations: Vec<PathBuf>,
    env: Arc<dyn EnvProvider>,
}

impl std::fmt::Debug for NpmPathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpmPathResolver")
            .field("explicit_npm_executable", &self.explicit_npm_executable)
            .field("explicit_npmrc_file", &self.explicit_npmrc_file)
            .field("additional_npmrc_locations", &self.additional_npmrc_locations)
            .finish_non_exhaustive()
    }
}

impl NpmPathResolver {
    #[must_use]
    pub fn new(
        explicit_npm_executable: Option<PathBuf>,
        explicit_npmrc_file: Option<PathBuf>,
        additional_npmrc_locations: Vec<PathBuf>,
    ) -> Self {
        Self {
            explicit_npm_executable,
            explicit_npmrc_file,
            additional_npmrc_locations,
            env: Arc::new(StandardEnv::new()),
        }
    }

    /// Discovers through `env` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, env: Arc<dyn EnvProvider>) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn additional_npmrc_locations(&self) -> &[PathBuf] {
        &self.additional_npmrc_locations
    }

    /// Returns the explicit executable unmodified, else the first one found by
    /// [`NpmExecutableResolver::try_find`].
    ///
    /// # Errors
    ///
    /// * [`NpmError::ExecutableNotFound`] if there is no explicit executable and none could be found
    pub fn resolve_npm_executable(&self) -> Result<PathBuf, NpmError> {
        if let Some(npm) = &self.explicit_npm_executable {
            log::debug!("Using explicit npm executable {}", npm.display());
            return Ok(npm.clone());
        }

        NpmExecutableResolver::with_env(Arc::clone(&self.env))
            .try_find()
            .ok_or_else(|| NpmError::ExecutableNotFound {
                explanation: NpmExecutableResolver::explain_message(),
            })
    }

    /// The `.npmrc` file that [`Self::resolve_npmrc_content`] reads, if any.
    #[must_use]
    pub fn resolve_npmrc_file(&self) -> Option<PathBuf> {
        self.explicit_npmrc_file.clone().or_else(|| {
            NpmrcResolver::new(self.additional_npmrc_locations.clone()).try_find()
        })
    }

    /// Content of the explicit `.npmrc`, else of the first existing additional
    /// location, else `None`.
    ///
    /// # Errors
    ///
    /// * [`NpmError::ReadNpmrc`] if the selected file cannot be read as UTF-8
    pub fn resolve_npmrc_content(&self) -> Result<Option<String>, NpmError> {
        self.resolve_npmrc_file()
            .map(|path| read_utf8(&path))
            .transpose()
    }
}

fn read_utf8(path: &Path) -> Result<String, NpmError> {
    log::trace!("Reading npmrc from {}", path.display());

    fs::read_to_string(path).map_err(|source| NpmError::ReadNpmrc {
        path: path.to_path_buf(),
        source,
    })
}

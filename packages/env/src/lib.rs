#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Environment variable access behind a swappable provider.
//!
//! Executable discovery reads `PATH`, `NVM_BIN`, `HOME` and friends. Going
//! through [`EnvProvider`] instead of `std::env` directly lets callers (and
//! tests) hand in a controlled environment.

use std::collections::BTreeMap;

use thiserror::Error;

#[cfg(feature = "simulator")]
pub mod simulator;
#[cfg(feature = "std")]
pub mod standard;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Environment variable '{0}' not found")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, EnvError>;

/// Source of environment variables.
pub trait EnvProvider: Send + Sync {
    /// Get an environment variable as a string
    ///
    /// # Errors
    ///
    /// * If the environment variable is not found
    fn var(&self, name: &str) -> Result<String>;

    /// Get all environment variables
    fn vars(&self) -> BTreeMap<String, String>;

    /// Get an environment variable with a default value
    fn var_or(&self, name: &str, default: &str) -> String {
        self.var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get a non-empty environment variable, treating blank values as unset
    fn var_non_empty(&self, name: &str) -> Option<String> {
        self.var(name).ok().filter(|value| !value.trim().is_empty())
    }

    /// Check if an environment variable exists
    fn var_exists(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }
}

impl<T: EnvProvider + ?Sized> EnvProvider for std::sync::Arc<T> {
    fn var(&self, name: &str) -> Result<String> {
        (**self).var(name)
    }

    fn vars(&self) -> BTreeMap<String, String> {
        (**self).vars()
    }
}

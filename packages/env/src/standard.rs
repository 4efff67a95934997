use std::collections::BTreeMap;

use crate::{EnvError, EnvProvider, Result};

/// Environment provider backed by the process environment
#[derive(Debug, Clone, Copy)]
pub struct StandardEnv;

impl StandardEnv {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for StandardEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvProvider for StandardEnv {
    /// # Errors
    ///
    /// * If the environment variable is not found or is not valid unicode
    fn var(&self, name: &str) -> Result<String> {
        std::env::var(name).map_err(|_| EnvError::NotFound(name.to_string()))
    }

    fn vars(&self) -> BTreeMap<String, String> {
        std::env::vars().collect()
    }
}

//! In-memory environment for tests.
//!
//! A [`SimulatorEnv`] owns its own variable map, so discovery logic can be
//! exercised against a fixed `PATH` or `NVM_BIN` without touching the real
//! process environment.
//!
//! ```rust
//! use stylist_env::{EnvProvider, simulator::SimulatorEnv};
//!
//! let env = SimulatorEnv::empty();
//! env.set_var("NVM_BIN", "/opt/nvm/bin");
//!
//! assert_eq!(env.var("NVM_BIN").unwrap(), "/opt/nvm/bin");
//! assert!(!env.var_exists("PATH"));
//! ```

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{EnvError, EnvProvider, Result};

#[derive(Debug, Default)]
pub struct SimulatorEnv {
    vars: RwLock<BTreeMap<String, String>>,
}

impl SimulatorEnv {
    /// Creates a simulator with no variables at all
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a simulator seeded with a copy of the process environment
    #[must_use]
    pub fn from_system() -> Self {
        let vars: BTreeMap<String, String> = std::env::vars().collect();
        log::debug!("Seeded simulator environment with {} variables", vars.len());

        Self {
            vars: RwLock::new(vars),
        }
    }

    /// Creates a simulator from explicit key/value pairs
    #[must_use]
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(
                vars.into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    /// # Panics
    ///
    /// * If the internal `RwLock` is poisoned
    pub fn set_var(&self, name: &str, value: &str) {
        self.vars
            .write()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    /// # Panics
    ///
    /// * If the internal `RwLock` is poisoned
    pub fn remove_var(&self, name: &str) {
        self.vars.write().unwrap().remove(name);
    }

    /// # Panics
    ///
    /// * If the internal `RwLock` is poisoned
    pub fn clear(&self) {
        self.vars.write().unwrap().clear();
    }
}

impl EnvProvider for SimulatorEnv {
    /// # Errors
    ///
    /// * If the environment variable is not found
    ///
    /// # Panics
    ///
    /// * If the internal `RwLock` is poisoned
    fn var(&self, name: &str) -> Result<String> {
        self.vars
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::NotFound(name.to_string()))
    }

    /// # Panics
    ///
    /// * If the internal `RwLock` is poisoned
    fn vars(&self) -> BTreeMap<String, String> {
        self.vars.read().unwrap().clone()
    }
}

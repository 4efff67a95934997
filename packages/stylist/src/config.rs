//! `stylist.toml` handling.
//!
//! ```toml
//! [ktfmt]
//! version = "0.21"
//! style = "DROPBOX"
//! repository = "/home/me/.m2/repository"
//! java = "/usr/lib/jvm/java-17/bin/java"
//!
//! [npm]
//! executable = "/usr/local/bin/npm"
//! npmrc = ".npmrc"
//! npmrc-locations = ["ci/.npmrc"]
//! ```
//!
//! Every key is optional. Relative paths in a loaded file are resolved
//! against the directory that contains it.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use stylist_ktfmt::{InvalidStyle, Style, default_version};
use thiserror::Error;

pub const FILE_NAME: &str = "stylist.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    InvalidStyle(#[from] InvalidStyle),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub ktfmt: KtfmtConfig,
    pub npm: NpmConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct KtfmtConfig {
    pub version: Option<String>,
    pub style: Option<String>,
    /// Root of the local Maven repository to provision ktfmt from.
    pub repository: Option<PathBuf>,
    pub java: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NpmConfig {
    pub executable: Option<PathBuf>,
    pub npmrc: Option<PathBuf>,
    pub npmrc_locations: Vec<PathBuf>,
}

impl Config {
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the file is not a valid config
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());

        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = source.parse()?;

        if let Some(base) = path.parent() {
            config.rebase(base);
        }

        Ok(config)
    }

    /// Loads `dir/stylist.toml` when it exists, otherwise returns the default
    /// config.
    ///
    /// # Errors
    ///
    /// * If the file exists but cannot be loaded
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(FILE_NAME);

        if path.is_file() {
            Self::load(path)
        } else {
            log::trace!("No {FILE_NAME} in {}", dir.as_ref().display());
            Ok(Self::default())
        }
    }

    fn rebase(&mut self, base: &Path) {
        let single = [
            &mut self.ktfmt.repository,
            &mut self.ktfmt.java,
            &mut self.npm.executable,
            &mut self.npm.npmrc,
        ];

        for path in single
            .into_iter()
            .flatten()
            .chain(self.npm.npmrc_locations.iter_mut())
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        config.ktfmt.style()?;
        Ok(config)
    }
}

impl KtfmtConfig {
    #[must_use]
    pub fn version(&self) -> &str {
        self.version
            .as_deref()
            .filter(|version| !version.trim().is_empty())
            .unwrap_or(default_version())
    }

    /// # Errors
    ///
    /// * [`InvalidStyle`] if the configured style is not a known style
    pub fn style(&self) -> Result<Style, InvalidStyle> {
        self.style.as_deref().map_or(Ok(Style::default()), str::parse)
    }
}

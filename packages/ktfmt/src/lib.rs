#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! [ktfmt](https://github.com/facebook/ktfmt) as a formatter step.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use stylist_ktfmt::{KtfmtStep, Style};
//! use stylist_step::LocalRepositoryProvisioner;
//!
//! let provisioner = Arc::new(LocalRepositoryProvisioner::new("/home/me/.m2/repository"));
//! let step = KtfmtStep::create_with_style("0.21", provisioner, Style::Dropbox)?;
//!
//! let formatted = step.format("val x=1")?;
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod api;
pub mod java;
mod options;
mod step;

pub use api::{KtfmtApi, KtfmtLoader, LookupError};
pub use options::{CodeStyle, FormattingOptions};
pub use step::{KtfmtStep, KtfmtStepBuilder, OptionsSource, ResolvedOptions, resolve_style_options};

const DEFAULT_VERSION: &str = "0.21";

pub const NAME: &str = "ktfmt";
pub const PACKAGE: &str = "com.facebook";
pub const MAVEN_COORDINATE: &str = "com.facebook:ktfmt:";

/// Classifier of the self-contained ktfmt jar, which bundles the Kotlin
/// compiler and the rest of ktfmt's runtime dependencies.
pub const SELF_CONTAINED_CLASSIFIER: &str = "jar-with-dependencies";

/// Name of the entry point on `com.facebook.ktfmt.FormatterKt`.
pub const FORMATTER_METHOD: &str = "format";

#[must_use]
pub const fn default_version() -> &'static str {
    DEFAULT_VERSION
}

#[must_use]
pub fn default_style() -> String {
    Style::Default.to_string()
}

/// Formatting preset.
///
/// See <https://github.com/facebook/ktfmt/blob/v0.21/core/src/main/java/com/facebook/ktfmt/Formatter.kt#L43-L97>.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Style {
    #[default]
    Default,
    Dropbox,
    Google,
    Kotlinlang,
}

impl Style {
    pub const ALL: [Self; 4] = [Self::Default, Self::Dropbox, Self::Google, Self::Kotlinlang];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Dropbox => "DROPBOX",
            Self::Google => "GOOGLE",
            Self::Kotlinlang => "KOTLINLANG",
        }
    }

    /// The format constant and legacy companion method backing this style.
    /// `None` for [`Style::Default`], which needs no options object.
    #[must_use]
    pub const fn accessors(self) -> Option<(Format, StyleMethod)> {
        match self {
            Self::Default => None,
            Self::Dropbox => Some((Format::Dropbox, StyleMethod::Dropbox)),
            Self::Google => Some((Format::Google, StyleMethod::Google)),
            Self::Kotlinlang => Some((Format::Kotlinlang, StyleMethod::Kotlinlang)),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("The style '{0}' is not valid.")]
pub struct InvalidStyle(pub String);

impl FromStr for Style {
    type Err = InvalidStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidStyle(s.to_string()))
    }
}

/// Static `FormattingOptions` constants on `FormatterKt` (ktfmt 0.19+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Dropbox,
    Google,
    Kotlinlang,
}

impl Format {
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Dropbox => "DROPBOX_FORMAT",
            Self::Google => "GOOGLE_FORMAT",
            Self::Kotlinlang => "KOTLINLANG_FORMAT",
        }
    }
}

/// Factory methods on `FormattingOptions.Companion` (before ktfmt 0.19).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleMethod {
    Dropbox,
    Google,
    Kotlinlang,
}

impl StyleMethod {
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Dropbox => "dropboxStyle",
            Self::Google => "googleStyle",
            Self::Kotlinlang => "kotlinlangStyle",
        }
    }
}

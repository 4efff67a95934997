use std::sync::Arc;

use stylist_step::{ArtifactBundle, DelegateError};
use thiserror::Error;

use crate::{Format, FormattingOptions, StyleMethod};

/// Why an accessor could not be read from a loaded ktfmt module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The artifact predates the accessor. Triggers the companion fallback.
    #[error("No field '{0}' on com.facebook.ktfmt.FormatterKt")]
    FieldNotFound(String),
    #[error("No method '{0}' on com.facebook.ktfmt.FormattingOptions$Companion")]
    MethodNotFound(String),
    #[error("Accessor '{name}' exists but could not be read: {reason}")]
    Inaccessible { name: String, reason: String },
}

/// Operations a loaded ktfmt artifact exposes.
///
/// Implementations stand for one isolated, loaded copy of the artifact. Both
/// accessor families are part of the trait because which one works depends
/// on the artifact's version; callers probe [`Self::format_constant`] first.
pub trait KtfmtApi: Send + Sync {
    /// `FormatterKt.format(String)`.
    ///
    /// # Errors
    ///
    /// * If ktfmt rejects the input
    fn format(&self, input: &str) -> Result<String, DelegateError>;

    /// `FormatterKt.format(FormattingOptions, String)`.
    ///
    /// Handles that can't pass an options object may fall back to the
    /// closest preset, see [`FormattingOptions::cli_preset`].
    ///
    /// # Errors
    ///
    /// * If ktfmt rejects the input
    fn format_with_options(
        &self,
        options: &FormattingOptions,
        input: &str,
    ) -> Result<String, DelegateError>;

    /// Reads a static `*_FORMAT` constant (ktfmt 0.19 and later).
    ///
    /// # Errors
    ///
    /// * [`LookupError::FieldNotFound`] if this version has no such constant
    fn format_constant(&self, format: Format) -> Result<FormattingOptions, LookupError>;

    /// Calls a `FormattingOptions.Companion` factory (before ktfmt 0.19).
    ///
    /// # Errors
    ///
    /// * [`LookupError::MethodNotFound`] if this version has no such factory
    fn companion_style(&self, method: StyleMethod) -> Result<FormattingOptions, LookupError>;
}

/// Turns a provisioned artifact into a loaded [`KtfmtApi`].
pub trait KtfmtLoader: Send + Sync {
    /// # Errors
    ///
    /// * If the artifact cannot be loaded
    fn load(&self, bundle: &ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError>;
}

impl<F> KtfmtLoader for F
where
    F: Fn(&ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError> + Send + Sync,
{
    fn load(&self, bundle: &ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError> {
        self(bundle)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Formatter step abstraction.
//!
//! A [`FormatterStep`] is a named formatting function whose expensive setup
//! (fetching an artifact, loading it, probing its API) is deferred until the
//! first file is formatted and then shared by every caller. Adapters describe
//! their configuration with a serializable state value; that serialization is
//! the step's identity, which [`StepCache`] uses to hand out one step per
//! distinct configuration.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use stylist_step::{DelegateError, FormatterFunc, FormatterStep};
//!
//! let step = FormatterStep::create_lazy("trim", "v1", |_state| {
//!     let func: Arc<dyn FormatterFunc> =
//!         Arc::new(|input: &str| -> Result<String, DelegateError> { Ok(input.trim().to_string()) });
//!     Ok(func)
//! })
//! .unwrap();
//!
//! assert_eq!(step.format("  fun main() {}  ").unwrap(), "fun main() {}");
//! ```

mod artifact;
mod cache;
mod error;
mod provisioner;
mod step;

pub use artifact::{ArtifactBundle, ArtifactCoordinate};
pub use cache::StepCache;
pub use error::{FormatError, ProvisionError, StepError};
pub use provisioner::{LocalRepositoryProvisioner, Provisioner};
pub use step::FormatterStep;

/// Error raised by a wrapped formatter engine, passed through untouched.
pub type DelegateError = Box<dyn std::error::Error + Send + Sync>;

/// The callable produced once a step has been initialized.
pub trait FormatterFunc: Send + Sync {
    /// Formats `input`, returning the complete formatted text.
    ///
    /// # Errors
    ///
    /// * If the underlying engine rejects the input
    fn apply(&self, input: &str) -> Result<String, DelegateError>;
}

impl<F> FormatterFunc for F
where
    F: Fn(&str) -> Result<String, DelegateError> + Send + Sync,
{
    fn apply(&self, input: &str) -> Result<String, DelegateError> {
        self(input)
    }
}

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock},
};

use serde::Serialize;

use crate::{FormatError, FormatterFunc, StepError};

type InitFn = dyn Fn() -> Result<Arc<dyn FormatterFunc>, StepError> + Send + Sync;
type Initialized = Result<Arc<dyn FormatterFunc>, Arc<StepError>>;

/// A named formatting function that is built on first use.
///
/// The initializer runs at most once per step. Callers racing on the first
/// `format` block until it finishes and then share its outcome, success or
/// failure. Once initialized, formatting takes no lock.
pub struct FormatterStep {
    name: String,
    key: String,
    init: Box<InitFn>,
    func: OnceLock<Initialized>,
}

impl FormatterStep {
    /// Creates a step whose formatter is produced from `state` by `init` on
    /// the first call to [`Self::format`].
    ///
    /// `state` must only describe the configuration; anything expensive
    /// belongs in `init`. Its JSON form becomes the step's [`Self::key`].
    ///
    /// # Errors
    ///
    /// * If `name` is empty
    /// * If `state` cannot be serialized
    pub fn create_lazy<S, F>(name: impl Into<String>, state: S, init: F) -> Result<Self, StepError>
    where
        S: Serialize + Send + Sync + 'static,
        F: Fn(&S) -> Result<Arc<dyn FormatterFunc>, StepError> + Send + Sync + 'static,
    {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(StepError::MissingArgument("name"));
        }

        let key = serde_json::to_string(&state)?;

        log::trace!("Created lazy formatter step '{name}' with key {key}");

        Ok(Self {
            name,
            key,
            init: Box::new(move || init(&state)),
            func: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialized configuration identifying this step.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether initialization has run, successfully or not.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.func.get().is_some()
    }

    /// Runs initialization now instead of on the first `format`.
    ///
    /// # Errors
    ///
    /// * If initialization fails (now or on an earlier attempt)
    pub fn initialize(&self) -> Result<(), FormatError> {
        self.formatter().map(|_| ())
    }

    /// Formats `input` with this step.
    ///
    /// # Errors
    ///
    /// * [`FormatError::Initialization`] if the step could not be initialized
    /// * [`FormatError::Delegate`] with the engine's own error if formatting fails
    pub fn format(&self, input: &str) -> Result<String, FormatError> {
        let func = self.formatter()?;

        log::trace!("Formatting {} bytes with '{}'", input.len(), self.name);

        func.apply(input).map_err(FormatError::Delegate)
    }

    fn formatter(&self) -> Result<&Arc<dyn FormatterFunc>, FormatError> {
        self.func
            .get_or_init(|| {
                log::debug!("Initializing formatter step '{}'", self.name);

                (self.init)().map_err(|e| {
                    log::debug!("Formatter step '{}' failed to initialize: {e}", self.name);
                    Arc::new(e)
                })
            })
            .as_ref()
            .map_err(|e| FormatError::Initialization(Arc::clone(e)))
    }
}

impl fmt::Debug for FormatterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterStep")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl PartialEq for FormatterStep {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.key == other.key
    }
}

impl Eq for FormatterStep {}

impl Hash for FormatterStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.key.hash(state);
    }
}

use std::{
    collections::BTreeMap,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use crate::FormatterStep;

static GLOBAL: LazyLock<StepCache> = LazyLock::new(StepCache::new);

/// Steps keyed by identity, so equal configurations share one initialization.
#[derive(Debug, Default)]
pub struct StepCache {
    steps: Mutex<BTreeMap<(String, String), Arc<FormatterStep>>>,
}

impl StepCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the cached step with the same identity as `step`, inserting
    /// `step` if there is none. The returned step may already be initialized.
    pub fn get_or_insert(&self, step: FormatterStep) -> Arc<FormatterStep> {
        let mut steps = self.steps.lock().unwrap_or_else(PoisonError::into_inner);
        let identity = (step.name().to_string(), step.key().to_string());

        if let Some(existing) = steps.get(&identity) {
            log::trace!("Reusing cached formatter step '{}'", identity.0);
            return Arc::clone(existing);
        }

        log::debug!("Caching formatter step '{}' ({})", identity.0, identity.1);

        let step = Arc::new(step);
        steps.insert(identity, Arc::clone(&step));
        step
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

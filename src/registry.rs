use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

use crate::error::{PageError, PageResult, read_lock, write_lock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FeatureKey(&'static str);

impl FeatureKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FeatureKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeatureState {
    Active,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Activation {
    Activated,
    AlreadyActive,
}

/// At-most-once activation record for page features.
///
/// A key is recorded before its setup runs and is never cleared, so a setup
/// that fails is not retried on a later activation.
#[derive(Clone, Default)]
pub struct FeatureRegistry {
    entries: Arc<RwLock<BTreeMap<FeatureKey, FeatureState>>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate<F>(&self, key: FeatureKey, setup: F) -> PageResult<Activation>
    where
        F: FnOnce() -> PageResult<()>,
    {
        {
            let mut entries = write_lock::<_, PageError>(&self.entries, "claiming feature")?;
            if entries.contains_key(&key) {
                tracing::trace!(feature = %key, "feature already active");
                return Ok(Activation::AlreadyActive);
            }
            entries.insert(key, FeatureState::Active);
        }

        match setup() {
            Ok(()) => {
                tracing::debug!(feature = %key, "feature activated");
                Ok(Activation::Activated)
            }
            Err(error) => {
                write_lock::<_, PageError>(&self.entries, "recording failed feature")?
                    .insert(key, FeatureState::Failed);
                Err(PageError::FeatureSetup {
                    feature: key,
                    source: Box::new(error),
                })
            }
        }
    }

    pub fn state(&self, key: FeatureKey) -> PageResult<Option<FeatureState>> {
        Ok(read_lock::<_, PageError>(&self.entries, "reading feature state")?
            .get(&key)
            .copied())
    }

    pub fn is_active(&self, key: FeatureKey) -> PageResult<bool> {
        Ok(self.state(key)? == Some(FeatureState::Active))
    }

    pub fn entries(&self) -> PageResult<BTreeMap<FeatureKey, FeatureState>> {
        Ok(read_lock::<_, PageError>(&self.entries, "listing features")?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatePoisoned;
    use std::cell::Cell;

    const MENU: FeatureKey = FeatureKey::new("menu");

    #[test]
    fn setup_runs_once_per_key() {
        let registry = FeatureRegistry::new();
        let runs = Cell::new(0);

        let first = registry
            .activate(MENU, || {
                runs.set(runs.get() + 1);
                Ok(())
            })
            .expect("first activation");
        let second = registry
            .activate(MENU, || {
                runs.set(runs.get() + 1);
                Ok(())
            })
            .expect("second activation");

        assert_eq!(first, Activation::Activated);
        assert_eq!(second, Activation::AlreadyActive);
        assert_eq!(runs.get(), 1);
        assert!(registry.is_active(MENU).expect("state"));
    }

    #[test]
    fn failed_setup_is_reported_and_never_retried() {
        let registry = FeatureRegistry::new();
        let error = registry
            .activate(MENU, || Err(StatePoisoned("wiring menu").into()))
            .expect_err("setup failure must surface");
        assert!(matches!(
            error,
            PageError::FeatureSetup { feature, .. } if feature == MENU
        ));
        assert_eq!(
            registry.state(MENU).expect("state"),
            Some(FeatureState::Failed)
        );

        let retried = Cell::new(false);
        let again = registry
            .activate(MENU, || {
                retried.set(true);
                Ok(())
            })
            .expect("repeat activation");
        assert_eq!(again, Activation::AlreadyActive);
        assert!(!retried.get());
    }

    #[test]
    fn keys_are_independent() {
        let registry = FeatureRegistry::new();
        registry.activate(MENU, || Ok(())).expect("menu");
        let other = registry
            .activate(FeatureKey::new("count-up"), || Ok(()))
            .expect("count-up");
        assert_eq!(other, Activation::Activated);
        assert_eq!(registry.entries().expect("entries").len(), 2);
    }
}

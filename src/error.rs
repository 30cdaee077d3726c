use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::form::FormError;
use crate::registry::FeatureKey;

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("page state lock poisoned while {0}")]
pub struct StatePoisoned(pub &'static str);

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    StatePoisoned(#[from] StatePoisoned),
    #[error("feature `{feature}` failed to set up: {source}")]
    FeatureSetup {
        feature: FeatureKey,
        #[source]
        source: Box<PageError>,
    },
    #[error(transparent)]
    Form(#[from] FormError),
}

pub type PageResult<T> = Result<T, PageError>;

pub(crate) fn read_lock<'a, T, E>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> Result<RwLockReadGuard<'a, T>, E>
where
    E: From<StatePoisoned>,
{
    lock.read().map_err(|_| StatePoisoned(context).into())
}

pub(crate) fn write_lock<'a, T, E>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> Result<RwLockWriteGuard<'a, T>, E>
where
    E: From<StatePoisoned>,
{
    lock.write().map_err(|_| StatePoisoned(context).into())
}

use std::sync::Arc;

use crate::config::PageConfig;
use crate::error::{PageError, PageResult};
use crate::features::{Feature, PageContext};
use crate::feedback::Notifier;
use crate::form::FormController;
use crate::i18n::I18nManager;
use crate::page::Page;
use crate::registry::{Activation, FeatureKey, FeatureRegistry};

/// Registry key guarding [`PageController::init`] itself.
pub const INIT: FeatureKey = FeatureKey::new("init");

type CustomSetup = Arc<dyn Fn(&PageContext) -> PageResult<()> + Send + Sync>;

/// What one [`PageController::init`] call did.
#[derive(Debug, Default)]
pub struct InitReport {
    /// `false` when an earlier call already initialized the page.
    pub initialized: bool,
    pub activated: Vec<FeatureKey>,
    pub already_active: Vec<FeatureKey>,
    pub failed: Vec<PageError>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the page session: its services, its features and their activation record.
pub struct PageController {
    cx: PageContext,
    registry: FeatureRegistry,
    custom: Vec<(FeatureKey, CustomSetup)>,
}

impl PageController {
    pub fn new(page: Arc<dyn Page>, config: PageConfig) -> Self {
        Self {
            cx: PageContext::new(page, config),
            registry: FeatureRegistry::new(),
            custom: Vec::new(),
        }
    }

    /// Adds a site-specific feature, activated by [`PageController::init`] after
    /// the built-in ones.
    pub fn with_feature<F>(mut self, key: FeatureKey, setup: F) -> Self
    where
        F: Fn(&PageContext) -> PageResult<()> + Send + Sync + 'static,
    {
        self.custom.push((key, Arc::new(setup)));
        self
    }

    /// Activates every feature once, in order.
    ///
    /// Features are isolated from each other: a failing one is logged, recorded
    /// in the report and in the registry, and the rest still activate.
    pub fn init(&self) -> PageResult<InitReport> {
        let mut report = InitReport::default();
        let activation = self.registry.activate(INIT, || {
            for feature in Feature::ALL {
                let result = self.activate(feature);
                record(&mut report, feature.key(), result);
            }
            for (key, setup) in &self.custom {
                let result = self.registry.activate(*key, || setup(&self.cx));
                record(&mut report, *key, result);
            }
            Ok(())
        })?;

        report.initialized = activation == Activation::Activated;
        if report.initialized {
            tracing::info!(
                activated = report.activated.len(),
                failed = report.failed.len(),
                "page initialized"
            );
        } else {
            tracing::debug!("page already initialized");
        }
        Ok(report)
    }

    /// Activates one built-in feature outside of [`PageController::init`].
    pub fn activate(&self, feature: Feature) -> PageResult<Activation> {
        self.registry
            .activate(feature.key(), || feature.install(&self.cx))
    }

    pub fn context(&self) -> &PageContext {
        &self.cx
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.cx.page
    }

    pub fn config(&self) -> &PageConfig {
        &self.cx.config
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &Notifier {
        &self.cx.notifier
    }

    pub fn i18n(&self) -> &I18nManager {
        &self.cx.i18n
    }

    pub fn forms(&self) -> PageResult<Vec<FormController>> {
        self.cx.forms()
    }
}

fn record(report: &mut InitReport, key: FeatureKey, result: PageResult<Activation>) {
    match result {
        Ok(Activation::Activated) => report.activated.push(key),
        Ok(Activation::AlreadyActive) => report.already_active.push(key),
        Err(error) => {
            tracing::error!(feature = %key, %error, "feature failed to activate");
            report.failed.push(error);
        }
    }
}

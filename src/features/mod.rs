//! The page's interactive features.
//!
//! Each feature is installed at most once through the
//! [`FeatureRegistry`](crate::registry::FeatureRegistry). A feature whose
//! anchor elements are missing installs nothing and still counts as active.

mod active_menu;
mod cards;
mod count_up;
mod forms;
mod images;
mod menu;
mod privacy;
mod reveal;
mod ripple;
mod scroll_spy;
mod scroll_to_top;
mod smooth_scroll;

use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

use crate::config::PageConfig;
use crate::error::{PageError, PageResult, read_lock, write_lock};
use crate::feedback::Notifier;
use crate::form::FormController;
use crate::i18n::I18nManager;
use crate::page::Page;
use crate::registry::FeatureKey;

pub use count_up::parse_count_target;
pub use menu::MobileMenu;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Feature {
    Menu,
    ScrollEffects,
    MicroInteractions,
    SmoothScroll,
    ScrollSpy,
    ActiveMenu,
    Images,
    FormValidation,
    CountUp,
    ScrollToTop,
    Privacy,
    Cards,
}

impl Feature {
    /// Activation order used by [`PageController::init`](crate::PageController::init).
    pub const ALL: [Feature; 12] = [
        Feature::Menu,
        Feature::ScrollEffects,
        Feature::MicroInteractions,
        Feature::SmoothScroll,
        Feature::ScrollSpy,
        Feature::ActiveMenu,
        Feature::Images,
        Feature::FormValidation,
        Feature::CountUp,
        Feature::ScrollToTop,
        Feature::Privacy,
        Feature::Cards,
    ];

    pub const fn key(self) -> FeatureKey {
        FeatureKey::new(match self {
            Feature::Menu => "menu",
            Feature::ScrollEffects => "scroll_effects",
            Feature::MicroInteractions => "micro_interactions",
            Feature::SmoothScroll => "smooth_scroll",
            Feature::ScrollSpy => "scroll_spy",
            Feature::ActiveMenu => "active_menu",
            Feature::Images => "images",
            Feature::FormValidation => "form_validation",
            Feature::CountUp => "count_up",
            Feature::ScrollToTop => "scroll_to_top",
            Feature::Privacy => "privacy",
            Feature::Cards => "cards",
        })
    }

    /// Binds the feature's listeners. Callers go through the registry so this
    /// runs once per page.
    pub(crate) fn install(self, cx: &PageContext) -> PageResult<()> {
        match self {
            Feature::Menu => menu::install(cx),
            Feature::ScrollEffects => reveal::install(cx),
            Feature::MicroInteractions => ripple::install(cx),
            Feature::SmoothScroll => smooth_scroll::install(cx),
            Feature::ScrollSpy => scroll_spy::install(cx),
            Feature::ActiveMenu => active_menu::install(cx),
            Feature::Images => images::install(cx),
            Feature::FormValidation => forms::install(cx),
            Feature::CountUp => count_up::install(cx),
            Feature::ScrollToTop => scroll_to_top::install(cx),
            Feature::Privacy => privacy::install(cx),
            Feature::Cards => cards::install(cx),
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key().as_str())
    }
}

/// Shared services handed to every feature.
#[derive(Clone)]
pub struct PageContext {
    pub page: Arc<dyn Page>,
    pub config: Arc<PageConfig>,
    pub i18n: I18nManager,
    pub notifier: Notifier,
    forms: Arc<RwLock<Vec<FormController>>>,
}

impl PageContext {
    pub fn new(page: Arc<dyn Page>, config: PageConfig) -> Self {
        let i18n = I18nManager::with_locale(config.locale.clone());
        let notifier = Notifier::new(
            page.clone(),
            config.timings.notification_display,
            config.motion.effective(config.motion.notification),
        );
        Self {
            page,
            config: Arc::new(config),
            i18n,
            notifier,
            forms: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Controllers of the forms wired so far, in document order.
    pub fn forms(&self) -> PageResult<Vec<FormController>> {
        Ok(read_lock::<_, PageError>(&self.forms, "listing forms")?.clone())
    }

    pub(crate) fn register_form(&self, form: FormController) -> PageResult<()> {
        write_lock::<_, PageError>(&self.forms, "registering form")?.push(form);
        Ok(())
    }
}

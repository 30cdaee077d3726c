pub use crate::config::{PageConfig, Timings};
pub use crate::controller::{INIT, InitReport, PageController};
pub use crate::error::{PageError, PageResult, StatePoisoned};
pub use crate::features::{Feature, MobileMenu, PageContext};
pub use crate::feedback::{Notification, NotificationId, Notifier, Severity};
pub use crate::form::{
    FieldRole, FieldScheme, FieldState, FormController, FormError, FormOptions, FormResult,
    FormSnapshot, SubmitOutcome, SubmitState,
};
pub use crate::i18n::{I18nManager, Locale};
pub use crate::motion::{Easing, MotionConfig, MotionLevel, MotionTransition};
pub use crate::page::{
    ElementId, EventKind, EventTarget, MemoryPage, Page, PageEvent, Query, Rect, ScrollBehavior,
};
pub use crate::registry::{Activation, FeatureKey, FeatureRegistry, FeatureState};

use std::time::Duration;

use crate::i18n::Locale;
use crate::motion::{MotionConfig, MotionLevel};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timings {
    pub submit_delay: Duration,
    pub redirect_delay: Duration,
    pub notification_display: Duration,
    pub count_up: Duration,
    pub frame: Duration,
    pub resize_debounce: Duration,
    pub scroll_throttle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            submit_delay: Duration::from_millis(1_500),
            redirect_delay: Duration::from_millis(1_000),
            notification_display: Duration::from_millis(5_000),
            count_up: Duration::from_millis(2_000),
            frame: Duration::from_millis(16),
            resize_debounce: Duration::from_millis(100),
            scroll_throttle: Duration::from_millis(100),
        }
    }
}

impl Timings {
    /// Every delay collapsed to zero; used by headless hosts and tests.
    pub fn instant() -> Self {
        Self {
            submit_delay: Duration::ZERO,
            redirect_delay: Duration::ZERO,
            notification_display: Duration::ZERO,
            count_up: Duration::ZERO,
            frame: Duration::ZERO,
            resize_debounce: Duration::ZERO,
            scroll_throttle: Duration::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub locale: Locale,
    pub timings: Timings,
    pub motion: MotionConfig,
    pub mobile_breakpoint_px: f64,
    pub header_offset_px: f64,
    pub scroll_to_top_threshold_px: f64,
    pub confirmation_page: String,
    pub privacy_page: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            locale: Locale::System,
            timings: Timings::default(),
            motion: MotionConfig::default(),
            mobile_breakpoint_px: 768.0,
            header_offset_px: 80.0,
            scroll_to_top_threshold_px: 300.0,
            confirmation_page: "thank_you.html".to_string(),
            privacy_page: "privacy.html".to_string(),
        }
    }
}

impl PageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instant() -> Self {
        Self::default()
            .timings(Timings::instant())
            .motion(MotionConfig::new().level(MotionLevel::Reduced))
    }

    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn mobile_breakpoint_px(mut self, value: f64) -> Self {
        self.mobile_breakpoint_px = value;
        self
    }

    pub fn header_offset_px(mut self, value: f64) -> Self {
        self.header_offset_px = value;
        self
    }

    pub fn scroll_to_top_threshold_px(mut self, value: f64) -> Self {
        self.scroll_to_top_threshold_px = value;
        self
    }

    pub fn confirmation_page(mut self, value: impl Into<String>) -> Self {
        self.confirmation_page = value.into();
        self
    }

    pub fn privacy_page(mut self, value: impl Into<String>) -> Self {
        self.privacy_page = value.into();
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MotionLevel {
    Full,
    Reduced,
    None,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    pub fn css(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Ease => "ease",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotionTransition {
    pub duration_ms: u16,
    pub offset_px: i16,
    pub easing: Easing,
}

impl Default for MotionTransition {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            offset_px: 0,
            easing: Easing::EaseOut,
        }
    }
}

impl MotionTransition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration_ms(mut self, duration_ms: u16) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn offset_px(mut self, offset_px: i16) -> Self {
        self.offset_px = offset_px;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Renders a CSS `transition` value covering `properties`.
    pub fn css_transition(&self, properties: &[&str]) -> String {
        let timing = format!("{} {}", css_seconds(self.duration_ms), self.easing.css());
        properties
            .iter()
            .map(|property| format!("{property} {timing}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders a CSS `animation` value for a named keyframe set.
    pub fn css_animation(&self, keyframes: &str) -> String {
        format!(
            "{keyframes} {} {}",
            css_seconds(self.duration_ms),
            self.easing.css()
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotionConfig {
    pub level: MotionLevel,
    pub reveal: MotionTransition,
    pub hover: MotionTransition,
    pub notification: MotionTransition,
    pub ripple: MotionTransition,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            level: MotionLevel::Full,
            reveal: MotionTransition::new().duration_ms(800).offset_px(30),
            hover: MotionTransition::new().duration_ms(300),
            notification: MotionTransition::new().duration_ms(300),
            ripple: MotionTransition::new().duration_ms(600),
        }
    }
}

impl MotionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: MotionLevel) -> Self {
        self.level = level;
        self
    }

    pub fn reveal(mut self, reveal: MotionTransition) -> Self {
        self.reveal = reveal;
        self
    }

    pub fn hover(mut self, hover: MotionTransition) -> Self {
        self.hover = hover;
        self
    }

    pub fn notification(mut self, notification: MotionTransition) -> Self {
        self.notification = notification;
        self
    }

    pub fn ripple(mut self, ripple: MotionTransition) -> Self {
        self.ripple = ripple;
        self
    }

    /// Transition actually applied at the configured motion level.
    ///
    /// Reduced motion keeps the end state but collapses the duration.
    pub fn effective(&self, transition: MotionTransition) -> MotionTransition {
        match self.level {
            MotionLevel::Full => transition,
            MotionLevel::Reduced | MotionLevel::None => transition.duration_ms(0),
        }
    }

    pub fn animates(&self) -> bool {
        self.level != MotionLevel::None
    }
}

fn css_seconds(duration_ms: u16) -> String {
    format!("{}s", f64::from(duration_ms) / 1000.0)
}

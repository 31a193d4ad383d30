//! Animation model: reveal types, their initial offsets, and per-element
//! configuration.
//!
//! Lengths are abstract CSS pixels.  Surfaces decide how a pixel maps onto
//! their own grid (the terminal page maps them onto rows and columns).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use super::easing::{Easing, Transition};

// ───────────────────────────────────────── animation type ────

/// How an element enters once it is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationType {
    #[default]
    FadeInUp,
    FadeInDown,
    FadeInLeft,
    FadeInRight,
    ScaleIn,
    SlideInUp,
    SlideInDown,
    SlideInLeft,
    SlideInRight,
}

impl AnimationType {
    pub const ALL: &[AnimationType] = &[
        AnimationType::FadeInUp,
        AnimationType::FadeInDown,
        AnimationType::FadeInLeft,
        AnimationType::FadeInRight,
        AnimationType::ScaleIn,
        AnimationType::SlideInUp,
        AnimationType::SlideInDown,
        AnimationType::SlideInLeft,
        AnimationType::SlideInRight,
    ];

    /// Name used in page files and config (`fadeInUp`, `scaleIn`, ...).
    pub fn name(self) -> &'static str {
        match self {
            AnimationType::FadeInUp => "fadeInUp",
            AnimationType::FadeInDown => "fadeInDown",
            AnimationType::FadeInLeft => "fadeInLeft",
            AnimationType::FadeInRight => "fadeInRight",
            AnimationType::ScaleIn => "scaleIn",
            AnimationType::SlideInUp => "slideInUp",
            AnimationType::SlideInDown => "slideInDown",
            AnimationType::SlideInLeft => "slideInLeft",
            AnimationType::SlideInRight => "slideInRight",
        }
    }

    /// Parse a name, falling back to [`AnimationType::FadeInUp`] for anything
    /// unrecognised.
    pub fn from_name_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Transform applied while the element is hidden.
    pub fn initial_transform(self) -> Transform {
        match self {
            AnimationType::FadeInUp => Transform::translate_y(30.0),
            AnimationType::FadeInDown => Transform::translate_y(-30.0),
            AnimationType::FadeInLeft => Transform::translate_x(-30.0),
            AnimationType::FadeInRight => Transform::translate_x(30.0),
            AnimationType::ScaleIn => Transform::scale(0.8),
            AnimationType::SlideInUp => Transform::translate_y(50.0),
            AnimationType::SlideInDown => Transform::translate_y(-50.0),
            AnimationType::SlideInLeft => Transform::translate_x(-50.0),
            AnimationType::SlideInRight => Transform::translate_x(50.0),
        }
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown animation type `{0}`")]
pub struct UnknownAnimationType(pub String);

impl FromStr for AnimationType {
    type Err = UnknownAnimationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAnimationType(s.to_string()))
    }
}

// ───────────────────────────────────────── transform ─────────

/// A translate + uniform-scale transform.  Identity is `(0, 0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn translate_x(px: f64) -> Self {
        Self {
            translate_x: px,
            ..Self::IDENTITY
        }
    }

    pub fn translate_y(px: f64) -> Self {
        Self {
            translate_y: px,
            ..Self::IDENTITY
        }
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            scale: factor,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Component-wise linear interpolation.
    pub fn lerp(&self, to: &Transform, t: f64) -> Transform {
        Transform {
            translate_x: lerp(self.translate_x, to.translate_x, t),
            translate_y: lerp(self.translate_y, to.translate_y, t),
            scale: lerp(self.scale, to.scale, t),
        }
    }
}

impl fmt::Display for Transform {
    /// CSS-style rendering, e.g. `translateY(30px)` or `scale(0.8)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.translate_x != 0.0 {
            parts.push(format!("translateX({}px)", self.translate_x));
        }
        if self.translate_y != 0.0 {
            parts.push(format!("translateY({}px)", self.translate_y));
        }
        if self.scale != 1.0 {
            parts.push(format!("scale({})", self.scale));
        }
        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ───────────────────────────────────────── visual state ──────

/// What a surface shows for one element at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub opacity: f64,
    pub transform: Transform,
}

impl VisualState {
    /// Fully visible, no offset.
    pub const RESTING: VisualState = VisualState {
        opacity: 1.0,
        transform: Transform::IDENTITY,
    };

    pub fn hidden(transform: Transform) -> Self {
        Self {
            opacity: 0.0,
            transform,
        }
    }

    pub fn lerp(&self, to: &VisualState, t: f64) -> VisualState {
        VisualState {
            opacity: lerp(self.opacity, to.opacity, t).clamp(0.0, 1.0),
            transform: self.transform.lerp(&to.transform, t),
        }
    }
}

/// Style handed to a surface when an element starts being observed.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialStyle {
    pub state: VisualState,
    /// Rule that animates every later style change on this element.
    pub transition: Transition,
}

// ───────────────────────────────────────── root margin ───────

/// One side of a [`RootMargin`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f64),
    /// Percentage of the viewport's height (top/bottom) or width (left/right).
    Percent(f64),
}

impl MarginLength {
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            MarginLength::Px(px) => px,
            MarginLength::Percent(pct) => reference * pct / 100.0,
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(v) => write!(f, "{v}px"),
            MarginLength::Percent(v) => write!(f, "{v}%"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseMarginError {
    #[error("root margin needs 1 to 4 values, got {0}")]
    Arity(usize),
    #[error("invalid root margin length `{0}` (expected px or %)")]
    Length(String),
}

/// Grow (positive) or shrink (negative) the viewport region before testing
/// intersections.  Sides follow CSS order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    /// `0px 0px -50px 0px`
    fn default() -> Self {
        Self::px(0.0, 0.0, -50.0, 0.0)
    }
}

impl RootMargin {
    #[cfg(test)]
    pub const ZERO: RootMargin = RootMargin::px(0.0, 0.0, 0.0, 0.0);

    pub const fn px(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: MarginLength::Px(top),
            right: MarginLength::Px(right),
            bottom: MarginLength::Px(bottom),
            left: MarginLength::Px(left),
        }
    }
}

impl FromStr for RootMargin {
    type Err = ParseMarginError;

    /// CSS shorthand: `a` | `a b` | `a b c` | `a b c d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [a] => (*a, *a, *a, *a),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            other => return Err(ParseMarginError::Arity(other.len())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

fn parse_length(token: &str) -> Result<MarginLength, ParseMarginError> {
    let bad = || ParseMarginError::Length(token.to_string());
    if let Some(num) = token.strip_suffix("px") {
        num.parse::<f64>().map(MarginLength::Px).map_err(|_| bad())
    } else if let Some(num) = token.strip_suffix('%') {
        num.parse::<f64>().map(MarginLength::Percent).map_err(|_| bad())
    } else {
        // Bare zero is the only unitless length CSS accepts.
        match token.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(MarginLength::Px(0.0)),
            _ => Err(bad()),
        }
    }
}

// ───────────────────────────────────────── config ────────────

/// Longest delay, stagger step, or duration a config can carry (one day).
pub const MAX_SECONDS: f64 = 86_400.0;

/// Float seconds to a `Duration`, clamped to `[0, MAX_SECONDS]`.  NaN is zero.
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_SECONDS)).unwrap_or(Duration::ZERO)
}

/// Per-element reveal configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub animation_type: AnimationType,
    /// Seconds before the transition starts.
    pub delay: f64,
    /// Transition length in seconds.
    pub duration: f64,
    /// Visible fraction of the element needed to trigger, in `[0, 1]`.
    pub threshold: f64,
    pub root_margin: RootMargin,
    /// Seconds added per sibling index.
    pub stagger: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            animation_type: AnimationType::FadeInUp,
            delay: 0.0,
            duration: 0.6,
            threshold: 0.1,
            root_margin: RootMargin::default(),
            stagger: 0.0,
        }
    }
}

impl AnimationConfig {
    pub fn with_type(mut self, animation_type: AnimationType) -> Self {
        self.animation_type = animation_type;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }

    /// Clamp every field into its valid range.  Negative or NaN delays fall
    /// back to zero; a non-positive duration becomes one millisecond.  Times
    /// are capped at [`MAX_SECONDS`].
    pub fn sanitized(mut self) -> Self {
        if !(self.delay >= 0.0) || !self.delay.is_finite() {
            self.delay = 0.0;
        }
        if !(self.stagger >= 0.0) || !self.stagger.is_finite() {
            self.stagger = 0.0;
        }
        if !(self.duration > 0.0) || !self.duration.is_finite() {
            self.duration = 0.001;
        }
        self.delay = self.delay.min(MAX_SECONDS);
        self.stagger = self.stagger.min(MAX_SECONDS);
        self.duration = self.duration.min(MAX_SECONDS);
        self.threshold = if self.threshold.is_nan() {
            0.0
        } else {
            self.threshold.clamp(0.0, 1.0)
        };
        self
    }

    /// Delay before the resting style is applied to the element at
    /// `sibling_index` once it has been seen.
    pub fn effective_delay(&self, sibling_index: usize) -> Duration {
        seconds(self.delay + self.stagger * sibling_index as f64)
    }

    pub fn initial_style(&self) -> InitialStyle {
        InitialStyle {
            state: VisualState::hidden(self.animation_type.initial_transform()),
            transition: Transition {
                duration: seconds(self.duration),
                delay: seconds(self.delay),
                easing: Easing::STANDARD,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_transforms_follow_table() {
        use AnimationType::*;
        assert_eq!(FadeInUp.initial_transform(), Transform::translate_y(30.0));
        assert_eq!(FadeInDown.initial_transform(), Transform::translate_y(-30.0));
        assert_eq!(FadeInLeft.initial_transform(), Transform::translate_x(-30.0));
        assert_eq!(FadeInRight.initial_transform(), Transform::translate_x(30.0));
        assert_eq!(ScaleIn.initial_transform(), Transform::scale(0.8));
        assert_eq!(SlideInUp.initial_transform(), Transform::translate_y(50.0));
        assert_eq!(SlideInDown.initial_transform(), Transform::translate_y(-50.0));
        assert_eq!(SlideInLeft.initial_transform(), Transform::translate_x(-50.0));
        assert_eq!(SlideInRight.initial_transform(), Transform::translate_x(50.0));
    }

    #[test]
    fn unknown_type_falls_back_to_fade_in_up() {
        let t = AnimationType::from_name_lossy("unknown-value");
        assert_eq!(t, AnimationType::FadeInUp);
        assert_eq!(t.initial_transform().to_string(), "translateY(30px)");
        assert!("unknown-value".parse::<AnimationType>().is_err());
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("scaleIn".parse(), Ok(AnimationType::ScaleIn));
        assert_eq!("SLIDEINLEFT".parse(), Ok(AnimationType::SlideInLeft));
    }

    #[test]
    fn root_margin_shorthand() {
        let m: RootMargin = "0px 0px -50px 0px".parse().unwrap();
        assert_eq!(m, RootMargin::default());

        let m: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(m.top, MarginLength::Px(10.0));
        assert_eq!(m.right, MarginLength::Percent(5.0));
        assert_eq!(m.bottom, MarginLength::Px(10.0));
        assert_eq!(m.left, MarginLength::Percent(5.0));

        let m: RootMargin = "0".parse().unwrap();
        assert_eq!(m, RootMargin::ZERO);
    }

    #[test]
    fn root_margin_rejects_garbage() {
        assert_eq!(
            "".parse::<RootMargin>(),
            Err(ParseMarginError::Arity(0))
        );
        assert_eq!(
            "1px 2px 3px 4px 5px".parse::<RootMargin>(),
            Err(ParseMarginError::Arity(5))
        );
        assert!(matches!(
            "12em".parse::<RootMargin>(),
            Err(ParseMarginError::Length(_))
        ));
    }

    #[test]
    fn effective_delay_adds_stagger_per_sibling() {
        let cfg = AnimationConfig::default().with_delay(0.2).with_stagger(0.1);
        let d = cfg.effective_delay(3);
        assert!((d.as_secs_f64() - 0.5).abs() < 1e-9);
        assert!((cfg.effective_delay(0).as_secs_f64() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let cfg = AnimationConfig {
            delay: -1.0,
            stagger: f64::NAN,
            duration: 0.0,
            threshold: 4.0,
            ..AnimationConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.delay, 0.0);
        assert_eq!(cfg.stagger, 0.0);
        assert!(cfg.duration > 0.0);
        assert_eq!(cfg.threshold, 1.0);
    }

    #[test]
    fn huge_times_are_capped_instead_of_overflowing() {
        let cfg = AnimationConfig::default()
            .with_delay(1e20)
            .with_duration(1e20)
            .with_stagger(1e20)
            .sanitized();
        assert_eq!(cfg.delay, MAX_SECONDS);
        assert_eq!(cfg.duration, MAX_SECONDS);

        let style = cfg.initial_style();
        assert_eq!(style.transition.delay, Duration::from_secs(86_400));
        assert_eq!(style.transition.duration, Duration::from_secs(86_400));
        assert_eq!(cfg.effective_delay(1_000_000), Duration::from_secs(86_400));

        // Unsanitised input converts without panicking too.
        let raw = AnimationConfig::default().with_delay(1e20).initial_style();
        assert_eq!(raw.transition.delay, Duration::from_secs(86_400));
    }

    #[test]
    fn initial_style_is_hidden_with_standard_easing() {
        let style = AnimationConfig::default()
            .with_type(AnimationType::ScaleIn)
            .with_delay(0.3)
            .initial_style();
        assert_eq!(style.state.opacity, 0.0);
        assert_eq!(style.state.transform, Transform::scale(0.8));
        assert_eq!(style.transition.easing, Easing::STANDARD);
        assert!((style.transition.delay.as_secs_f64() - 0.3).abs() < 1e-9);
        assert!((style.transition.duration.as_secs_f64() - 0.6).abs() < 1e-9);
    }
}

//! Timing functions and transition rules.
//!
//! A [`Transition`] says how long a style change takes, how long it waits
//! before starting, and how progress is eased.  Surfaces sample it every
//! frame to interpolate between the old and new [`VisualState`].
//!
//! [`VisualState`]: super::animation::VisualState

use std::fmt;
use std::time::Duration;

/// Maps linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.  `x1` and `x2` must lie in `[0, 1]`.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },
}

impl Easing {
    /// `cubic-bezier(0.4, 0, 0.2, 1)`: the curve every reveal uses.
    pub const STANDARD: Easing = Easing::CubicBezier {
        x1: 0.4,
        y1: 0.0,
        x2: 0.2,
        y2: 1.0,
    };

    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::CubicBezier { x1, y1, x2, y2 } => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }
    let t = solve_bezier_x(x1, x2, progress);
    bezier_component(y1, y2, t)
}

/// Newton–Raphson on x(t) = progress, with a bisection fallback when the
/// derivative flattens out.
fn solve_bezier_x(x1: f64, x2: f64, target: f64) -> f64 {
    let mut t = target;
    for _ in 0..8 {
        let err = bezier_component(x1, x2, t) - target;
        if err.abs() < 1e-7 {
            return t;
        }
        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }
        t = (t - err / dx).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    t = target;
    for _ in 0..32 {
        let x = bezier_component(x1, x2, t);
        if (x - target).abs() < 1e-7 {
            break;
        }
        if x < target {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    t
}

/// One coordinate of the curve: 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_component(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

// ───────────────────────────────────────── transition ────────

/// Equivalent of a CSS `transition: all <duration> <easing> <delay>` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl Transition {
    /// A rule that makes every change take effect at once.
    pub const NONE: Transition = Transition {
        duration: Duration::ZERO,
        delay: Duration::ZERO,
        easing: Easing::Linear,
    };

    /// Eased progress `elapsed` after a style change.  Zero during the
    /// delay, one once the transition has finished.
    pub fn progress(&self, elapsed: Duration) -> f64 {
        if elapsed < self.delay {
            return 0.0;
        }
        let running = elapsed - self.delay;
        if self.duration.is_zero() || running >= self.duration {
            return 1.0;
        }
        self.easing
            .evaluate(running.as_secs_f64() / self.duration.as_secs_f64())
    }

    /// Total time from the style change until the element settles.
    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "all {}s {} {}s",
            self.duration.as_secs_f64(),
            self.easing,
            self.delay.as_secs_f64()
        )
    }
}

//! Eased page scrolling.
//!
//! Jumping the scroll position by a page would make every reveal on the new
//! page start in the same frame.  Instead the jump becomes a row
//! displacement that decays each tick, so the page glides and sections enter
//! the viewport one after another.

#[derive(Debug, Clone)]
pub struct SmoothScroll {
    /// Rows between the drawn position and the target.  Positive while
    /// gliding down toward a larger offset.
    lag: f64,
    target: usize,
    /// Fraction of the remaining lag removed per tick.
    speed: f64,
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            lag: 0.0,
            target: 0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Move the target, keeping the drawn position where it was.
    pub fn set_target(&mut self, target: usize) {
        if target != self.target {
            self.lag += target as f64 - self.target as f64;
            self.target = target;
        }
    }

    /// Snap to `target` with no glide.
    pub fn jump(&mut self, target: usize) {
        self.target = target;
        self.lag = 0.0;
    }

    pub fn tick(&mut self) {
        self.lag *= 1.0 - self.speed;
        if self.lag.abs() < 0.4 {
            self.lag = 0.0;
        }
    }

    /// First page row currently drawn.
    pub fn position(&self) -> usize {
        (self.target as f64 - self.lag).round().max(0.0) as usize
    }

    pub fn is_animating(&self) -> bool {
        self.lag != 0.0
    }
}

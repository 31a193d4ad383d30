//! Rectangles and intersection math for viewport observation.

use super::animation::RootMargin;

/// Axis-aligned rectangle in abstract pixels.  `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap of two rectangles.  `None` when they don't touch at all; an
    /// edge-adjacent pair yields a zero-area rectangle.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Grow (positive margins) or shrink (negative margins) each side.
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        let top = margin.top.resolve(self.height);
        let bottom = margin.bottom.resolve(self.height);
        let left = margin.left.resolve(self.width);
        let right = margin.right.resolve(self.width);
        Rect::new(
            self.x - left,
            self.y - top,
            self.width + left + right,
            self.height + top + bottom,
        )
    }
}

/// Result of testing one target against the observation region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Fraction of the target's area inside the region, in `[0, 1]`.
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Test `target` against `viewport` inset by `margin`.
pub fn intersect(target: &Rect, viewport: &Rect, margin: &RootMargin) -> Intersection {
    let root = viewport.expand(margin);
    match target.intersection(&root) {
        None => Intersection {
            ratio: 0.0,
            is_intersecting: false,
        },
        Some(overlap) => {
            let area = target.area();
            // A zero-area target touching the region counts as fully inside.
            let ratio = if area > 0.0 {
                (overlap.area() / area).clamp(0.0, 1.0)
            } else {
                1.0
            };
            // Touching the edge counts as intersecting, with ratio 0.
            Intersection {
                ratio,
                is_intersecting: true,
            }
        }
    }
}

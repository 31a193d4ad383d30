//! Intersection observer over the terminal page.
//!
//! The page is laid out in rows and columns; observation works in abstract
//! pixels, so every rectangle is scaled by the configured px-per-cell
//! factors before testing.  Like a browser observer, a subscription gets one
//! report as soon as its element has a known position, then another each
//! time the element crosses its threshold in either direction.

use std::collections::HashMap;

use crate::core::document::ElementId;
use crate::core::geometry::{self, Rect};
use crate::core::observer::{
    EntrySender, IntersectionEntry, ObserverError, ObserverOptions, SubscriptionId,
    ViewportObserver,
};

/// A rectangle in terminal cells, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

struct Watch {
    element: ElementId,
    options: ObserverOptions,
    /// Last reported "at or past threshold" state.
    last: Option<bool>,
}

pub struct TerminalViewport {
    /// `false` simulates a runtime without intersection support.
    supported: bool,
    px_per_row: f64,
    px_per_col: f64,
    watches: HashMap<SubscriptionId, Watch>,
    tx: EntrySender,
}

impl TerminalViewport {
    pub fn new(tx: EntrySender, px_per_row: f64, px_per_col: f64) -> Self {
        Self {
            supported: true,
            px_per_row,
            px_per_col,
            watches: HashMap::new(),
            tx,
        }
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn watched(&self) -> usize {
        self.watches.len()
    }

    /// Re-test every watched element against `view` (the visible part of
    /// the page) and report threshold crossings.  Elements missing from
    /// `layout` are skipped until they get a position.
    pub fn update(&mut self, layout: &HashMap<ElementId, CellRect>, view: CellRect) {
        let (px_col, px_row) = (self.px_per_col, self.px_per_row);
        let to_px = |r: CellRect| {
            Rect::new(
                r.x as f64 * px_col,
                r.y as f64 * px_row,
                r.width as f64 * px_col,
                r.height as f64 * px_row,
            )
        };
        let viewport = to_px(view);
        let mut reports = Vec::new();

        for (&id, watch) in self.watches.iter_mut() {
            let Some(&cells) = layout.get(&watch.element) else {
                continue;
            };
            let hit = geometry::intersect(&to_px(cells), &viewport, &watch.options.root_margin);
            let past = hit.is_intersecting && hit.ratio >= watch.options.threshold;
            if watch.last == Some(past) {
                continue;
            }
            watch.last = Some(past);
            reports.push(IntersectionEntry {
                subscription: id,
                element: watch.element,
                ratio: hit.ratio,
                is_intersecting: hit.is_intersecting,
            });
        }

        for entry in reports {
            // Receiver gone means the app is shutting down.
            let _ = self.tx.send(entry);
        }
    }
}

impl ViewportObserver for TerminalViewport {
    fn subscribe(
        &mut self,
        subscription: SubscriptionId,
        element: ElementId,
        options: &ObserverOptions,
    ) -> Result<(), ObserverError> {
        if !self.supported {
            return Err(ObserverError::Unsupported);
        }
        if self.tx.is_closed() {
            return Err(ObserverError::Registration("entry channel closed".into()));
        }
        self.watches.insert(
            subscription,
            Watch {
                element,
                options: options.clone(),
                last: None,
            },
        );
        Ok(())
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.watches.remove(&subscription);
    }
}

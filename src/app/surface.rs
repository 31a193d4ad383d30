//! Style surface for the terminal page.
//!
//! Owns the page's element tree and every element's style.  A style change
//! doesn't snap: it records where the element was, where it is going, and
//! when the change happened, and [`PageSurface::sample`] interpolates through
//! the element's transition rule at draw time.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::core::animation::{InitialStyle, VisualState};
use crate::core::document::{Document, ElementId};
use crate::core::easing::Transition;
use crate::core::observer::StyleMutator;

#[derive(Debug, Clone)]
struct ElementStyle {
    from: VisualState,
    to: VisualState,
    transition: Transition,
    changed_at: Instant,
    /// Set once the element has been revealed.
    visible: bool,
}

impl ElementStyle {
    fn sample(&self, now: Instant) -> VisualState {
        let t = self.transition.progress(now.saturating_duration_since(self.changed_at));
        self.from.lerp(&self.to, t)
    }

    fn settled(&self, now: Instant) -> bool {
        self.from == self.to
            || now.saturating_duration_since(self.changed_at) >= self.transition.total()
    }
}

/// Element tree plus per-element styles.  Elements nobody styled render
/// fully visible.
pub struct PageSurface {
    pub doc: Document,
    styles: HashMap<ElementId, ElementStyle>,
}

impl PageSurface {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            styles: HashMap::new(),
        }
    }

    /// Current visual state of `element`.
    pub fn sample(&self, element: ElementId, now: Instant) -> VisualState {
        self.styles
            .get(&element)
            .map_or(VisualState::RESTING, |s| s.sample(now))
    }

    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.styles.get(&element).map_or(true, |s| s.visible)
    }

    /// Whether any element is still mid-transition (the UI keeps redrawing).
    pub fn is_animating(&self, now: Instant) -> bool {
        self.styles.values().any(|s| !s.settled(now))
    }

    fn change(&mut self, element: ElementId, to: VisualState, transition: Option<Transition>) {
        let now = Instant::now();
        let entry = self.styles.entry(element).or_insert_with(|| ElementStyle {
            from: VisualState::RESTING,
            to: VisualState::RESTING,
            transition: Transition::NONE,
            changed_at: now,
            visible: false,
        });
        entry.from = entry.sample(now);
        entry.to = to;
        if let Some(tr) = transition {
            entry.transition = tr;
        }
        entry.changed_at = now;
    }
}

impl StyleMutator for PageSurface {
    fn is_mounted(&self, element: ElementId) -> bool {
        self.doc.is_mounted(element)
    }

    fn sibling_index(&self, element: ElementId) -> usize {
        self.doc.sibling_index(element)
    }

    fn set_initial(&mut self, element: ElementId, style: &InitialStyle) {
        // The hidden state applies at once; the rule governs later changes.
        self.change(element, style.state, Some(Transition::NONE));
        if let Some(s) = self.styles.get_mut(&element) {
            s.from = style.state;
            s.transition = style.transition.clone();
            s.visible = false;
        }
    }

    fn set_resting(&mut self, element: ElementId) {
        self.change(element, VisualState::RESTING, None);
        if let Some(s) = self.styles.get_mut(&element) {
            s.visible = true;
        }
        tracing::debug!(element = %self.doc.label(element), "revealed");
    }

    fn show_immediately(&mut self, element: ElementId) {
        self.change(element, VisualState::RESTING, Some(Transition::NONE));
        if let Some(s) = self.styles.get_mut(&element) {
            s.from = VisualState::RESTING;
            s.visible = true;
        }
    }
}

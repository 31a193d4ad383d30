//! Headless fakes for the observer and style seams.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::animation::{InitialStyle, Transform};
use super::document::{Document, ElementId};
use super::observer::{
    EntryReceiver, EntrySender, IntersectionEntry, ObserverError, ObserverOptions, StyleMutator,
    SubscriptionId, ViewportObserver,
};

/// Observer whose reports are emitted by hand.
pub struct FakeViewport {
    pub supported: bool,
    pub active: HashMap<SubscriptionId, (ElementId, ObserverOptions)>,
    tx: EntrySender,
    rx: EntryReceiver,
}

impl FakeViewport {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            supported: true,
            active: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Report `ratio` for every live subscription on `element`.
    pub fn emit(&mut self, element: ElementId, ratio: f64) {
        let subs: Vec<_> = self
            .active
            .iter()
            .filter(|(_, (el, _))| *el == element)
            .map(|(id, _)| *id)
            .collect();
        for id in subs {
            self.emit_to(id, element, ratio);
        }
    }

    /// Report `ratio` for `subscription` whether or not it is still live.
    pub fn emit_to(&mut self, subscription: SubscriptionId, element: ElementId, ratio: f64) {
        let _ = self.tx.send(IntersectionEntry {
            subscription,
            element,
            ratio,
            is_intersecting: ratio > 0.0,
        });
    }

    pub fn drain(&mut self) -> Vec<IntersectionEntry> {
        let mut out = Vec::new();
        while let Ok(entry) = self.rx.try_recv() {
            out.push(entry);
        }
        out
    }

    pub fn is_watching(&self, element: ElementId) -> bool {
        self.active.values().any(|(el, _)| *el == element)
    }
}

impl ViewportObserver for FakeViewport {
    fn subscribe(
        &mut self,
        subscription: SubscriptionId,
        element: ElementId,
        options: &ObserverOptions,
    ) -> Result<(), ObserverError> {
        if !self.supported {
            return Err(ObserverError::Unsupported);
        }
        self.active.insert(subscription, (element, options.clone()));
        Ok(())
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.active.remove(&subscription);
    }
}

/// Recorded style of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FakeStyle {
    pub opacity: f64,
    pub transform: Transform,
    pub visible: bool,
    /// Whether a non-empty transition rule is installed.
    pub animated: bool,
}

impl Default for FakeStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: Transform::IDENTITY,
            visible: false,
            animated: false,
        }
    }
}

/// Surface that records every mutation.
#[derive(Default)]
pub struct FakeSurface {
    pub doc: Document,
    styles: HashMap<ElementId, FakeStyle>,
    initial: HashMap<ElementId, usize>,
    resting: HashMap<ElementId, usize>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child_of_root(&mut self) -> ElementId {
        let root = self.doc.root;
        self.add_child(root)
    }

    pub fn add_child(&mut self, parent: ElementId) -> ElementId {
        self.doc.append(parent, "el")
    }

    pub fn style(&self, element: ElementId) -> FakeStyle {
        self.styles.get(&element).copied().unwrap_or_default()
    }

    pub fn initial_calls(&self, element: ElementId) -> usize {
        self.initial.get(&element).copied().unwrap_or(0)
    }

    pub fn resting_calls(&self, element: ElementId) -> usize {
        self.resting.get(&element).copied().unwrap_or(0)
    }
}

impl StyleMutator for FakeSurface {
    fn is_mounted(&self, element: ElementId) -> bool {
        self.doc.is_mounted(element)
    }

    fn sibling_index(&self, element: ElementId) -> usize {
        self.doc.sibling_index(element)
    }

    fn set_initial(&mut self, element: ElementId, style: &InitialStyle) {
        *self.initial.entry(element).or_default() += 1;
        self.styles.insert(
            element,
            FakeStyle {
                opacity: style.state.opacity,
                transform: style.state.transform,
                visible: false,
                animated: !style.transition.total().is_zero(),
            },
        );
    }

    fn set_resting(&mut self, element: ElementId) {
        *self.resting.entry(element).or_default() += 1;
        let style = self.styles.entry(element).or_default();
        style.opacity = 1.0;
        style.transform = Transform::IDENTITY;
        style.visible = true;
    }

    fn show_immediately(&mut self, element: ElementId) {
        self.styles.insert(
            element,
            FakeStyle {
                opacity: 1.0,
                transform: Transform::IDENTITY,
                visible: true,
                animated: false,
            },
        );
    }
}

//! Seams between the animator and the runtime it drives.
//!
//! * [`ViewportObserver`] reports when observed elements cross into the
//!   (margin-adjusted) viewport.  Reports travel as a stream of
//!   [`IntersectionEntry`] values over an unbounded channel, so the host
//!   loop can `select!` on them next to input events and timers.
//! * [`StyleMutator`] owns the visual state of elements and applies the
//!   changes the animator asks for.
//!
//! Each runtime provides its own adapters; the animation math never touches
//! a rendering surface directly.

use thiserror::Error;
use tokio::sync::mpsc;

use super::animation::{InitialStyle, RootMargin};
use super::document::ElementId;

/// Identifies one `observe` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Options for one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

/// One intersection report for one subscription.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub subscription: SubscriptionId,
    pub element: ElementId,
    /// Fraction of the element inside the observation region.
    pub ratio: f64,
    pub is_intersecting: bool,
}

pub type EntrySender = mpsc::UnboundedSender<IntersectionEntry>;
pub type EntryReceiver = mpsc::UnboundedReceiver<IntersectionEntry>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObserverError {
    /// The runtime has no way to observe intersections.
    #[error("viewport observation is not supported in this runtime")]
    Unsupported,
    #[error("failed to observe element: {0}")]
    Registration(String),
}

/// Source of intersection reports.
pub trait ViewportObserver {
    /// Start reporting intersections of `element` for `subscription`.
    /// Reports are delivered on the observer's entry channel.
    fn subscribe(
        &mut self,
        subscription: SubscriptionId,
        element: ElementId,
        options: &ObserverOptions,
    ) -> Result<(), ObserverError>;

    /// Stop reporting for `subscription`.  Unknown ids are ignored.
    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// Owner of per-element visual state.
pub trait StyleMutator {
    fn is_mounted(&self, element: ElementId) -> bool;

    /// Position of `element` among its parent's current children.
    fn sibling_index(&self, element: ElementId) -> usize;

    /// Hide `element` at its initial offset and install the transition rule
    /// used for every later change.
    fn set_initial(&mut self, element: ElementId, style: &InitialStyle);

    /// Move `element` to full opacity with no offset, through its transition,
    /// and tag it visible.
    fn set_resting(&mut self, element: ElementId);

    /// Same end state as [`StyleMutator::set_resting`], but with no
    /// transition.
    fn show_immediately(&mut self, element: ElementId);
}

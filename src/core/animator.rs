//! One-shot, viewport-triggered reveal animations.
//!
//! Each [`RevealAnimator::observe`] call creates an independent subscription
//! that walks through:
//!
//! ```text
//! Pending ──(ratio ≥ threshold)──▶ Scheduled ──(delay elapses)──▶ Triggered
//!    └──────────── dispose ────────────┴──▶ (forgotten, no style change)
//! ```
//!
//! Timers are plain deadlines kept in an ordered set.  The host loop sleeps
//! until [`RevealAnimator::next_deadline`] and then calls
//! [`RevealAnimator::fire_due`]; nothing ever blocks.

use std::collections::{BTreeSet, HashMap};

use tokio::time::Instant;

use super::animation::AnimationConfig;
use super::document::ElementId;
use super::observer::{
    IntersectionEntry, ObserverOptions, StyleMutator, SubscriptionId, ViewportObserver,
};

/// Lifecycle of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationState {
    /// Waiting for the element to come into view.
    Pending,
    /// Seen; the resting style lands at `due`.
    Scheduled { due: Instant },
    /// Resting style applied.  Terminal.
    Triggered,
}

/// Returned by [`RevealAnimator::observe`].  Inert handles (from elements that
/// were not mounted) refer to nothing and dispose to nothing.
#[must_use = "dispose the handle when the element unmounts"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: Option<SubscriptionId>,
}

impl SubscriptionHandle {
    pub const INERT: SubscriptionHandle = SubscriptionHandle { id: None };

    pub fn is_inert(&self) -> bool {
        self.id.is_none()
    }

    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }
}

#[derive(Debug)]
struct Subscription {
    element: ElementId,
    config: AnimationConfig,
    state: ObservationState,
}

/// Drives reveal animations for any number of elements through one
/// [`ViewportObserver`].
pub struct RevealAnimator<O> {
    observer: O,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    /// Pending timers ordered by deadline.
    timers: BTreeSet<(Instant, SubscriptionId)>,
    next_id: u64,
}

impl<O: ViewportObserver> RevealAnimator<O> {
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            subscriptions: HashMap::new(),
            timers: BTreeSet::new(),
            next_id: 0,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Hide `element` at its initial offset and start watching it.
    ///
    /// A detached element yields an inert handle.  If the observer can't
    /// take the registration the element is shown at once instead, so
    /// content is never left hidden.
    pub fn observe<S: StyleMutator>(
        &mut self,
        surface: &mut S,
        element: ElementId,
        config: AnimationConfig,
    ) -> SubscriptionHandle {
        if !surface.is_mounted(element) {
            tracing::debug!(?element, "observe: element not mounted, returning inert handle");
            return SubscriptionHandle::INERT;
        }

        let config = config.sanitized();
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        if self.subscriptions.values().any(|s| s.element == element) {
            // Independent registrations; the latest initial style wins.
            tracing::debug!(?element, ?id, "observe: element already has a subscription");
        }

        surface.set_initial(element, &config.initial_style());

        let options = ObserverOptions {
            threshold: config.threshold,
            root_margin: config.root_margin,
        };
        let state = match self.observer.subscribe(id, element, &options) {
            Ok(()) => ObservationState::Pending,
            Err(err) => {
                tracing::warn!(?element, %err, "observe: falling back to immediate reveal");
                surface.show_immediately(element);
                ObservationState::Triggered
            }
        };

        self.subscriptions.insert(
            id,
            Subscription {
                element,
                config,
                state,
            },
        );
        SubscriptionHandle { id: Some(id) }
    }

    /// Stop watching, cancel a pending timer, and forget the subscription.
    /// Never touches the element's style.  Safe to call repeatedly.
    pub fn dispose(&mut self, handle: &SubscriptionHandle) {
        let Some(id) = handle.id else {
            return;
        };
        let Some(sub) = self.subscriptions.remove(&id) else {
            return;
        };
        match sub.state {
            ObservationState::Pending => self.observer.unsubscribe(id),
            ObservationState::Scheduled { due } => {
                self.timers.remove(&(due, id));
                self.observer.unsubscribe(id);
            }
            ObservationState::Triggered => {}
        }
        tracing::debug!(?id, element = ?sub.element, state = ?sub.state, "dispose");
    }

    /// Dispose every live subscription.
    pub fn dispose_all(&mut self) {
        let ids: Vec<_> = self.subscriptions.keys().copied().collect();
        for id in ids {
            self.dispose(&SubscriptionHandle { id: Some(id) });
        }
    }

    /// React to one intersection report.  Only pending subscriptions whose
    /// element is at least `threshold` visible get scheduled.
    pub fn handle_intersection<S: StyleMutator>(
        &mut self,
        surface: &S,
        entry: &IntersectionEntry,
        now: Instant,
    ) {
        let Some(sub) = self.subscriptions.get_mut(&entry.subscription) else {
            return;
        };
        if sub.state != ObservationState::Pending {
            return;
        }
        if !entry.is_intersecting || entry.ratio < sub.config.threshold {
            return;
        }

        let sibling_index = surface.sibling_index(sub.element);
        let delay = sub.config.effective_delay(sibling_index);
        let Some(due) = now.checked_add(delay) else {
            tracing::warn!(element = ?sub.element, "reveal delay out of range, leaving pending");
            return;
        };
        sub.state = ObservationState::Scheduled { due };
        self.timers.insert((due, entry.subscription));
        tracing::debug!(
            id = ?entry.subscription,
            element = ?sub.element,
            sibling_index,
            "scheduled reveal in {:.2?}",
            delay
        );
    }

    /// Apply the resting style for every timer due at or before `now`.
    /// Returns how many elements were revealed.
    pub fn fire_due<S: StyleMutator>(&mut self, surface: &mut S, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(&(due, id)) = self.timers.first() {
            if due > now {
                break;
            }
            self.timers.pop_first();

            let Some(sub) = self.subscriptions.get_mut(&id) else {
                continue;
            };
            if sub.state != (ObservationState::Scheduled { due }) {
                continue;
            }
            if surface.is_mounted(sub.element) {
                surface.set_resting(sub.element);
                fired += 1;
            }
            sub.state = ObservationState::Triggered;
            self.observer.unsubscribe(id);
        }
        fired
    }

    /// Earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.first().map(|&(due, _)| due)
    }

    pub fn state(&self, handle: &SubscriptionHandle) -> Option<ObservationState> {
        handle
            .id
            .and_then(|id| self.subscriptions.get(&id))
            .map(|s| s.state)
    }

    /// Subscriptions not yet triggered.
    pub fn active_count(&self) -> usize {
        self.subscriptions
            .values()
            .filter(|s| s.state != ObservationState::Triggered)
            .count()
    }
}

/// Sleep until `deadline`, or forever when there is none.  Meant for a
/// `tokio::select!` branch next to the host's other event sources.
pub async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::animation::{AnimationType, Transform};
    use crate::core::testing::{FakeSurface, FakeViewport};

    fn setup() -> (RevealAnimator<FakeViewport>, FakeSurface) {
        (RevealAnimator::new(FakeViewport::new()), FakeSurface::new())
    }

    /// Push the fake's queued reports into the animator.
    fn pump(animator: &mut RevealAnimator<FakeViewport>, surface: &FakeSurface, now: Instant) {
        for entry in animator.observer_mut().drain() {
            animator.handle_intersection(surface, &entry, now);
        }
    }

    #[test]
    fn observe_hides_element_at_initial_transform() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        for &ty in AnimationType::ALL {
            let h = animator.observe(&mut surface, el, AnimationConfig::default().with_type(ty));
            let style = surface.style(el);
            assert_eq!(style.opacity, 0.0);
            assert_eq!(style.transform, ty.initial_transform());
            animator.dispose(&h);
        }
    }

    #[test]
    fn unknown_type_name_uses_fade_in_up_offset() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let cfg = AnimationConfig::default()
            .with_type(AnimationType::from_name_lossy("unknown-value"));
        let _h = animator.observe(&mut surface, el, cfg);
        assert_eq!(surface.style(el).transform, Transform::translate_y(30.0));
    }

    #[test]
    fn triggers_at_most_once() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default());
        let t0 = Instant::now();

        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, t0);
        assert_eq!(animator.fire_due(&mut surface, t0), 1);
        assert_eq!(animator.state(&h), Some(ObservationState::Triggered));
        assert!(!animator.observer().is_watching(el));

        // Leave and come back: nothing left to trigger.
        animator.observer_mut().emit_to(h.id().unwrap(), el, 0.0);
        animator.observer_mut().emit_to(h.id().unwrap(), el, 1.0);
        pump(&mut animator, &surface, t0);
        assert_eq!(animator.fire_due(&mut surface, t0 + Duration::from_secs(5)), 0);
        assert_eq!(surface.resting_calls(el), 1);
    }

    #[test]
    fn second_report_while_scheduled_is_ignored() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default().with_delay(1.0));
        let t0 = Instant::now();

        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, t0);
        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, t0 + Duration::from_millis(500));

        let Some(ObservationState::Scheduled { due }) = animator.state(&h) else {
            panic!("expected scheduled");
        };
        assert_eq!(due, t0 + Duration::from_secs(1));
    }

    #[test]
    fn below_threshold_does_not_trigger() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default().with_threshold(0.5));
        animator.observer_mut().emit(el, 0.3);
        pump(&mut animator, &surface, Instant::now());
        assert_eq!(animator.state(&h), Some(ObservationState::Pending));
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn stagger_and_delay_respect_sibling_index() {
        let (mut animator, mut surface) = setup();
        let parent = surface.add_child_of_root();
        let cards: Vec<_> = (0..4).map(|_| surface.add_child(parent)).collect();
        let cfg = AnimationConfig::default().with_delay(0.2).with_stagger(0.1);
        let _h = animator.observe(&mut surface, cards[3], cfg);

        let t0 = Instant::now();
        animator.observer_mut().emit(cards[3], 1.0);
        pump(&mut animator, &surface, t0);

        assert_eq!(animator.fire_due(&mut surface, t0 + Duration::from_millis(499)), 0);
        assert_eq!(surface.style(cards[3]).opacity, 0.0);
        assert_eq!(animator.fire_due(&mut surface, t0 + Duration::from_millis(500)), 1);
        let style = surface.style(cards[3]);
        assert_eq!(style.opacity, 1.0);
        assert!(style.transform.is_identity());
        assert!(style.visible);
    }

    #[test]
    fn dispose_before_timer_prevents_mutation() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default().with_delay(0.3));
        let t0 = Instant::now();
        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, t0);
        assert!(animator.next_deadline().is_some());

        animator.dispose(&h);
        assert_eq!(animator.next_deadline(), None);
        assert!(!animator.observer().is_watching(el));
        assert_eq!(animator.fire_due(&mut surface, t0 + Duration::from_secs(10)), 0);
        assert_eq!(surface.resting_calls(el), 0);
        // Disposal leaves the hidden style alone.
        assert_eq!(surface.style(el).opacity, 0.0);
    }

    #[test]
    fn dispose_is_idempotent_and_inert_handles_are_noops() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default());
        animator.dispose(&h);
        animator.dispose(&h);
        assert_eq!(animator.state(&h), None);

        animator.dispose(&SubscriptionHandle::INERT);
        assert_eq!(animator.active_count(), 0);
    }

    #[test]
    fn detached_element_gets_inert_handle() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        surface.doc.remove(el);
        let h = animator.observe(&mut surface, el, AnimationConfig::default());
        assert!(h.is_inert());
        assert_eq!(surface.initial_calls(el), 0);
        assert!(!animator.observer().is_watching(el));
        animator.dispose(&h);
    }

    #[test]
    fn unsupported_observer_shows_content_immediately() {
        let (mut animator, mut surface) = setup();
        animator.observer_mut().supported = false;
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default());

        let style = surface.style(el);
        assert_eq!(style.opacity, 1.0);
        assert!(style.transform.is_identity());
        assert!(!style.animated);
        assert_eq!(animator.state(&h), Some(ObservationState::Triggered));
        assert_eq!(animator.next_deadline(), None);
    }

    #[test]
    fn repeated_observe_is_last_writer_wins() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let a = animator.observe(&mut surface, el, AnimationConfig::default());
        let b = animator.observe(
            &mut surface,
            el,
            AnimationConfig::default().with_type(AnimationType::ScaleIn),
        );
        assert_ne!(a, b);
        assert_eq!(surface.style(el).transform, Transform::scale(0.8));
        assert_eq!(animator.active_count(), 2);

        // Disposing one leaves the other watching.
        animator.dispose(&a);
        assert!(animator.observer().is_watching(el));
    }

    #[test]
    fn element_removed_before_timer_is_not_touched() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default().with_delay(0.1));
        let t0 = Instant::now();
        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, t0);
        surface.doc.remove(el);

        assert_eq!(animator.fire_due(&mut surface, t0 + Duration::from_secs(1)), 0);
        assert_eq!(surface.resting_calls(el), 0);
        assert_eq!(animator.state(&h), Some(ObservationState::Triggered));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn waits_for_deadline_on_virtual_clock() {
        let (mut animator, mut surface) = setup();
        let parent = surface.add_child_of_root();
        let cards: Vec<_> = (0..4).map(|_| surface.add_child(parent)).collect();
        let cfg = AnimationConfig::default().with_delay(0.2).with_stagger(0.1);
        let _h = animator.observe(&mut surface, cards[3], cfg);

        let start = Instant::now();
        animator.observer_mut().emit(cards[3], 1.0);
        pump(&mut animator, &surface, start);

        wait_for(animator.next_deadline()).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(animator.fire_due(&mut surface, Instant::now()), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn disposed_timer_never_fires_after_time_passes() {
        let (mut animator, mut surface) = setup();
        let el = surface.add_child_of_root();
        let h = animator.observe(&mut surface, el, AnimationConfig::default().with_delay(0.5));
        animator.observer_mut().emit(el, 1.0);
        pump(&mut animator, &surface, Instant::now());

        animator.dispose(&h);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(animator.fire_due(&mut surface, Instant::now()), 0);
        assert_eq!(surface.style(el).opacity, 0.0);
    }

    #[test]
    fn huge_delay_or_duration_still_observes() {
        let (mut animator, mut surface) = setup();
        let a = surface.add_child_of_root();
        let b = surface.add_child_of_root();
        let ha = animator.observe(&mut surface, a, AnimationConfig::default().with_delay(1e20));
        let hb = animator.observe(&mut surface, b, AnimationConfig::default().with_duration(1e20));
        assert_eq!(animator.state(&ha), Some(ObservationState::Pending));
        assert_eq!(animator.state(&hb), Some(ObservationState::Pending));
        assert_eq!(surface.style(a).opacity, 0.0);
        assert!(surface.style(b).animated);

        // The delay is capped, so the reveal still gets a deadline.
        let t0 = Instant::now();
        animator.observer_mut().emit(a, 1.0);
        pump(&mut animator, &surface, t0);
        assert!(animator.next_deadline().is_some_and(|due| due > t0));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn wait_for_without_deadline_stays_pending() {
        let res = tokio::time::timeout(Duration::from_secs(60), wait_for(None)).await;
        assert!(res.is_err());
    }
}

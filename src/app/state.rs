//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use chrono::NaiveDateTime;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::core::animator::{ObservationState, RevealAnimator, SubscriptionHandle};
use crate::core::document::Document;
use crate::core::observer::IntersectionEntry;
use crate::ui::page_widget::{layout_page, PageLayout};
use crate::ui::smooth_scroll::SmoothScroll;

use super::hours::{StoreStatus, WeeklyHours};
use super::page::{mount, Page, PageItem};
use super::surface::PageSurface;
use super::viewport::{CellRect, TerminalViewport};

pub struct AppState {
    pub config: AppConfig,
    pub page: Page,
    pub hours: WeeklyHours,
    /// Element tree and styles of the mounted page.
    pub surface: PageSurface,
    /// Observed elements in document order.
    pub items: Vec<PageItem>,
    pub animator: RevealAnimator<TerminalViewport>,
    handles: Vec<SubscriptionHandle>,
    pub layout: PageLayout,
    pub scroll: SmoothScroll,
    /// Size of the page area in cells.
    pub view_width: u16,
    pub view_height: u16,
    pub should_quit: bool,
    /// Set by the replay key; the host loop answers it.
    pub replay_requested: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, page: Page, viewport: TerminalViewport) -> Self {
        let mut state = Self {
            config,
            page,
            hours: WeeklyHours::default(),
            surface: PageSurface::new(Document::new()),
            items: Vec::new(),
            animator: RevealAnimator::new(viewport),
            handles: Vec::new(),
            layout: PageLayout::default(),
            scroll: SmoothScroll::new(0.35),
            view_width: 80,
            view_height: 24,
            should_quit: false,
            replay_requested: false,
            status_message: None,
        };
        state.mount_page();
        state
    }

    /// Build the element tree from the page and observe every item.
    fn mount_page(&mut self) {
        let mut doc = std::mem::take(&mut self.surface.doc);
        self.items = mount(&self.page, &mut doc, &self.config.reveal);
        self.surface = PageSurface::new(doc);
        self.handles.clear();
        for item in &self.items {
            let handle = self
                .animator
                .observe(&mut self.surface, item.element, item.config.clone());
            match handle.id() {
                Some(id) => tracing::trace!(?id, element = %self.surface.doc.label(item.element), "observing"),
                None => tracing::trace!(element = %self.surface.doc.label(item.element), "not observed"),
            }
            self.handles.push(handle);
        }
        self.layout = layout_page(&self.page, &self.items, self.view_width);
        tracing::debug!(
            items = self.items.len(),
            active = self.animator.active_count(),
            watched = self.animator.observer().watched(),
            inert = self.handles.iter().filter(|h| h.is_inert()).count(),
            rows = self.layout.height,
            "page mounted"
        );
    }

    /// Detach every mounted element from the tree.
    fn unmount_page(&mut self) {
        let doc = &mut self.surface.doc;
        for child in doc.children(doc.root).to_vec() {
            doc.remove(child);
        }
        self.items.clear();
    }

    /// Ask the host loop to replay the page.  The loop may swap in a
    /// freshly read page before calling [`AppState::replay`].
    pub fn request_replay(&mut self) {
        self.replay_requested = true;
        self.status_message = Some("replaying".into());
    }

    /// Tear the page down and mount it again from the top, so every reveal
    /// plays once more.
    pub fn replay(&mut self) {
        self.replay_requested = false;
        self.animator.dispose_all();
        self.unmount_page();
        self.scroll.jump(0);
        self.mount_page();
        self.status_message = Some("replaying".into());
    }

    /// Stop observing the page; styles stay as they are.
    pub fn teardown(&mut self) {
        for handle in self.handles.drain(..) {
            self.animator.dispose(&handle);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.view_width {
            self.layout = layout_page(&self.page, &self.items, width);
        }
        self.view_width = width;
        self.view_height = height;
        let target = self.scroll.target().min(self.max_scroll());
        self.scroll.jump(target);
    }

    pub fn max_scroll(&self) -> usize {
        (self.layout.height as usize).saturating_sub(self.view_height as usize)
    }

    pub fn scroll_by(&mut self, rows: isize) {
        let target = self
            .scroll
            .target()
            .saturating_add_signed(rows)
            .min(self.max_scroll());
        self.scroll.set_target(target);
        self.status_message = None;
    }

    pub fn scroll_to(&mut self, row: usize) {
        self.scroll.set_target(row.min(self.max_scroll()));
        self.status_message = None;
    }

    pub fn page_rows(&self) -> isize {
        (self.view_height as isize - 2).max(1)
    }

    /// The part of the page currently on screen.
    pub fn visible_region(&self) -> CellRect {
        CellRect {
            x: 0,
            y: self.scroll.position().min(u16::MAX as usize) as u16,
            width: self.view_width,
            height: self.view_height,
        }
    }

    /// Re-test observed elements against the visible region.
    pub fn sync_viewport(&mut self) {
        let view = self.visible_region();
        self.animator.observer_mut().update(&self.layout.rects, view);
    }

    pub fn apply_entry(&mut self, entry: &IntersectionEntry, now: Instant) {
        self.animator.handle_intersection(&self.surface, entry, now);
    }

    pub fn fire_due(&mut self, now: Instant) -> usize {
        self.animator.fire_due(&mut self.surface, now)
    }

    pub fn tick(&mut self) {
        self.scroll.tick();
    }

    /// Whether the next frame differs from the last one without any input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.scroll.is_animating() || self.surface.is_animating(now)
    }

    /// Observed items whose reveal timer is running.
    pub fn queued_count(&self) -> usize {
        self.handles
            .iter()
            .filter(|h| matches!(self.animator.state(h), Some(ObservationState::Scheduled { .. })))
            .count()
    }

    pub fn revealed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| self.surface.is_revealed(item.element))
            .count()
    }

    pub fn store_status(&self, now: NaiveDateTime) -> StoreStatus {
        self.hours.status_at(now)
    }

    pub fn status_line(&self) -> String {
        let base = match &self.status_message {
            Some(msg) => msg.clone(),
            None => self.config.status_bar_hint(),
        };
        let mut line = format!("{base} | revealed {}/{}", self.revealed_count(), self.items.len());
        let queued = self.queued_count();
        if queued > 0 {
            line.push_str(&format!(", {queued} queued"));
        }
        line
    }
}

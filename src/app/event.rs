//! Terminal input as a channel.
//!
//! A background task polls crossterm and forwards what the page cares about,
//! so the main loop can `select!` over input, intersection reports and
//! reveal timers without blocking on the terminal.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

/// Input events consumed by the page view.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Nothing happened for one tick; redraw so transitions keep moving.
    Tick,
}

/// Spawn the reader task.  Ticks are sent whenever `tick_rate` passes
/// without input.
pub fn spawn_event_reader(tick_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let app_event = if event::poll(tick_rate).unwrap_or(false) {
            match event::read() {
                // Key releases would double every scroll on some terminals.
                Ok(CtEvent::Key(k)) if k.kind != KeyEventKind::Release => AppEvent::Key(k),
                Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
                Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                _ => continue,
            }
        } else {
            AppEvent::Tick
        };
        if tx.send(app_event).is_err() {
            break;
        }
    });

    rx
}

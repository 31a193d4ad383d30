//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::Action;

use super::state::AppState;

/// Rows moved per wheel notch.
const WHEEL_ROWS: isize = 3;

pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, whatever the bindings say.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    apply_action(state, action);
}

pub fn apply_action(state: &mut AppState, action: Action) {
    match action {
        Action::ScrollUp => state.scroll_by(-1),
        Action::ScrollDown => state.scroll_by(1),
        Action::PageUp => state.scroll_by(-state.page_rows()),
        Action::PageDown => state.scroll_by(state.page_rows()),
        Action::Top => state.scroll_to(0),
        Action::Bottom => state.scroll_to(usize::MAX),
        Action::Replay => state.request_replay(),
        Action::Quit => state.should_quit = true,
    }
}

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => state.scroll_by(WHEEL_ROWS),
        MouseEventKind::ScrollUp => state.scroll_by(-WHEEL_ROWS),
        _ => {}
    }
}

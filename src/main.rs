//! Scroll-triggered reveal animations for a terminal page.
//!
//! Run the binary to scroll through the store page; every heading and card
//! fades or slides into place the first time it enters the viewport.

mod app;
mod config;
mod core;
mod ui;

use std::io::{self, stderr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Terminal};
use tokio::time::Instant;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    page::Page,
    state::AppState,
    viewport::TerminalViewport,
};
use crate::config::AppConfig;
use crate::core::animator::wait_for;
use crate::core::loader::Loader;
use crate::core::observer::{EntryReceiver, EntrySender};
use crate::ui::{layout::AppLayout, page_widget::PageWidget, theme::Theme};

/// Longest gap between frames while nothing moves.
const IDLE_REDRAW: Duration = Duration::from_secs(1);

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Scroll-triggered reveal animations")]
struct Cli {
    /// Page file to show instead of the built-in store page.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Behave as if the terminal had no intersection support: everything
    /// is shown at once.
    #[arg(long = "no-observer")]
    no_observer: bool,

    /// Config file (defaults to `$XDG_CONFIG_HOME/reveal/config.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective config to the config path and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

async fn load_page(loader: &Loader<Page>, path: Option<&Path>, timeout: Duration) -> Page {
    let Some(path) = path else {
        return Page::builtin();
    };
    match loader
        .load_with_timeout(timeout, || async { Page::read(path).await })
        .await
    {
        Ok(page) => page,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "falling back to the built-in page");
            Page::builtin()
        }
    }
}

/// Read the page file again for a replay.  `None` keeps the page on screen.
async fn reload_page(loader: &Loader<Page>, path: &Path, timeout: Duration) -> Option<Page> {
    let previous = loader.get();
    loader.reset();
    match loader
        .load_with_timeout(timeout, || async { Page::read(path).await })
        .await
    {
        Ok(page) => Some(page),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, state = ?loader.state(), "reload failed");
            previous
        }
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only in debug builds / when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr) // never pollute stdout
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());

    if cli.write_config {
        config.save(cli.config.as_deref())?;
        return Ok(());
    }

    let page_timeout = Duration::from_millis(config.page_timeout_ms);
    let page_loader = Loader::new();
    let page = load_page(&page_loader, cli.page.as_deref(), page_timeout).await;

    let (entry_tx, mut entries): (EntrySender, EntryReceiver) =
        tokio::sync::mpsc::unbounded_channel();
    let mut viewport = TerminalViewport::new(entry_tx, config.px_per_row, config.px_per_col);
    if cli.no_observer {
        viewport = viewport.unsupported();
    }
    let tick = Duration::from_millis(config.tick_ms);
    let mut state = AppState::new(config, page, viewport);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let area = AppLayout::from_area(ratatui::layout::Rect::new(0, 0, size.width, size.height));
    state.resize(area.page_area.width, area.page_area.height);

    let mut events = spawn_event_reader(tick);

    // ── event loop ────────────────────────────────────────────
    let mut redraw = true;
    let mut last_draw = Instant::now();
    loop {
        state.sync_viewport();

        // Idle frames are skipped, but the clock in the hours heading still
        // needs an occasional refresh.
        let now = Instant::now();
        if redraw || state.is_animating(now) || now.duration_since(last_draw) >= IDLE_REDRAW {
            last_draw = now;
            terminal.draw(|frame| {
                let layout = AppLayout::from_area(frame.area());
                let store_status = state.store_status(chrono::Local::now().naive_local());

                frame.render_widget(
                    PageWidget {
                        page: &state.page,
                        items: &state.items,
                        layout: &state.layout,
                        surface: &state.surface,
                        now: Instant::now(),
                        top: state.scroll.position(),
                        px_per_row: state.config.px_per_row,
                        px_per_col: state.config.px_per_col,
                        store_status: Some(&store_status),
                    },
                    layout.page_area,
                );

                let status = Paragraph::new(state.status_line()).style(Theme::status_bar_style());
                frame.render_widget(status, layout.status_area);
            })?;
        }
        redraw = true;

        let deadline = state.animator.next_deadline();

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(&mut state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
                    AppEvent::Resize(w, h) => {
                        let layout = AppLayout::from_area(ratatui::layout::Rect::new(0, 0, w, h));
                        state.resize(layout.page_area.width, layout.page_area.height);
                    }
                    AppEvent::Tick => {
                        redraw = state.scroll.is_animating();
                        state.tick();
                    }
                }
            }

            Some(entry) = entries.recv() => {
                // Batch everything queued so one redraw covers it.
                let now = Instant::now();
                state.apply_entry(&entry, now);
                while let Ok(entry) = entries.try_recv() {
                    state.apply_entry(&entry, now);
                }
                state.fire_due(now);
            }

            _ = wait_for(deadline) => {
                state.fire_due(Instant::now());
            }
        }

        if state.should_quit {
            break;
        }

        if state.replay_requested {
            if let Some(path) = cli.page.as_deref() {
                if let Some(page) = reload_page(&page_loader, path, page_timeout).await {
                    state.page = page;
                }
            }
            state.replay();
        }
    }

    state.teardown();

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

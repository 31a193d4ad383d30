//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! Takes the mounted page and its sampled styles and turns them into cells
//! on the terminal.  No I/O happens here.

pub mod layout;
pub mod page_widget;
pub mod smooth_scroll;
pub mod theme;

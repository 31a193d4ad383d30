//! Application orchestration: page content, state, and input handling.

pub mod event;
pub mod handler;
pub mod hours;
pub mod page;
pub mod state;
pub mod surface;
pub mod viewport;

//! Core engine – reveal animations, element tree, geometry, and loading.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Surfaces
//! and observers plug in through the traits in [`observer`].

pub mod animation;
pub mod animator;
pub mod document;
pub mod easing;
pub mod geometry;
pub mod loader;
pub mod observer;

#[cfg(test)]
pub mod testing;

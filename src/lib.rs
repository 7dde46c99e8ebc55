//! lazygrid
//!
//! Virtualized two-dimensional grid engine: every cell is measured from its
//! content, only the cells inside the visible window are materialized, and
//! the header row and first column stay pinned while the grid scrolls.
//!
//! Pure core, impure shell:
//! - [`grid`] - measurement, sizing, scroll physics, visible ranges and the
//!   renderer; no terminal I/O
//! - [`demo`] - generated datasets and a terminal text measurer
//! - [`view`] - ratatui/crossterm host for the demo
//! - [`config`], [`logging`] - ambient setup for the binary

pub mod config;
pub mod demo;
pub mod error;
pub mod grid;
pub mod logging;
pub mod view;

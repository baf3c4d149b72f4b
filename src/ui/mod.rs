//! UI rendering module for fplwatch
//!
//! This module contains the rendering logic for the terminal dashboard,
//! using the ratatui library for TUI components.

pub mod dashboard;
pub mod help_overlay;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;

//! fplwatch library
//!
//! Data cache and refresh controller for the fantasy premier league API,
//! the dashboard views built on top of it, and the proxy service. The
//! binary in `main.rs` wires these together; integration tests use them
//! directly.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod logging;
pub mod proxy;
pub mod refresh;
pub mod store;
pub mod summary;
pub mod ui;
pub mod views;

//! # Tactics Development Tools
//!
//! Command-line tools for development:
//! - Record loading from RON/JSON data directories
//! - Data validators
//! - ASCII battlefield inspector
//! - Headless JSON-lines input runner and replay verification

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii_view;
pub mod data_loader;
pub mod protocol;
pub mod runner;
pub mod validate;

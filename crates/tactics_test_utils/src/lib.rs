//! # Tactics Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture records and battlefields
//! - Property-based testing strategies
//! - Determinism and playback harness

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;

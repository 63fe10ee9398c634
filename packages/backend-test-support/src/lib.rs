//! Backend test support utilities
//!
//! This crate provides utilities shared by the engine's integration tests:
//! unified logging initialization and unique identity generation.

pub mod logging;
pub mod unique_helpers;

//! Infrastructure layer - engine construction and timers.

pub mod state;
pub mod timers;

//! Test doubles shared by unit and integration tests.

mod scripted;

pub use scripted::ScriptedGenerator;

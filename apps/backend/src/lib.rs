#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod infra;
pub mod services;
pub mod test_support;
pub mod transport;

// Re-exports for public API
pub use ai::{create_generator, DecisionAgent, RequestScheduler, TextGenerator};
pub use config::{EngineConfig, ProviderConfig, SchedulerConfig};
pub use domain::game_transition::{GameTransition, TransitionEvent};
pub use domain::player_view::GameStatus;
pub use error::AppError;
pub use errors::domain::DomainError;
pub use errors::error_code::ErrorCode;
pub use infra::state::{build_engine, EngineBuilder};
pub use infra::timers::{TimerHandle, TimerScheduler, TokioTimers};
pub use services::game_flow::{
    ForceStartOutcome, GameLookup, NewGame, NightActionReceipt, PhaseEngine, VoteReceipt,
};
pub use services::game_registry::GameRegistry;
pub use transport::{GameTransport, MemoryTransport};

// Prelude for test convenience
pub mod prelude {
    pub use super::config::*;
    pub use super::domain::ids::*;
    pub use super::domain::roles::*;
    pub use super::domain::state::{Participant, Phase};
    pub use super::error::*;
    pub use super::infra::state::*;
    pub use super::services::game_flow::*;
    pub use super::transport::*;
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}

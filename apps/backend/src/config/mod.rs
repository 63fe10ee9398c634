pub mod engine;
pub mod provider;
pub mod scheduler;

pub use engine::EngineConfig;
pub use provider::ProviderConfig;
pub use scheduler::SchedulerConfig;

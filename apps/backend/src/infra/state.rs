use std::sync::Arc;

use crate::ai::{DecisionAgent, OfflineGenerator, RandomChooser, RequestScheduler, TextGenerator};
use crate::config::{EngineConfig, SchedulerConfig};
use crate::infra::timers::{TimerScheduler, TokioTimers};
use crate::services::game_flow::PhaseEngine;
use crate::services::game_registry::GameRegistry;
use crate::transport::{GameTransport, MemoryTransport};

/// Builder for a [`PhaseEngine`] (used in tests, the simulator and hosts)
pub struct EngineBuilder {
    config: EngineConfig,
    scheduler_config: SchedulerConfig,
    transport: Option<Arc<dyn GameTransport>>,
    generator: Option<Arc<dyn TextGenerator>>,
    timers: Option<Arc<dyn TimerScheduler>>,
    registry: Option<Arc<GameRegistry>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            scheduler_config: SchedulerConfig::default(),
            transport: None,
            generator: None,
            timers: None,
            registry: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.scheduler_config = config;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn GameTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_timers(mut self, timers: Arc<dyn TimerScheduler>) -> Self {
        self.timers = Some(timers);
        self
    }

    /// Share a registry between engines, or inspect it from a test.
    pub fn with_registry(mut self, registry: Arc<GameRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Unset collaborators default to in-memory transport, tokio timers,
    /// the offline generator and a fresh registry.
    pub fn build(self) -> Arc<PhaseEngine> {
        let chooser = Arc::new(RandomChooser::new(self.config.seed));
        let scheduler = RequestScheduler::new(self.scheduler_config);
        let generator = self
            .generator
            .unwrap_or_else(|| Arc::new(OfflineGenerator));
        let agent = Arc::new(DecisionAgent::new(generator, scheduler, chooser));

        PhaseEngine::new(
            self.config,
            self.registry.unwrap_or_default(),
            self.transport
                .unwrap_or_else(|| Arc::new(MemoryTransport::new())),
            agent,
            self.timers.unwrap_or_else(|| Arc::new(TokioTimers)),
        )
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_engine() -> EngineBuilder {
    EngineBuilder::new()
}

//! Phase engine - drives games from lobby to reveal.
//!
//! Every state change goes through [`PhaseEngine::mutate`]: lock the game,
//! apply a synchronous mutation, collect outgoing messages, unlock, then do
//! the slow I/O. Locks are never held across an await.

mod ai_coordinator;
mod lobby;
mod messages;
mod mutation;
mod orchestration;
mod player_actions;

use std::sync::{Arc, Weak};

use dashmap::DashSet;
use tokio::sync::broadcast;

use crate::ai::{DecisionAgent, RandomChooser};
use crate::config::EngineConfig;
use crate::domain::game_transition::TransitionEvent;
use crate::domain::ids::{ChannelId, GuildId, PlayerId};
use crate::domain::state::{game_not_found, Participant};
use crate::errors::domain::DomainError;
use crate::infra::timers::TimerScheduler;
use crate::services::game_registry::{GameRegistry, SharedGame};
use crate::transport::GameTransport;

pub use lobby::ForceStartOutcome;
pub use mutation::Outbox;
pub use player_actions::{NightActionReceipt, VoteReceipt};

const EVENT_BUFFER: usize = 256;

/// How a command names the game it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameLookup {
    /// The public channel the game runs in.
    Channel(ChannelId),
    /// The mafia's secret channel.
    SecretChannel(ChannelId),
    /// Any live game the player is seated in, e.g. from a DM.
    Player(PlayerId),
}

/// Request to open a lobby.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub channel: ChannelId,
    pub guild: GuildId,
    pub host: PlayerId,
    pub participants: Vec<Participant>,
}

/// The two phases that resolve from racing call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    Night,
    Vote,
}

/// Marks a resolution as in flight until dropped.
struct ResolutionGuard<'a> {
    set: &'a DashSet<(ChannelId, ResolutionKind)>,
    key: (ChannelId, ResolutionKind),
}

impl<'a> ResolutionGuard<'a> {
    /// `None` if the same resolution is already running.
    fn acquire(
        set: &'a DashSet<(ChannelId, ResolutionKind)>,
        channel: ChannelId,
        kind: ResolutionKind,
    ) -> Option<Self> {
        let key = (channel, kind);
        set.insert(key).then_some(Self { set, key })
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

pub struct PhaseEngine {
    me: Weak<PhaseEngine>,
    config: EngineConfig,
    registry: Arc<GameRegistry>,
    transport: Arc<dyn GameTransport>,
    agent: Arc<DecisionAgent>,
    chooser: Arc<RandomChooser>,
    timers: Arc<dyn TimerScheduler>,
    resolving: DashSet<(ChannelId, ResolutionKind)>,
    events: broadcast::Sender<TransitionEvent>,
}

impl PhaseEngine {
    pub fn new(
        config: EngineConfig,
        registry: Arc<GameRegistry>,
        transport: Arc<dyn GameTransport>,
        agent: Arc<DecisionAgent>,
        timers: Arc<dyn TimerScheduler>,
    ) -> Arc<Self> {
        let chooser = agent.chooser().clone();
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            config,
            registry,
            transport,
            agent,
            chooser,
            timers,
            resolving: DashSet::new(),
            events,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    pub fn agent(&self) -> &Arc<DecisionAgent> {
        &self.agent
    }

    /// Lifecycle events for every game this engine runs.
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.events.subscribe()
    }

    pub fn is_resolving(&self, channel: ChannelId, kind: ResolutionKind) -> bool {
        self.resolving.contains(&(channel, kind))
    }

    fn find(&self, lookup: GameLookup) -> Result<SharedGame, DomainError> {
        let found = match lookup {
            GameLookup::Channel(channel) => self.registry.get(channel),
            GameLookup::SecretChannel(secret) => self.registry.by_secret_channel(secret),
            GameLookup::Player(player) => self.registry.by_player(player),
        };
        found.ok_or_else(|| game_not_found(format!("no game found for {lookup:?}")))
    }

    fn arc(&self) -> Option<Arc<Self>> {
        self.me.upgrade()
    }
}

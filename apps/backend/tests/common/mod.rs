#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;
use std::time::Duration;

use backend_test_support::unique_helpers::{unique_id, unique_ids};
use mafia_backend::ai::TextGenerator;
use mafia_backend::domain::ids::{ChannelId, GuildId, PlayerId};
use mafia_backend::domain::roles::{Role, Team};
use mafia_backend::domain::state::{Participant, Phase};
use mafia_backend::services::game_registry::SharedGame;
use mafia_backend::{
    build_engine, EngineConfig, GameLookup, GameTransition, MemoryTransport, NewGame, PhaseEngine,
    SchedulerConfig,
};
use tokio::sync::broadcast;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub const SEED: u64 = 20_240_917;

/// Engine plus the in-memory transport it talks to.
pub struct Harness {
    pub engine: Arc<PhaseEngine>,
    pub transport: Arc<MemoryTransport>,
}

/// Default timings, fixed seed, no dispatch pacing.
pub fn harness(generator: Option<Arc<dyn TextGenerator>>) -> Harness {
    harness_with(EngineConfig::default().with_seed(SEED), generator)
}

pub fn harness_with(config: EngineConfig, generator: Option<Arc<dyn TextGenerator>>) -> Harness {
    let transport = Arc::new(MemoryTransport::new());
    let mut builder = build_engine()
        .with_config(config)
        .with_scheduler_config(SchedulerConfig::deterministic())
        .with_transport(transport.clone());
    if let Some(generator) = generator {
        builder = builder.with_generator(generator);
    }
    Harness {
        engine: builder.build(),
        transport,
    }
}

/// A created game and who sits at it. `players[0]` hosts.
pub struct Table {
    pub channel: ChannelId,
    pub game_number: u64,
    pub players: Vec<PlayerId>,
}

impl Table {
    pub fn lookup(&self) -> GameLookup {
        GameLookup::Channel(self.channel)
    }

    pub fn host(&self) -> PlayerId {
        self.players[0]
    }
}

/// Humans first, then computers. Names are `H1..` and `C1..`.
pub fn seats(humans: usize, computers: usize) -> Vec<Participant> {
    let ids = unique_ids(humans + computers);
    ids.into_iter()
        .enumerate()
        .map(|(idx, id)| {
            let is_computer = idx >= humans;
            let name = if is_computer {
                format!("C{}", idx - humans + 1)
            } else {
                format!("H{}", idx + 1)
            };
            Participant {
                id: PlayerId(id),
                name,
                is_computer,
            }
        })
        .collect()
}

pub fn new_game(participants: Vec<Participant>) -> NewGame {
    NewGame {
        channel: ChannelId(unique_id()),
        guild: GuildId(1),
        host: participants.first().map_or(PlayerId(0), |p| p.id),
        participants,
    }
}

pub async fn open_table(h: &Harness, humans: usize, computers: usize) -> Table {
    let request = new_game(seats(humans, computers));
    let channel = request.channel;
    let players = request.participants.iter().map(|p| p.id).collect();
    let game_number = h
        .engine
        .create_game(request)
        .await
        .expect("create game");
    Table {
        channel,
        game_number,
        players,
    }
}

/// A table of humans, everyone ready, sitting in Night 1.
pub async fn started_table(h: &Harness, humans: usize) -> Table {
    let table = open_table(h, humans, 0).await;
    for player in &table.players {
        h.engine
            .mark_ready(table.lookup(), *player)
            .await
            .expect("mark ready");
    }
    assert_eq!(phase(h, &table), Phase::Night);
    table
}

pub fn game(h: &Harness, table: &Table) -> SharedGame {
    h.engine
        .registry()
        .get(table.channel)
        .expect("game is registered")
}

pub fn phase(h: &Harness, table: &Table) -> Phase {
    game(h, table).lock().phase
}

pub fn round(h: &Harness, table: &Table) -> u32 {
    game(h, table).lock().round
}

pub fn with_role(h: &Harness, table: &Table, role: Role) -> Vec<PlayerId> {
    game(h, table)
        .lock()
        .players
        .values()
        .filter(|p| p.role == role)
        .map(|p| p.id)
        .collect()
}

pub fn is_alive(h: &Harness, table: &Table, player: PlayerId) -> bool {
    game(h, table).lock().is_alive(player)
}

pub fn name_of(h: &Harness, table: &Table, player: PlayerId) -> String {
    game(h, table).lock().name_of(player)
}

/// Let spawned tasks and queued sends run without crossing a deadline.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Wait for the end of the game on `channel`, returning the winner.
/// `None` inside means the game was cancelled.
pub async fn wait_for_end(
    rx: &mut broadcast::Receiver<mafia_backend::TransitionEvent>,
    channel: ChannelId,
) -> Option<Team> {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(event) if event.channel_id == channel => match event.transition {
                    GameTransition::GameEnded { winner } => return winner,
                    GameTransition::GameCancelled => return None,
                    _ => {}
                },
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("engine dropped"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(24 * 3600), wait)
        .await
        .expect("game ends")
}

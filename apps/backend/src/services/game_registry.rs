//! In-memory store of active games.
//!
//! Never call into the registry while holding a game's lock: lookups that
//! scan players lock each game in turn.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::domain::ids::{ChannelId, PlayerId};
use crate::domain::state::{GameState, Phase};
use crate::errors::domain::{ConflictKind, DomainError};

pub type SharedGame = Arc<Mutex<GameState>>;

#[derive(Default)]
pub struct GameRegistry {
    games: DashMap<ChannelId, SharedGame>,
    /// Secret channel -> primary channel.
    secret_channels: DashMap<ChannelId, ChannelId>,
    last_game_number: AtomicU64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly greater than every number issued before, across threads.
    pub fn next_game_number(&self) -> u64 {
        self.last_game_number.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self, channel: ChannelId) -> Option<SharedGame> {
        self.games.get(&channel).map(|g| g.value().clone())
    }

    /// Store `state` under its primary channel, replacing any existing game.
    pub fn set(&self, state: GameState) -> SharedGame {
        let channel = state.channel_id;
        let secret = state.secret_channel_id;
        let shared = Arc::new(Mutex::new(state));
        if let Some(old) = self.games.insert(channel, shared.clone()) {
            let old_secret = old.lock().secret_channel_id;
            if let Some(old_secret) = old_secret {
                self.secret_channels.remove(&old_secret);
            }
        }
        if let Some(secret) = secret {
            self.secret_channels.insert(secret, channel);
        }
        shared
    }

    /// Store `state` unless its channel already has a game.
    pub fn insert_new(&self, state: GameState) -> Result<SharedGame, DomainError> {
        match self.games.entry(state.channel_id) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::GameAlreadyRunning,
                "a game is already running in this channel",
            )),
            Entry::Vacant(slot) => {
                let shared = Arc::new(Mutex::new(state));
                slot.insert(shared.clone());
                Ok(shared)
            }
        }
    }

    /// Record `secret` as `game`'s mafia channel. A secret channel belongs
    /// to at most one game.
    pub fn claim_secret_channel(
        &self,
        secret: ChannelId,
        game: ChannelId,
    ) -> Result<(), DomainError> {
        match self.secret_channels.entry(secret) {
            Entry::Occupied(existing) if *existing.get() != game => Err(DomainError::conflict(
                ConflictKind::SecretChannelTaken,
                format!("channel {secret} already belongs to another game"),
            )),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(game);
                Ok(())
            }
        }
    }

    /// Drop a claim whose game went away before the channel was stored.
    pub fn forget_secret_channel(&self, secret: ChannelId) {
        self.secret_channels.remove(&secret);
    }

    /// Remove the game on `channel`. Absent keys are a no-op.
    pub fn delete(&self, channel: ChannelId) -> Option<SharedGame> {
        let removed = self.games.remove(&channel).map(|(_, g)| g);
        self.secret_channels.retain(|_, primary| *primary != channel);
        removed
    }

    pub fn by_secret_channel(&self, secret: ChannelId) -> Option<SharedGame> {
        let primary = *self.secret_channels.get(&secret)?.value();
        self.get(primary)
    }

    /// The non-ended game containing `player`; the oldest if several do.
    pub fn by_player(&self, player: PlayerId) -> Option<SharedGame> {
        self.list_all()
            .into_iter()
            .filter_map(|game| {
                let number = {
                    let state = game.lock();
                    (state.phase != Phase::Ended && state.players.contains_key(&player))
                        .then_some(state.game_number)
                };
                number.map(|n| (n, game))
            })
            .min_by_key(|(n, _)| *n)
            .map(|(_, game)| game)
    }

    /// Point-in-time copy of every stored game.
    pub fn list_all(&self) -> Vec<SharedGame> {
        self.games.iter().map(|g| g.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

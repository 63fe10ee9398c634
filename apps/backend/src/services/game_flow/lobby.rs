use std::collections::BTreeMap;

use tracing::{info, warn};

use super::messages;
use super::mutation::Outbox;
use super::orchestration::{FollowUp, GameEnd};
use super::{GameLookup, NewGame, PhaseEngine};
use crate::domain::ids::PlayerId;
use crate::domain::personality::Personality;
use crate::domain::roles::{assign_roles, MIN_PLAYERS};
use crate::domain::state::{
    require_host, require_phase, require_player, GameState, Phase, PlayerState,
};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};
use crate::services::game_registry::SharedGame;
use crate::transport::best_effort;

/// Result of a host force-start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceStartOutcome {
    /// Night 1 has begun; `pruned` humans were never ready and were removed.
    Started { pruned: Vec<PlayerId> },
    /// Too few players were left after pruning.
    Cancelled { remaining: usize },
}

impl PhaseEngine {
    /// Open a lobby and return its game number.
    ///
    /// Roles are assigned here and computer players are ready from the
    /// start, so an all-computer table begins immediately.
    pub async fn create_game(&self, request: NewGame) -> Result<u64, AppError> {
        let NewGame {
            channel,
            guild,
            host,
            participants,
        } = request;
        let ids: Vec<PlayerId> = participants.iter().map(|p| p.id).collect();

        let (mut roles, personalities) = self.chooser.with_rng(|rng| {
            let roles = assign_roles(&ids, rng)?;
            let personalities: BTreeMap<PlayerId, Personality> = participants
                .iter()
                .filter(|p| p.is_computer)
                .map(|p| (p.id, Personality::random(rng)))
                .collect();
            Ok::<_, DomainError>((roles, personalities))
        })?;

        let game_number = self.registry.next_game_number();
        let mut state = GameState::new(channel, guild, host, game_number, self.config.log_cap);
        for participant in participants {
            let role = roles
                .remove(&participant.id)
                .ok_or_else(|| {
                    DomainError::infra(
                        InfraErrorKind::Other("role assignment".into()),
                        "role assignment skipped a participant",
                    )
                })?;
            let mut player =
                PlayerState::new(participant.id, participant.name, role, participant.is_computer);
            player.personality = personalities.get(&participant.id).copied();
            if participant.is_computer {
                state.ready_players.insert(participant.id);
            }
            state.players.insert(participant.id, player);
        }
        let text = messages::lobby_opened(&state);
        state.log_public(text.clone());

        let game = self.registry.insert_new(state)?;
        info!(game_number, channel_id = %channel, players = ids.len(), "Lobby opened");
        best_effort::send(self.transport.as_ref(), channel, &text).await;

        self.start_if_ready(&game).await?;
        Ok(game_number)
    }

    /// Acknowledge a human player. The last acknowledgement starts the game.
    pub async fn mark_ready(&self, lookup: GameLookup, player: PlayerId) -> Result<(), AppError> {
        let game = self.find(lookup)?;
        self.mutate_and_send(&game, |state, out| {
            require_phase(state, Phase::Lobby)?;
            let name = require_player(state, player)?.name.clone();
            if !state.ready_players.insert(player) {
                return Err(DomainError::validation(
                    ValidationKind::AlreadyReady,
                    "you are already ready",
                ));
            }
            out.say(
                state.channel_id,
                format!(
                    "{name} is ready ({}/{}).",
                    state.ready_players.len(),
                    state.players.len()
                ),
            );
            Ok(())
        })
        .await?;

        self.start_if_ready(&game).await?;
        Ok(())
    }

    /// Host starts the game now, dropping humans who never readied up.
    ///
    /// Roles are reassigned for the remaining roster so the balance table
    /// holds. With fewer than the minimum left, the game is cancelled.
    pub async fn force_start(
        &self,
        lookup: GameLookup,
        host: PlayerId,
    ) -> Result<ForceStartOutcome, AppError> {
        let game = self.find(lookup)?;
        let (outcome, follow) = self
            .mutate_and_send(&game, |state, out| {
                require_phase(state, Phase::Lobby)?;
                require_host(state, host)?;

                let pruned: Vec<PlayerId> = state
                    .players
                    .values()
                    .filter(|p| !p.is_computer && !state.ready_players.contains(&p.id))
                    .map(|p| p.id)
                    .collect();
                let remaining: Vec<PlayerId> = state
                    .players
                    .keys()
                    .copied()
                    .filter(|id| !pruned.contains(id))
                    .collect();

                if remaining.len() < MIN_PLAYERS {
                    let follow = self.finish(state, out, GameEnd::Cancelled);
                    return Ok((
                        ForceStartOutcome::Cancelled {
                            remaining: remaining.len(),
                        },
                        follow,
                    ));
                }

                if !pruned.is_empty() {
                    let roles = self.chooser.with_rng(|rng| assign_roles(&remaining, rng))?;
                    let names: Vec<String> = pruned.iter().map(|id| state.name_of(*id)).collect();
                    for id in &pruned {
                        state.players.remove(id);
                        state.ready_players.remove(id);
                        out.dm(
                            *id,
                            format!(
                                "Game #{} started without you because you were not ready.",
                                state.game_number
                            ),
                        );
                    }
                    for (id, role) in roles {
                        if let Some(player) = state.player_mut(id) {
                            player.role = role;
                        }
                    }
                    let text = format!("Starting without {}.", names.join(", "));
                    state.log_public(text.clone());
                    out.say(state.channel_id, text);
                }

                let follow = self.begin(state, out);
                Ok((ForceStartOutcome::Started { pruned }, follow))
            })
            .await?;

        if matches!(outcome, ForceStartOutcome::Started { .. }) {
            self.setup_secret_channel(&game).await;
        }
        self.follow_up(&game, follow);
        Ok(outcome)
    }

    async fn start_if_ready(&self, game: &SharedGame) -> Result<bool, AppError> {
        let ready = {
            let state = game.lock();
            state.phase == Phase::Lobby && state.all_humans_ready()
        };
        if !ready {
            return Ok(false);
        }
        Ok(self.start_game(game).await?)
    }

    /// Lobby -> Night. Concurrent callers race here; only one sees Lobby.
    async fn start_game(&self, game: &SharedGame) -> Result<bool, DomainError> {
        let follow = self
            .mutate_and_send(game, |state, out| {
                if state.phase != Phase::Lobby {
                    return Ok(None);
                }
                Ok(Some(self.begin(state, out)))
            })
            .await?;
        let Some(follow) = follow else {
            return Ok(false);
        };
        self.setup_secret_channel(game).await;
        self.follow_up(game, follow);
        Ok(true)
    }

    fn begin(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        state.ready_players.clear();
        let humans: Vec<PlayerId> = state.human_ids().collect();
        for id in humans {
            if let Some(text) = messages::role_dm(state, id) {
                out.dm(id, text);
            }
        }
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            players = state.players.len(),
            "Game started"
        );
        self.enter_night(state, out)
    }

    /// Create the mafia channel and register it with the game.
    ///
    /// Failures leave the game running without one. A game that ended
    /// while the channel was being created gets it deleted again.
    async fn setup_secret_channel(&self, game: &SharedGame) {
        let (guild, channel, game_number, mafia) = {
            let state = game.lock();
            (
                state.guild_id,
                state.channel_id,
                state.game_number,
                state.mafia_ids(),
            )
        };
        let transport = self.transport.as_ref();
        let Some(secret) = best_effort::create_secret_channel(transport, guild, &mafia).await
        else {
            return;
        };
        if let Err(err) = self.registry.claim_secret_channel(secret, channel) {
            warn!(game_number, channel_id = %secret, error = %err, "secret channel rejected");
            best_effort::delete_channel(transport, secret).await;
            return;
        }

        let stored = self.mutate(game, |state, _| {
            if state.phase == Phase::Ended {
                return Ok(None);
            }
            state.secret_channel_id = Some(secret);
            let names: Vec<String> = mafia.iter().map(|id| state.name_of(*id)).collect();
            Ok(Some(names))
        });
        match stored {
            Ok((Some(names), _)) => {
                let text = format!(
                    "Mafia of game #{game_number}: {}. Coordinate here; nobody else can read this.",
                    names.join(", ")
                );
                best_effort::send(transport, secret, &text).await;
            }
            Ok((None, _)) | Err(_) => {
                self.registry.forget_secret_channel(secret);
                best_effort::delete_channel(transport, secret).await;
            }
        }
    }
}

use tracing::{debug, info};

use super::orchestration::GameEnd;
use super::{GameLookup, PhaseEngine, ResolutionKind};
use crate::domain::ids::PlayerId;
use crate::domain::player_view::GameStatus;
use crate::domain::roles::ActionKind;
use crate::domain::rules::{validate_night_action, validate_vote};
use crate::domain::state::{require_alive_player, require_host, require_phase, Phase};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};

/// What a night action submission recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightActionReceipt {
    pub kind: ActionKind,
    pub target_name: String,
    /// This submission completed the night and resolved it.
    pub resolved_early: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub target_name: String,
    /// The target this vote replaced, if the voter changed their mind.
    pub previous: Option<String>,
    /// This vote was the last one needed and the vote resolved.
    pub resolved: bool,
}

impl PhaseEngine {
    /// Record a human's night action.
    ///
    /// Each kind is recorded once per night; a teammate's later submission
    /// is rejected as a duplicate.
    pub async fn submit_night_action(
        &self,
        lookup: GameLookup,
        actor: PlayerId,
        kind: ActionKind,
        target: PlayerId,
    ) -> Result<NightActionReceipt, AppError> {
        let game = self.find(lookup)?;
        let (target_name, seq) = self
            .mutate_and_send(&game, |state, out| {
                validate_night_action(state, actor, kind, target)?;
                state.night.mark_received(kind, actor, target);
                let target_name = state.name_of(target);
                if kind == ActionKind::Kill {
                    if let Some(secret) = state.secret_channel_id {
                        out.say(
                            secret,
                            format!(
                                "{} has chosen {target_name} as tonight's target.",
                                state.name_of(actor)
                            ),
                        );
                    }
                }
                debug!(
                    game_number = state.game_number,
                    player_id = %actor,
                    %kind,
                    "night action recorded"
                );
                Ok((target_name, state.phase_seq))
            })
            .await?;

        let resolved_early = self.after_night_action(&game, seq).await;
        Ok(NightActionReceipt {
            kind,
            target_name,
            resolved_early,
        })
    }

    /// Withdraw a night action so it can be resubmitted.
    ///
    /// Only the player who recorded `kind` may withdraw it, and never once
    /// the night has started resolving.
    pub async fn retract_night_action(
        &self,
        lookup: GameLookup,
        actor: PlayerId,
        kind: ActionKind,
    ) -> Result<(), AppError> {
        let game = self.find(lookup)?;
        self.mutate_and_send(&game, |state, out| {
            require_phase(state, Phase::Night)?;
            require_alive_player(state, actor)?;
            if self.is_resolving(state.channel_id, ResolutionKind::Night) {
                return Err(DomainError::validation(
                    ValidationKind::ResolutionInProgress,
                    "the night is already being resolved",
                ));
            }
            if !state.night.retract(kind, actor) {
                return Err(DomainError::validation(
                    ValidationKind::NothingToRetract,
                    format!("you have no {kind} to take back"),
                ));
            }
            if kind == ActionKind::Kill {
                if let Some(secret) = state.secret_channel_id {
                    out.say(
                        secret,
                        format!("{} withdrew tonight's target.", state.name_of(actor)),
                    );
                }
            }
            debug!(game_number = state.game_number, player_id = %actor, %kind, "night action retracted");
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// Cast or change a vote. The last living voter triggers resolution.
    pub async fn submit_vote(
        &self,
        lookup: GameLookup,
        voter: PlayerId,
        target: PlayerId,
    ) -> Result<VoteReceipt, AppError> {
        let game = self.find(lookup)?;
        let (target_name, previous, seq) = self
            .mutate_and_send(&game, |state, out| {
                validate_vote(state, voter, target)?;
                let previous = state
                    .vote
                    .cast(voter, target)
                    .map(|prev| state.name_of(prev));
                let voter_name = state.name_of(voter);
                let target_name = state.name_of(target);
                let text = match &previous {
                    Some(prev) if *prev != target_name => {
                        format!("{voter_name} changes their vote from {prev} to {target_name}.")
                    }
                    _ => format!("{voter_name} votes for {target_name}."),
                };
                state.log_public(text.clone());
                out.say(state.channel_id, text);
                Ok((target_name, previous, state.phase_seq))
            })
            .await?;

        let resolved = self.after_vote(&game, seq).await;
        Ok(VoteReceipt {
            target_name,
            previous,
            resolved,
        })
    }

    /// Host ends the game at once, revealing roles if it had started.
    pub async fn force_end(&self, lookup: GameLookup, host: PlayerId) -> Result<(), AppError> {
        let game = self.find(lookup)?;
        let follow = self
            .mutate_and_send(&game, |state, out| {
                require_host(state, host)?;
                if state.phase == Phase::Ended {
                    return Err(DomainError::validation(
                        ValidationKind::PhaseMismatch,
                        "the game is already over",
                    ));
                }
                info!(game_number = state.game_number, player_id = %host, "Host ended the game");
                Ok(self.finish(state, out, GameEnd::ForceEnded))
            })
            .await?;
        self.follow_up(&game, follow);
        Ok(())
    }

    pub fn get_status(&self, lookup: GameLookup) -> Result<GameStatus, AppError> {
        let game = self.find(lookup)?;
        let state = game.lock();
        Ok(GameStatus::of(&state, self.config.context_entries))
    }
}

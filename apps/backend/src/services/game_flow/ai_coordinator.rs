use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info};

use super::{PhaseEngine, ResolutionKind};
use crate::ai::Decision;
use crate::domain::ids::PlayerId;
use crate::domain::player_view::DecisionContext;
use crate::domain::roles::ActionKind;
use crate::domain::rules::{night_candidates, validate_night_action, validate_vote, vote_candidates};
use crate::domain::state::{GameState, Phase};
use crate::services::game_registry::SharedGame;

type Candidates = Vec<(PlayerId, String)>;

impl PhaseEngine {
    /// Dispatch a decision task for every computer player that owes a
    /// night action. Only one mafia kill request goes out per night.
    pub(super) fn spawn_night_ai(&self, game: &SharedGame, seq: u64) {
        let Some(engine) = self.arc() else {
            return;
        };
        let (channel, actors) = {
            let state = game.lock();
            if state.phase_seq != seq || state.phase != Phase::Night {
                return;
            }
            let actors: Vec<(PlayerId, ActionKind)> = state
                .alive_players()
                .filter(|p| p.is_computer)
                .filter_map(|p| p.role.night_action().map(|kind| (p.id, kind)))
                .filter(|(_, kind)| !state.night.has_received(*kind))
                .collect();
            (state.channel_id, actors)
        };

        for (actor, kind) in actors {
            if kind == ActionKind::Kill && !self.agent.claim_mafia_request(channel, seq) {
                debug!(channel_id = %channel, player_id = %actor, "kill request already out, skipping");
                continue;
            }
            tokio::spawn(engine.clone().night_ai_task(game.clone(), seq, actor, kind));
        }
    }

    fn night_ai_task(
        self: Arc<Self>,
        game: SharedGame,
        seq: u64,
        actor: PlayerId,
        kind: ActionKind,
    ) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let Some((ctx, candidates)) =
                self.decision_input(&game, seq, actor, |state| night_candidates(state, actor, kind))
            else {
                return;
            };
            let Some(choice) = self
                .agent
                .choose(&ctx, Decision::Night(kind), &candidates)
                .await
            else {
                debug!(player_id = %actor, %kind, "no legal night target");
                return;
            };

            let applied = self
                .mutate_and_send(&game, |state, out| {
                    if state.phase_seq != seq {
                        return Ok(false);
                    }
                    if let Err(err) = validate_night_action(state, actor, kind, choice.target) {
                        debug!(player_id = %actor, %kind, error = %err, "computer night action dropped");
                        return Ok(false);
                    }
                    state.night.mark_received(kind, actor, choice.target);
                    if kind == ActionKind::Kill {
                        if let Some(secret) = state.secret_channel_id {
                            let text = format!(
                                "{} has chosen {} as tonight's target.",
                                state.name_of(actor),
                                state.name_of(choice.target)
                            );
                            out.say(secret, text);
                        }
                    }
                    info!(
                        game_number = state.game_number,
                        player_id = %actor,
                        %kind,
                        source = ?choice.source,
                        "computer night action recorded"
                    );
                    Ok(true)
                })
                .await;

            if matches!(applied, Ok(true)) {
                self.after_night_action(&game, seq).await;
            }
        })
    }

    /// Resolve early once every required action is in.
    pub(super) async fn after_night_action(&self, game: &SharedGame, seq: u64) -> bool {
        let complete = {
            let state = game.lock();
            state.phase_seq == seq && state.phase == Phase::Night && state.night_actions_complete()
        };
        if !complete {
            return false;
        }
        self.try_resolve(game, ResolutionKind::Night, Some(seq)).await
    }

    pub(super) fn spawn_vote_ai(&self, game: &SharedGame, seq: u64) {
        let Some(engine) = self.arc() else {
            return;
        };
        let voters: Vec<PlayerId> = {
            let state = game.lock();
            if state.phase_seq != seq || state.phase != Phase::Vote {
                return;
            }
            state
                .alive_players()
                .filter(|p| p.is_computer && !state.vote.has_voted(p.id))
                .map(|p| p.id)
                .collect()
        };
        for voter in voters {
            tokio::spawn(engine.clone().vote_ai_task(game.clone(), seq, voter));
        }
    }

    fn vote_ai_task(self: Arc<Self>, game: SharedGame, seq: u64, voter: PlayerId) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let Some((ctx, candidates)) =
                self.decision_input(&game, seq, voter, |state| vote_candidates(state, voter))
            else {
                return;
            };
            let Some(choice) = self.agent.choose(&ctx, Decision::Vote, &candidates).await else {
                return;
            };

            let applied = self
                .mutate_and_send(&game, |state, out| {
                    if state.phase_seq != seq || state.vote.has_voted(voter) {
                        return Ok(false);
                    }
                    if validate_vote(state, voter, choice.target).is_err() {
                        return Ok(false);
                    }
                    state.vote.cast(voter, choice.target);
                    let text = format!(
                        "{} votes for {}.",
                        state.name_of(voter),
                        state.name_of(choice.target)
                    );
                    state.log_public(text.clone());
                    out.say(state.channel_id, text);
                    Ok(true)
                })
                .await;

            if matches!(applied, Ok(true)) {
                self.after_vote(&game, seq).await;
            }
        })
    }

    /// Resolve early once every living player has voted.
    pub(super) async fn after_vote(&self, game: &SharedGame, seq: u64) -> bool {
        let complete = {
            let state = game.lock();
            state.phase_seq == seq && state.phase == Phase::Vote && state.all_alive_voted()
        };
        if !complete {
            return false;
        }
        self.try_resolve(game, ResolutionKind::Vote, Some(seq)).await
    }

    /// Each living computer player speaks once, at a random point in the
    /// leading part of the day.
    pub(super) fn schedule_remarks(&self, game: &SharedGame, seq: u64) {
        let Some(engine) = self.arc() else {
            return;
        };
        let speakers: Vec<PlayerId> = {
            let state = game.lock();
            if state.phase_seq != seq || state.phase != Phase::Day {
                return;
            }
            state
                .alive_players()
                .filter(|p| p.is_computer)
                .map(|p| p.id)
                .collect()
        };
        let window = self.config.day_duration.mul_f64(self.config.remark_window.clamp(0.0, 1.0));
        for speaker in speakers {
            let offset = window.mul_f64(self.chooser.fraction());
            // Stale remarks check phase_seq, so the handle is not kept.
            let _ = self.timers.schedule_once(
                offset,
                engine.clone().remark_task(game.clone(), seq, speaker),
            );
        }
    }

    fn remark_task(self: Arc<Self>, game: SharedGame, seq: u64, speaker: PlayerId) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let Some((ctx, _)) = self.decision_input(&game, seq, speaker, |_| Vec::new()) else {
                return;
            };
            let Some(text) = self.agent.remark(&ctx, self.config.remark_max_chars).await else {
                return;
            };
            let posted = self
                .mutate_and_send(&game, |state, out| {
                    if state.phase_seq != seq || !state.is_alive(speaker) {
                        return Ok(());
                    }
                    let line = format!("{}: {text}", state.name_of(speaker));
                    state.log_public(line.clone());
                    out.say(state.channel_id, line);
                    Ok(())
                })
                .await;
            if let Err(err) = posted {
                debug!(error = %err, "remark dropped");
            }
        })
    }

    /// Context and named candidates for `player`, if the phase instance is
    /// still current and the player is alive.
    fn decision_input<F>(
        &self,
        game: &SharedGame,
        seq: u64,
        player: PlayerId,
        candidates: F,
    ) -> Option<(DecisionContext, Candidates)>
    where
        F: FnOnce(&GameState) -> Vec<PlayerId>,
    {
        let state = game.lock();
        if state.phase_seq != seq || !state.is_alive(player) {
            return None;
        }
        let ctx = DecisionContext::for_player(
            &state,
            player,
            self.config.context_entries,
            self.config.context_entry_chars,
        )
        .ok()?;
        let named = candidates(&state)
            .into_iter()
            .map(|id| (id, state.name_of(id)))
            .collect();
        Some((ctx, named))
    }
}

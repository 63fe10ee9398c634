use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use super::messages;
use super::mutation::Outbox;
use super::{PhaseEngine, ResolutionGuard, ResolutionKind};
use crate::domain::game_transition::GameTransition;
use crate::domain::ids::ChannelId;
use crate::domain::night::resolve_night;
use crate::domain::roles::Team;
use crate::domain::state::{GameState, Phase};
use crate::domain::vote::resolve_vote;
use crate::services::game_registry::SharedGame;

/// Work left once a mutation's messages are out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FollowUp {
    Nothing,
    Night { seq: u64 },
    Day { seq: u64 },
    Vote { seq: u64 },
    Ended { channel: ChannelId },
}

/// Why a game is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum GameEnd {
    Won(Team),
    /// Host ended a running game.
    ForceEnded,
    /// Never got past the lobby.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerFire {
    Warning,
    Deadline,
}

impl PhaseEngine {
    pub(super) fn enter_night(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        let seq = state.enter_phase(Phase::Night);
        let text = messages::night_falls(state);
        state.log_public(text.clone());
        out.say(state.channel_id, text);
        out.lock(state.channel_id);
        self.arm_timers(state, seq, self.config.night_duration, true);
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            "Night begins"
        );
        FollowUp::Night { seq }
    }

    pub(super) fn enter_day(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        let seq = state.enter_phase(Phase::Day);
        let text = messages::day_opens(state, self.config.day_duration.as_secs());
        state.log_public(text.clone());
        out.unlock(state.channel_id);
        out.say(state.channel_id, text);
        self.arm_timers(state, seq, self.config.day_duration, false);
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            "Day begins"
        );
        FollowUp::Day { seq }
    }

    pub(super) fn enter_vote(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        let seq = state.enter_phase(Phase::Vote);
        let text = messages::vote_opens(state, self.config.vote_duration.as_secs());
        state.log_public(text.clone());
        out.say(state.channel_id, text);
        self.arm_timers(state, seq, self.config.vote_duration, true);
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            "Vote begins"
        );
        FollowUp::Vote { seq }
    }

    /// Enter Ended: cancel timers, announce, release channels.
    pub(super) fn finish(&self, state: &mut GameState, out: &mut Outbox, end: GameEnd) -> FollowUp {
        let started = state.phase != Phase::Lobby;
        state.enter_phase(Phase::Ended);

        let text = match end {
            GameEnd::Won(team) => messages::reveal(state, Some(team)),
            GameEnd::ForceEnded if started => messages::reveal(state, None),
            GameEnd::ForceEnded | GameEnd::Cancelled => {
                format!("Game #{} was cancelled before it started.", state.game_number)
            }
        };
        state.log_public(text.clone());
        out.say(state.channel_id, text);
        if started {
            out.unlock(state.channel_id);
        }
        if let Some(secret) = state.secret_channel_id {
            out.delete_channel(secret);
        }
        out.transition(match end {
            GameEnd::Won(team) => GameTransition::GameEnded { winner: Some(team) },
            GameEnd::ForceEnded | GameEnd::Cancelled => GameTransition::GameCancelled,
        });
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            ?end,
            "Game over"
        );
        FollowUp::Ended {
            channel: state.channel_id,
        }
    }

    pub(super) fn follow_up(&self, game: &SharedGame, follow: FollowUp) {
        match follow {
            FollowUp::Nothing => {}
            FollowUp::Night { seq } => self.spawn_night_ai(game, seq),
            FollowUp::Day { seq } => self.schedule_remarks(game, seq),
            FollowUp::Vote { seq } => self.spawn_vote_ai(game, seq),
            FollowUp::Ended { channel } => self.cleanup(channel),
        }
    }

    fn cleanup(&self, channel: ChannelId) {
        self.registry.delete(channel);
        self.agent.release_game(channel);
        debug!(channel_id = %channel, "game removed from registry");
    }

    /// Resolve the current Night or Vote at most once.
    ///
    /// Callable from timers and after every submission. A call made while
    /// the same resolution runs, or for a phase instance that is already
    /// over, is a no-op. Returns whether this call did the resolving.
    pub(super) async fn try_resolve(
        &self,
        game: &SharedGame,
        kind: ResolutionKind,
        expected_seq: Option<u64>,
    ) -> bool {
        let channel = game.lock().channel_id;
        let Some(_guard) = ResolutionGuard::acquire(&self.resolving, channel, kind) else {
            debug!(channel_id = %channel, ?kind, "resolution already in flight");
            return false;
        };

        let mutated = self.mutate(game, |state, out| {
            let phase = match kind {
                ResolutionKind::Night => Phase::Night,
                ResolutionKind::Vote => Phase::Vote,
            };
            if state.phase != phase || expected_seq.is_some_and(|seq| seq != state.phase_seq) {
                return Ok(None);
            }
            let resolved_seq = state.phase_seq;
            let follow = match kind {
                ResolutionKind::Night => self.resolve_night_phase(state, out),
                ResolutionKind::Vote => self.resolve_vote_phase(state, out),
            };
            Ok(Some((resolved_seq, follow)))
        });

        match mutated {
            Ok((Some((resolved_seq, follow)), outbox)) => {
                if kind == ResolutionKind::Night {
                    self.agent.release_night(channel, resolved_seq);
                }
                outbox.flush(self.transport.as_ref()).await;
                self.follow_up(game, follow);
                true
            }
            Ok((None, _)) => {
                debug!(channel_id = %channel, ?kind, "stale resolution request ignored");
                false
            }
            Err(err) => {
                warn!(channel_id = %channel, ?kind, error = %err, "resolution failed");
                false
            }
        }
    }

    fn resolve_night_phase(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        let res = resolve_night(state);
        let summary = messages::night_summary(state, &res);
        state.log_public(summary.clone());
        out.say(state.channel_id, summary);

        if let Some(found) = &res.investigation {
            let human = state
                .player(found.detective)
                .is_some_and(|p| !p.is_computer);
            if human {
                if let Some(note) = state.private_notes(found.detective).last() {
                    out.dm(found.detective, note.clone());
                }
            }
        }

        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            outcome = ?res.outcome,
            "Night resolved"
        );
        match res.winner {
            Some(team) => self.finish(state, out, GameEnd::Won(team)),
            None => self.enter_day(state, out),
        }
    }

    fn resolve_vote_phase(&self, state: &mut GameState, out: &mut Outbox) -> FollowUp {
        let res = resolve_vote(state);
        let summary = messages::vote_summary(state, &res);
        state.log_public(summary.clone());
        out.say(state.channel_id, summary);
        info!(
            game_number = state.game_number,
            channel_id = %state.channel_id,
            round = state.round,
            outcome = ?res.outcome,
            "Vote resolved"
        );
        match res.winner {
            Some(team) => self.finish(state, out, GameEnd::Won(team)),
            None => self.enter_night(state, out),
        }
    }

    /// Schedule the deadline and, for timed-action phases, the warning.
    fn arm_timers(&self, state: &mut GameState, seq: u64, duration: Duration, warn: bool) {
        let channel = state.channel_id;
        let lead = self.config.warning_lead;
        state.phase_timer = Some(self.timers.schedule_once(
            duration,
            self.timer_task(channel, seq, TimerFire::Deadline),
        ));
        if warn && !lead.is_zero() && duration > lead {
            state.reminder_timer = Some(self.timers.schedule_once(
                duration - lead,
                self.timer_task(channel, seq, TimerFire::Warning),
            ));
        }
    }

    fn timer_task(&self, channel: ChannelId, seq: u64, fire: TimerFire) -> BoxFuture<'static, ()> {
        let me = self.me.clone();
        Box::pin(async move {
            if let Some(engine) = me.upgrade() {
                engine.on_timer(channel, seq, fire).await;
            }
        })
    }

    async fn on_timer(&self, channel: ChannelId, seq: u64, fire: TimerFire) {
        let Some(game) = self.registry.get(channel) else {
            return;
        };
        let phase = {
            let state = game.lock();
            if state.phase_seq != seq {
                debug!(channel_id = %channel, seq, "stale timer ignored");
                return;
            }
            state.phase
        };

        match (fire, phase) {
            (TimerFire::Warning, Phase::Night | Phase::Vote) => self.send_warning(&game, seq).await,
            (TimerFire::Deadline, Phase::Night) => {
                self.try_resolve(&game, ResolutionKind::Night, Some(seq)).await;
            }
            (TimerFire::Deadline, Phase::Day) => self.open_vote(&game, seq).await,
            (TimerFire::Deadline, Phase::Vote) => {
                self.try_resolve(&game, ResolutionKind::Vote, Some(seq)).await;
            }
            _ => {}
        }
    }

    async fn open_vote(&self, game: &SharedGame, seq: u64) {
        let follow = self
            .mutate_and_send(game, |state, out| {
                if state.phase != Phase::Day || state.phase_seq != seq {
                    return Ok(FollowUp::Nothing);
                }
                Ok(self.enter_vote(state, out))
            })
            .await;
        match follow {
            Ok(follow) => self.follow_up(game, follow),
            Err(err) => warn!(error = %err, "failed to open vote"),
        }
    }

    /// Public countdown, plus a nudge to whoever still owes an action.
    async fn send_warning(&self, game: &SharedGame, seq: u64) {
        let secs = self.config.warning_lead.as_secs();
        let sent = self
            .mutate_and_send(game, |state, out| {
                if state.phase_seq != seq {
                    return Ok(());
                }
                out.say(state.channel_id, messages::warning(secs));
                match state.phase {
                    Phase::Night => {
                        for p in state.alive_players().filter(|p| !p.is_computer) {
                            let pending = p
                                .role
                                .night_action()
                                .is_some_and(|kind| !state.night.has_received(kind));
                            if pending {
                                out.dm(p.id, format!("Reminder: {secs} seconds left to choose your night action."));
                            }
                        }
                    }
                    Phase::Vote => {
                        let waiting: Vec<String> = state
                            .alive_players()
                            .filter(|p| !state.vote.has_voted(p.id))
                            .map(|p| p.name.clone())
                            .collect();
                        if !waiting.is_empty() {
                            out.say(
                                state.channel_id,
                                format!("Still waiting on votes from: {}.", waiting.join(", ")),
                            );
                        }
                    }
                    Phase::Lobby | Phase::Day | Phase::Ended => {}
                }
                Ok(())
            })
            .await;
        if let Err(err) = sent {
            warn!(error = %err, "failed to send phase warning");
        }
    }
}

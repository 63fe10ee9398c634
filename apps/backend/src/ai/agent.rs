//! Decision agent: prompt, dispatch, parse, fall back.

use std::sync::Arc;

use dashmap::DashSet;
use tracing::{debug, warn};

use super::parse::{match_candidate, sanitize};
use super::prompt::{build_prompt, Decision};
use super::random::RandomChooser;
use super::scheduler::{DispatchOutcome, RequestScheduler};
use super::trait_def::TextGenerator;
use crate::domain::ids::{ChannelId, PlayerId};
use crate::domain::player_view::{truncate_chars, DecisionContext};

/// Where a choice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSource {
    Provider,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub target: PlayerId,
    pub source: ChoiceSource,
}

pub struct DecisionAgent {
    generator: Arc<dyn TextGenerator>,
    scheduler: Arc<RequestScheduler>,
    chooser: Arc<RandomChooser>,
    /// (game, night phase_seq) pairs whose kill request is already out.
    mafia_in_flight: DashSet<(ChannelId, u64)>,
}

impl DecisionAgent {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        scheduler: Arc<RequestScheduler>,
        chooser: Arc<RandomChooser>,
    ) -> Self {
        Self {
            generator,
            scheduler,
            chooser,
            mafia_in_flight: DashSet::new(),
        }
    }

    pub fn scheduler(&self) -> &Arc<RequestScheduler> {
        &self.scheduler
    }

    pub fn chooser(&self) -> &Arc<RandomChooser> {
        &self.chooser
    }

    /// Claim this night's kill decision for `game`. Only the first caller
    /// per night gets `true`.
    pub fn claim_mafia_request(&self, game: ChannelId, night_seq: u64) -> bool {
        self.mafia_in_flight.insert((game, night_seq))
    }

    /// Drop the kill claim for one resolved night.
    pub fn release_night(&self, game: ChannelId, night_seq: u64) {
        self.mafia_in_flight.remove(&(game, night_seq));
    }

    /// Drop every kill claim for `game` when it ends, whatever the phase.
    pub fn release_game(&self, game: ChannelId) {
        self.mafia_in_flight.retain(|(channel, _)| *channel != game);
    }

    /// Pick one of `candidates` for `decision`.
    ///
    /// Total over non-empty candidate lists: an unusable or missing reply
    /// falls back to a uniform random candidate. `None` only when there is
    /// nothing to choose from.
    pub async fn choose(
        &self,
        ctx: &DecisionContext,
        decision: Decision,
        candidates: &[(PlayerId, String)],
    ) -> Option<Choice> {
        if candidates.is_empty() {
            return None;
        }
        let names: Vec<String> = candidates.iter().map(|(_, n)| n.clone()).collect();
        let prompt = build_prompt(ctx, decision, &names);
        let label = decision.label();

        let outcome = self
            .scheduler
            .submit(label, || self.generator.generate(&prompt))
            .await;

        if let DispatchOutcome::Completed(raw) = &outcome {
            let text = sanitize(raw);
            if let Some(target) = match_candidate(&text, candidates) {
                debug!(
                    player_id = %ctx.player_id,
                    decision = label,
                    target = %target,
                    "computer player chose"
                );
                return Some(Choice {
                    target,
                    source: ChoiceSource::Provider,
                });
            }
            debug!(
                player_id = %ctx.player_id,
                decision = label,
                reply = %text,
                "reply matched no candidate, falling back"
            );
        } else {
            debug!(
                player_id = %ctx.player_id,
                decision = label,
                outcome = ?outcome,
                "no usable reply, falling back"
            );
        }

        let ids: Vec<PlayerId> = candidates.iter().map(|(id, _)| *id).collect();
        let target = self.chooser.pick(&ids)?;
        Some(Choice {
            target,
            source: ChoiceSource::Fallback,
        })
    }

    /// A short public remark, or `None` when the provider has nothing
    /// usable. Remarks have no fallback.
    pub async fn remark(&self, ctx: &DecisionContext, max_chars: usize) -> Option<String> {
        let prompt = build_prompt(ctx, Decision::Remark, &[]);
        let outcome = self
            .scheduler
            .submit("remark", || self.generator.generate(&prompt))
            .await;
        match outcome {
            DispatchOutcome::Completed(raw) => {
                let text = sanitize(&raw);
                if text.is_empty() {
                    return None;
                }
                Some(truncate_chars(&text, max_chars))
            }
            other => {
                warn!(player_id = %ctx.player_id, outcome = ?other, "remark skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::offline::OfflineGenerator;
    use crate::config::SchedulerConfig;
    use crate::domain::roles::{ActionKind, Role};
    use crate::domain::state::Phase;
    use crate::test_support::ScriptedGenerator;

    fn ctx() -> DecisionContext {
        DecisionContext {
            player_id: PlayerId(1),
            name: "Ada".into(),
            role: Role::Mafia,
            personality: None,
            phase: Phase::Night,
            round: 1,
            teammates: vec![],
            alive: vec!["Ada".into(), "Bex".into(), "Cal".into()],
            eliminated: vec![],
            recent_log: vec![],
            private_notes: vec![],
        }
    }

    fn candidates() -> Vec<(PlayerId, String)> {
        vec![(PlayerId(2), "Bex".into()), (PlayerId(3), "Cal".into())]
    }

    fn agent(generator: Arc<dyn TextGenerator>) -> DecisionAgent {
        DecisionAgent::new(
            generator,
            RequestScheduler::new(SchedulerConfig::deterministic()),
            Arc::new(RandomChooser::new(Some(5))),
        )
    }

    #[tokio::test]
    async fn provider_reply_is_matched() {
        let gen = Arc::new(ScriptedGenerator::replying(["<think>hmm</think>\nI pick cal."]));
        let agent = agent(gen.clone());
        let choice = agent
            .choose(&ctx(), Decision::Night(ActionKind::Kill), &candidates())
            .await
            .unwrap();
        assert_eq!(
            choice,
            Choice {
                target: PlayerId(3),
                source: ChoiceSource::Provider
            }
        );
        assert_eq!(gen.calls(), 1);
    }

    #[tokio::test]
    async fn offline_falls_back_to_a_candidate() {
        let agent = agent(Arc::new(OfflineGenerator));
        let choice = agent
            .choose(&ctx(), Decision::Vote, &candidates())
            .await
            .unwrap();
        assert_eq!(choice.source, ChoiceSource::Fallback);
        assert!(candidates().iter().any(|(id, _)| *id == choice.target));
    }

    #[tokio::test]
    async fn garbage_reply_falls_back() {
        let agent = agent(Arc::new(ScriptedGenerator::replying(["nobody at all"])));
        let choice = agent
            .choose(&ctx(), Decision::Vote, &candidates())
            .await
            .unwrap();
        assert_eq!(choice.source, ChoiceSource::Fallback);
    }

    #[tokio::test]
    async fn empty_candidates_yield_nothing() {
        let agent = agent(Arc::new(OfflineGenerator));
        assert_eq!(agent.choose(&ctx(), Decision::Vote, &[]).await, None);
    }

    #[test]
    fn mafia_claim_is_once_per_night() {
        let agent = agent(Arc::new(OfflineGenerator));
        assert!(agent.claim_mafia_request(ChannelId(1), 1));
        assert!(!agent.claim_mafia_request(ChannelId(1), 1));
        assert!(agent.claim_mafia_request(ChannelId(2), 1));
        assert!(agent.claim_mafia_request(ChannelId(1), 4));
        agent.release_game(ChannelId(1));
        assert!(agent.claim_mafia_request(ChannelId(1), 1));
    }

    #[test]
    fn released_night_leaves_other_claims_alone() {
        let agent = agent(Arc::new(OfflineGenerator));
        assert!(agent.claim_mafia_request(ChannelId(1), 1));
        assert!(agent.claim_mafia_request(ChannelId(1), 4));
        agent.release_night(ChannelId(1), 1);
        assert!(!agent.claim_mafia_request(ChannelId(1), 4));
        assert!(agent.claim_mafia_request(ChannelId(1), 1));
    }

    #[tokio::test]
    async fn remark_is_sanitized_and_truncated() {
        let agent = agent(Arc::new(ScriptedGenerator::replying([
            "<reasoning>plan</reasoning>I think Bex is acting strange today",
        ])));
        let text = agent.remark(&ctx(), 10).await.unwrap();
        assert_eq!(text, "I think Be");
    }
}

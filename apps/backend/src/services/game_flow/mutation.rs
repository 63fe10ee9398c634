use tracing::trace;

use super::PhaseEngine;
use crate::domain::game_transition::{
    derive_game_transitions, GameLifecycleView, GameTransition, TransitionEvent,
};
use crate::domain::ids::{ChannelId, PlayerId};
use crate::domain::state::GameState;
use crate::errors::domain::DomainError;
use crate::services::game_registry::SharedGame;
use crate::transport::{best_effort, GameTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Effect {
    Say { channel: ChannelId, text: String },
    Dm { player: PlayerId, text: String },
    Lock(ChannelId),
    Unlock(ChannelId),
    DeleteChannel(ChannelId),
}

/// Collaborator calls queued while a game is locked, sent after unlock.
#[derive(Debug, Default)]
pub struct Outbox {
    effects: Vec<Effect>,
    transitions: Vec<GameTransition>,
}

impl Outbox {
    pub fn say(&mut self, channel: ChannelId, text: impl Into<String>) {
        self.effects.push(Effect::Say {
            channel,
            text: text.into(),
        });
    }

    pub fn dm(&mut self, player: PlayerId, text: impl Into<String>) {
        self.effects.push(Effect::Dm {
            player,
            text: text.into(),
        });
    }

    pub fn lock(&mut self, channel: ChannelId) {
        self.effects.push(Effect::Lock(channel));
    }

    pub fn unlock(&mut self, channel: ChannelId) {
        self.effects.push(Effect::Unlock(channel));
    }

    pub fn delete_channel(&mut self, channel: ChannelId) {
        self.effects.push(Effect::DeleteChannel(channel));
    }

    /// A transition the before/after views cannot show.
    pub fn transition(&mut self, transition: GameTransition) {
        self.transitions.push(transition);
    }

    /// Send everything in order. Failures are logged and skipped.
    pub async fn flush(self, transport: &dyn GameTransport) {
        for effect in self.effects {
            match effect {
                Effect::Say { channel, text } => {
                    best_effort::send(transport, channel, &text).await;
                }
                Effect::Dm { player, text } => best_effort::dm(transport, player, &text).await,
                Effect::Lock(channel) => best_effort::lock(transport, channel).await,
                Effect::Unlock(channel) => best_effort::unlock(transport, channel).await,
                Effect::DeleteChannel(channel) => {
                    best_effort::delete_channel(transport, channel).await
                }
            }
        }
    }
}

impl PhaseEngine {
    /// Apply `mutation` under the game lock and publish the transitions it
    /// caused. An `Err` from `mutation` must leave the state untouched.
    pub(super) fn mutate<T, F>(&self, game: &SharedGame, mutation: F) -> Result<(T, Outbox), DomainError>
    where
        F: FnOnce(&mut GameState, &mut Outbox) -> Result<T, DomainError>,
    {
        let mut outbox = Outbox::default();
        let (value, channel_id, game_number, mut transitions) = {
            let mut state = game.lock();
            let before = GameLifecycleView::of(&state);
            let value = mutation(&mut state, &mut outbox)?;
            let after = GameLifecycleView::of(&state);
            (
                value,
                state.channel_id,
                state.game_number,
                derive_game_transitions(&before, &after),
            )
        };

        transitions.append(&mut outbox.transitions);
        for transition in transitions {
            trace!(channel_id = %channel_id, game_number, ?transition, "publishing transition");
            // No subscribers is fine.
            let _ = self.events.send(TransitionEvent {
                channel_id,
                game_number,
                transition,
            });
        }
        Ok((value, outbox))
    }

    /// [`mutate`](Self::mutate) then flush the outbox.
    pub(super) async fn mutate_and_send<T, F>(
        &self,
        game: &SharedGame,
        mutation: F,
    ) -> Result<T, DomainError>
    where
        F: FnOnce(&mut GameState, &mut Outbox) -> Result<T, DomainError>,
    {
        let (value, outbox) = self.mutate(game, mutation)?;
        outbox.flush(self.transport.as_ref()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    #[tokio::test]
    async fn flush_sends_in_order() {
        let transport = MemoryTransport::new();
        let mut outbox = Outbox::default();
        outbox.say(ChannelId(1), "first");
        outbox.lock(ChannelId(1));
        outbox.say(ChannelId(1), "second");
        outbox.dm(PlayerId(7), "secret");
        outbox.flush(&transport).await;

        assert_eq!(transport.messages(ChannelId(1)), vec!["first", "second"]);
        assert!(transport.is_locked(ChannelId(1)));
        assert_eq!(transport.dms(PlayerId(7)), vec!["secret"]);
    }
}

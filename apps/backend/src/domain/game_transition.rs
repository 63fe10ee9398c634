// apps/backend/src/domain/game_transition.rs

use std::collections::BTreeSet;

use crate::domain::ids::{ChannelId, PlayerId};
use crate::domain::roles::Team;
use crate::domain::state::{GameState, Phase};

/// The slice of a game that transitions are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLifecycleView {
    pub phase: Phase,
    pub round: u32,
    /// Seated players who have died. Lobby pruning removes players
    /// without killing them.
    pub dead: BTreeSet<PlayerId>,
}

impl GameLifecycleView {
    pub fn of(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            round: state.round,
            dead: state.dead_players().map(|p| p.id).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameTransition {
    /// Edge-triggered: Lobby -> Night
    GameStarted,

    /// Edge-triggered: entered a new non-terminal phase
    PhaseChanged { phase: Phase, round: u32 },

    /// Edge-triggered: a seated player died
    PlayerDied { player_id: PlayerId },

    /// Explicit: a team met its win condition
    GameEnded { winner: Option<Team> },

    /// Explicit: Lobby -> Ended without starting, or force-ended by the host
    GameCancelled,
}

/// A transition tagged with the game it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    pub channel_id: ChannelId,
    pub game_number: u64,
    pub transition: GameTransition,
}

/// Derive domain transitions from before/after lifecycle state.
///
/// `GameEnded` and `GameCancelled` carry information the views do not, so
/// the caller appends those explicitly.
pub fn derive_game_transitions(
    before: &GameLifecycleView,
    after: &GameLifecycleView,
) -> Vec<GameTransition> {
    let mut transitions = Vec::new();

    // 1. Deaths
    for player_id in after.dead.difference(&before.dead) {
        transitions.push(GameTransition::PlayerDied {
            player_id: *player_id,
        });
    }

    // 2. Game Start (Lobby -> Night). Lobby -> Ended is a cancellation.
    if before.phase == Phase::Lobby && after.phase == Phase::Night {
        transitions.push(GameTransition::GameStarted);
    }

    // 3. Phase change into a live phase
    if before.phase != after.phase && after.phase != Phase::Ended {
        transitions.push(GameTransition::PhaseChanged {
            phase: after.phase,
            round: after.round,
        });
    }

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(phase: Phase, round: u32, dead: &[u64]) -> GameLifecycleView {
        GameLifecycleView {
            phase,
            round,
            dead: dead.iter().copied().map(PlayerId).collect(),
        }
    }

    #[test]
    fn test_derive_game_started() {
        let before = view(Phase::Lobby, 1, &[]);
        let after = view(Phase::Night, 1, &[]);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::GameStarted));
        assert!(transitions.contains(&GameTransition::PhaseChanged {
            phase: Phase::Night,
            round: 1
        }));
    }

    #[test]
    fn test_derive_player_died() {
        let before = view(Phase::Night, 1, &[]);
        let after = view(Phase::Day, 1, &[3]);
        let transitions = derive_game_transitions(&before, &after);
        assert_eq!(
            transitions,
            vec![
                GameTransition::PlayerDied {
                    player_id: PlayerId(3)
                },
                GameTransition::PhaseChanged {
                    phase: Phase::Day,
                    round: 1
                },
            ]
        );
    }

    #[test]
    fn test_lobby_to_ended_is_not_a_start() {
        let before = view(Phase::Lobby, 1, &[]);
        let after = view(Phase::Ended, 1, &[]);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_vote_to_night_carries_new_round() {
        let before = view(Phase::Vote, 1, &[2]);
        let after = view(Phase::Night, 2, &[2, 5]);
        let transitions = derive_game_transitions(&before, &after);
        assert!(transitions.contains(&GameTransition::PhaseChanged {
            phase: Phase::Night,
            round: 2
        }));
        assert!(transitions.contains(&GameTransition::PlayerDied {
            player_id: PlayerId(5)
        }));
        assert!(!transitions.contains(&GameTransition::PlayerDied {
            player_id: PlayerId(2)
        }));
        assert!(!transitions.contains(&GameTransition::GameStarted));
    }
}

//! Vote resolution.

use crate::domain::ids::PlayerId;
use crate::domain::roles::Team;
use crate::domain::state::GameState;
use crate::domain::win::check_win;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Eliminated { player: PlayerId, votes: usize },
    /// More than one target shares the top count.
    Tie { candidates: Vec<PlayerId>, votes: usize },
    NoVotes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteResolution {
    pub outcome: VoteOutcome,
    pub winner: Option<Team>,
}

/// Apply the finished vote to `state`.
///
/// The tally is rebuilt from the recorded votes first. `round` advances
/// only when the game carries on into another night.
pub fn resolve_vote(state: &mut GameState) -> VoteResolution {
    state.vote.recompute_tally();

    let top = state.vote.tally().values().copied().max().unwrap_or(0);
    let leaders: Vec<PlayerId> = state
        .vote
        .tally()
        .iter()
        .filter(|(_, count)| **count == top)
        .map(|(target, _)| *target)
        .collect();

    let outcome = match leaders.as_slice() {
        [] => VoteOutcome::NoVotes,
        [single] => {
            if let Some(player) = state.player_mut(*single) {
                player.alive = false;
            }
            VoteOutcome::Eliminated {
                player: *single,
                votes: top,
            }
        }
        _ => VoteOutcome::Tie {
            candidates: leaders,
            votes: top,
        },
    };

    let winner = check_win(state);
    if winner.is_none() {
        state.round += 1;
    }

    VoteResolution { outcome, winner }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::Phase;
    use crate::domain::test_state_helpers::{game_with_roles, MAFIA_6};

    #[test]
    fn plurality_eliminates_single_leader() {
        let mut state = game_with_roles(&MAFIA_6);
        state.enter_phase(Phase::Vote);
        state.vote.cast(PlayerId(2), PlayerId(5));
        state.vote.cast(PlayerId(3), PlayerId(5));
        state.vote.cast(PlayerId(4), PlayerId(1));

        let res = resolve_vote(&mut state);

        assert_eq!(
            res.outcome,
            VoteOutcome::Eliminated {
                player: PlayerId(5),
                votes: 2
            }
        );
        assert!(!state.is_alive(PlayerId(5)));
        assert_eq!(res.winner, None);
        assert_eq!(state.round, 2);
    }

    #[test]
    fn tie_eliminates_nobody() {
        let mut state = game_with_roles(&MAFIA_6);
        state.enter_phase(Phase::Vote);
        state.vote.cast(PlayerId(2), PlayerId(5));
        state.vote.cast(PlayerId(3), PlayerId(1));

        let res = resolve_vote(&mut state);

        assert!(matches!(res.outcome, VoteOutcome::Tie { votes: 1, .. }));
        assert_eq!(state.alive_players().count(), 6);
        assert_eq!(state.round, 2);
    }

    #[test]
    fn no_votes_eliminates_nobody() {
        let mut state = game_with_roles(&MAFIA_6);
        state.enter_phase(Phase::Vote);

        let res = resolve_vote(&mut state);

        assert_eq!(res.outcome, VoteOutcome::NoVotes);
        assert_eq!(state.alive_players().count(), 6);
    }

    #[test]
    fn round_does_not_advance_when_game_ends() {
        let mut state = game_with_roles(&MAFIA_6);
        state.enter_phase(Phase::Vote);
        for voter in 2..=6 {
            state.vote.cast(PlayerId(voter), PlayerId(1));
        }

        let res = resolve_vote(&mut state);

        assert_eq!(res.winner, Some(Team::Town));
        assert_eq!(state.round, 1);
    }
}

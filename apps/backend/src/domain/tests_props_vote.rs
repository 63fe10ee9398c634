//! Property tests for vote resolution (pure domain).
//!
//! Contract:
//! - A single top-count target is eliminated
//! - A shared top count, or no votes at all, eliminates nobody
//! - Round advances only when no team has won

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::domain::ids::PlayerId;
use crate::domain::state::Phase;
use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::{game_with_roles, MAFIA_8};
use crate::domain::vote::{resolve_vote, VoteOutcome};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_plurality_or_nobody(ballots in test_gens::ballots(MAFIA_8.len())) {
        let mut state = game_with_roles(&MAFIA_8);
        state.enter_phase(Phase::Vote);

        let mut last_vote: BTreeMap<usize, usize> = BTreeMap::new();
        for (voter, target) in &ballots {
            state.vote.cast(PlayerId(*voter as u64 + 1), PlayerId(*target as u64 + 1));
            last_vote.insert(*voter, *target);
        }
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for target in last_vote.values() {
            *counts.entry(*target).or_insert(0) += 1;
        }
        let top = counts.values().copied().max().unwrap_or(0);
        let leaders: Vec<usize> = counts.iter().filter(|(_, c)| **c == top).map(|(t, _)| *t).collect();

        let round_before = state.round;
        let res = resolve_vote(&mut state);

        match (leaders.as_slice(), &res.outcome) {
            ([], VoteOutcome::NoVotes) => {
                prop_assert_eq!(state.alive_players().count(), MAFIA_8.len());
            }
            ([single], VoteOutcome::Eliminated { player, votes }) => {
                prop_assert_eq!(*player, PlayerId(*single as u64 + 1));
                prop_assert_eq!(*votes, top);
                prop_assert!(!state.is_alive(*player));
                prop_assert_eq!(state.alive_players().count(), MAFIA_8.len() - 1);
            }
            (many, VoteOutcome::Tie { candidates, .. }) if many.len() > 1 => {
                prop_assert_eq!(candidates.len(), many.len());
                prop_assert_eq!(state.alive_players().count(), MAFIA_8.len());
            }
            (expected, got) => {
                prop_assert!(false, "leaders {:?} but outcome {:?}", expected, got);
            }
        }

        if res.winner.is_none() {
            prop_assert_eq!(state.round, round_before + 1);
        } else {
            prop_assert_eq!(state.round, round_before);
        }
    }
}

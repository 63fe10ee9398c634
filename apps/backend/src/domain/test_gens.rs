// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::ids::PlayerId;
use crate::domain::roles::{Role, MAX_PLAYERS, MIN_PLAYERS};

pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Mafia),
        Just(Role::Detective),
        Just(Role::Doctor),
        Just(Role::Civilian),
    ]
}

/// 1..=12 players with arbitrary roles and liveness.
pub fn roster() -> impl Strategy<Value = Vec<(Role, bool)>> {
    prop::collection::vec((role(), any::<bool>()), 1..=12)
}

/// A valid table size and that many distinct identities.
pub fn seated_players() -> impl Strategy<Value = Vec<PlayerId>> {
    (MIN_PLAYERS..=MAX_PLAYERS).prop_flat_map(|n| {
        prop::collection::btree_set(1u64..1_000_000, n)
            .prop_map(|ids| ids.into_iter().map(PlayerId).collect::<Vec<_>>())
            .prop_shuffle()
    })
}

/// Votes as (voter index, target index) pairs into a table of `n` players.
pub fn ballots(n: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..n, 0..n), 0..=n)
}

//! Property tests for role assignment (pure domain).
//!
//! Contract:
//! - Every seated identity receives exactly one role
//! - The role multiset matches the balance table for the table size

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::roles::{assign_roles, balance_for, Role};
use crate::domain::test_gens;
use crate::domain::test_prelude;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: output covers exactly the input identities.
    #[test]
    fn prop_every_identity_gets_one_role(
        players in test_gens::seated_players(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let assigned = assign_roles(&players, &mut rng).unwrap();

        let input: BTreeSet<_> = players.iter().copied().collect();
        let output: BTreeSet<_> = assigned.keys().copied().collect();
        prop_assert_eq!(input, output);
    }

    /// Property: role counts match the balance table.
    #[test]
    fn prop_role_multiset_matches_table(
        players in test_gens::seated_players(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let assigned = assign_roles(&players, &mut rng).unwrap();
        let balance = balance_for(players.len()).unwrap();

        for role in [Role::Mafia, Role::Detective, Role::Doctor, Role::Civilian] {
            let got = assigned.values().filter(|r| **r == role).count();
            prop_assert_eq!(got, balance.count_of(role), "role {:?}", role);
        }
    }
}

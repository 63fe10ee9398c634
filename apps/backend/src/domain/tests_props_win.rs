//! Property tests for win evaluation (pure domain).

use proptest::prelude::*;

use crate::domain::roles::{Role, Team};
use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::game_with_roster;
use crate::domain::win::check_win;

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: outcome depends only on living mafia vs living town.
    #[test]
    fn prop_win_rule_matches_living_counts(roster in test_gens::roster()) {
        let state = game_with_roster(&roster);
        let alive_mafia = roster.iter().filter(|(r, a)| *a && *r == Role::Mafia).count();
        let alive_town = roster.iter().filter(|(r, a)| *a && *r != Role::Mafia).count();

        let expected = if alive_mafia == 0 {
            Some(Team::Town)
        } else if alive_mafia >= alive_town {
            Some(Team::Mafia)
        } else {
            None
        };
        prop_assert_eq!(check_win(&state), expected);
    }

    /// Property: killing an already-dead player changes nothing.
    #[test]
    fn prop_dead_players_never_count(roster in test_gens::roster()) {
        let mut state = game_with_roster(&roster);
        let before = check_win(&state);
        for p in state.players.values_mut().filter(|p| !p.alive) {
            p.role = if p.role == Role::Mafia { Role::Civilian } else { Role::Mafia };
        }
        prop_assert_eq!(check_win(&state), before);
    }
}

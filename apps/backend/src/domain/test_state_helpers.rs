//! Test-only game state helpers for domain unit tests.

use crate::domain::ids::{ChannelId, GuildId, PlayerId};
use crate::domain::roles::Role;
use crate::domain::state::{GameState, PlayerState};

use Role::{Civilian as C, Detective as D, Doctor as H, Mafia as M};

pub const MAFIA_5: [Role; 5] = [M, D, C, C, C];
pub const MAFIA_6: [Role; 6] = [M, D, H, C, C, C];
pub const MAFIA_7: [Role; 7] = [M, M, D, H, C, C, C];
pub const MAFIA_8: [Role; 8] = [M, M, D, H, C, C, C, C];

/// A lobby-phase game whose players have ids `1..=roles.len()`, in order,
/// named `P1`, `P2`, …, all human and the first one hosting.
pub fn game_with_roles(roles: &[Role]) -> GameState {
    let mut state = GameState::new(ChannelId(100), GuildId(10), PlayerId(1), 1, 50);
    for (idx, role) in roles.iter().enumerate() {
        let id = PlayerId(idx as u64 + 1);
        state
            .players
            .insert(id, PlayerState::new(id, format!("P{}", idx + 1), *role, false));
    }
    state
}

/// Build from an explicit `(role, alive)` roster.
pub fn game_with_roster(roster: &[(Role, bool)]) -> GameState {
    let roles: Vec<Role> = roster.iter().map(|(role, _)| *role).collect();
    let mut state = game_with_roles(&roles);
    for (idx, (_, alive)) in roster.iter().enumerate() {
        if let Some(p) = state.player_mut(PlayerId(idx as u64 + 1)) {
            p.alive = *alive;
        }
    }
    state
}

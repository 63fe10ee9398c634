//! Win evaluation.

use crate::domain::roles::Team;
use crate::domain::state::{GameState, PlayerState};

/// Winner given the current roster, or `None` while the game continues.
///
/// Only living players count. No living mafia is a town win even when no
/// town is left either; otherwise mafia win as soon as they are at least as
/// many as the living town.
pub fn check_win(state: &GameState) -> Option<Team> {
    winner_among(state.players.values())
}

pub fn winner_among<'a>(players: impl IntoIterator<Item = &'a PlayerState>) -> Option<Team> {
    let (alive_mafia, alive_town) = players
        .into_iter()
        .filter(|p| p.alive)
        .fold((0usize, 0usize), |(mafia, town), p| match p.team() {
            Team::Mafia => (mafia + 1, town),
            Team::Town => (mafia, town + 1),
        });

    if alive_mafia == 0 {
        Some(Team::Town)
    } else if alive_mafia >= alive_town {
        Some(Team::Mafia)
    } else {
        None
    }
}

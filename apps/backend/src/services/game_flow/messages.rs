//! Player-facing text. Presentation proper lives in the chat layer; these
//! are the plain announcements the engine itself sends.

use std::fmt::Write as _;

use crate::domain::ids::PlayerId;
use crate::domain::night::{NightOutcome, NightResolution};
use crate::domain::roles::{Role, Team};
use crate::domain::state::GameState;
use crate::domain::vote::{VoteOutcome, VoteResolution};

pub(super) fn lobby_opened(state: &GameState) -> String {
    let names: Vec<String> = state.players.values().map(|p| p.name.clone()).collect();
    format!(
        "Game #{} is forming with {} players: {}. Everyone ready up to begin.",
        state.game_number,
        names.len(),
        names.join(", ")
    )
}

pub(super) fn role_dm(state: &GameState, player: PlayerId) -> Option<String> {
    let me = state.player(player)?;
    let mut text = format!(
        "Game #{}: your role is **{}**.",
        state.game_number, me.role
    );
    match me.role {
        Role::Mafia => {
            let mates: Vec<String> = state
                .players
                .values()
                .filter(|p| p.role == Role::Mafia && p.id != player)
                .map(|p| p.name.clone())
                .collect();
            if mates.is_empty() {
                text.push_str(" You work alone.");
            } else {
                let _ = write!(text, " Your fellow Mafia: {}.", mates.join(", "));
            }
            text.push_str(" Each night, choose someone to eliminate.");
        }
        Role::Detective => text.push_str(" Each night, investigate one player."),
        Role::Doctor => text.push_str(
            " Each night, protect one player. No protecting the same player twice in a row, and only one self-protect per game.",
        ),
        Role::Civilian => text.push_str(" Find the Mafia and vote them out."),
    }
    Some(text)
}

pub(super) fn night_falls(state: &GameState) -> String {
    format!(
        "Night {} falls. The town sleeps while secret roles act.",
        state.round
    )
}

pub(super) fn night_summary(state: &GameState, res: &NightResolution) -> String {
    match res.outcome {
        NightOutcome::Killed(victim) => format!(
            "Dawn breaks. {} was found dead.",
            state.name_of(victim)
        ),
        NightOutcome::Saved(_) => {
            "Dawn breaks. The Mafia struck, but the Doctor saved their target.".to_string()
        }
        NightOutcome::Quiet => "Dawn breaks. Nobody died last night.".to_string(),
    }
}

pub(super) fn day_opens(state: &GameState, secs: u64) -> String {
    format!(
        "Day {}: discuss for {secs} seconds. Alive: {}.",
        state.round,
        alive_names(state).join(", ")
    )
}

pub(super) fn vote_opens(state: &GameState, secs: u64) -> String {
    format!(
        "Voting is open for {secs} seconds. Vote for one of: {}.",
        alive_names(state).join(", ")
    )
}

pub(super) fn vote_summary(state: &GameState, res: &VoteResolution) -> String {
    match &res.outcome {
        VoteOutcome::Eliminated { player, votes } => format!(
            "The town has spoken: {} is eliminated with {votes} vote(s).",
            state.name_of(*player)
        ),
        VoteOutcome::Tie { candidates, votes } => {
            let names: Vec<String> = candidates.iter().map(|id| state.name_of(*id)).collect();
            format!(
                "Tie between {} at {votes} vote(s) each. Nobody is eliminated.",
                names.join(" and ")
            )
        }
        VoteOutcome::NoVotes => "No votes were cast. Nobody is eliminated.".to_string(),
    }
}

pub(super) fn warning(secs: u64) -> String {
    format!("{secs} seconds left.")
}

/// Winner line plus every player's role.
pub(super) fn reveal(state: &GameState, winner: Option<Team>) -> String {
    let mut text = match winner {
        Some(Team::Town) => format!("Game #{} is over: the Town wins!", state.game_number),
        Some(Team::Mafia) => format!("Game #{} is over: the Mafia wins!", state.game_number),
        None => format!("Game #{} was ended by the host.", state.game_number),
    };
    text.push_str("\nRoles:");
    for p in state.players.values() {
        let status = if p.alive { "alive" } else { "eliminated" };
        let _ = write!(text, "\n- {}: {} ({status})", p.name, p.role);
    }
    text
}

fn alive_names(state: &GameState) -> Vec<String> {
    state.alive_players().map(|p| p.name.clone()).collect()
}

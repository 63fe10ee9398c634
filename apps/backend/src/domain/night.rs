//! Night resolution.

use crate::domain::ids::PlayerId;
use crate::domain::roles::{ActionKind, Role, Team};
use crate::domain::state::GameState;
use crate::domain::win::check_win;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightOutcome {
    Killed(PlayerId),
    /// The kill target was also the protect target.
    Saved(PlayerId),
    Quiet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Investigation {
    pub detective: PlayerId,
    pub target: PlayerId,
    pub is_mafia: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightResolution {
    pub outcome: NightOutcome,
    pub investigation: Option<Investigation>,
    pub winner: Option<Team>,
}

/// Apply the finished night to `state`.
///
/// Kills, saves, doctor bookkeeping, the detective's private note and
/// `last_night_*` are all written here; the caller decides the next phase
/// from `winner`.
pub fn resolve_night(state: &mut GameState) -> NightResolution {
    let kill = state.night.kill_target;
    let protect = state.night.protect_target;

    let outcome = match kill {
        Some(target) if protect == Some(target) => NightOutcome::Saved(target),
        Some(target) => {
            if let Some(victim) = state.player_mut(target) {
                victim.alive = false;
            }
            NightOutcome::Killed(target)
        }
        None => NightOutcome::Quiet,
    };

    for doctor in state
        .players
        .values_mut()
        .filter(|p| p.role == Role::Doctor)
    {
        doctor.protected_last_night = protect.is_some();
        doctor.last_protected_id = protect;
        if protect == Some(doctor.id) {
            doctor.self_protect_used = true;
        }
    }

    let investigation = investigate(state);
    if let Some(found) = &investigation {
        let verdict = if found.is_mafia {
            "is a member of the Mafia"
        } else {
            "is not Mafia"
        };
        let note = format!(
            "Night {}: your investigation shows {} {verdict}.",
            state.round,
            state.name_of(found.target)
        );
        state.note_private(found.detective, note);
    }

    state.last_night_death = match outcome {
        NightOutcome::Killed(victim) => Some(victim),
        NightOutcome::Saved(_) | NightOutcome::Quiet => None,
    };
    state.last_night_saved = matches!(outcome, NightOutcome::Saved(_));

    NightResolution {
        outcome,
        investigation,
        winner: check_win(state),
    }
}

fn investigate(state: &GameState) -> Option<Investigation> {
    let target = state.night.investigate_target?;
    let detective = state
        .night
        .actor_for(ActionKind::Investigate)?;
    let is_mafia = state.player(target)?.role == Role::Mafia;
    Some(Investigation {
        detective,
        target,
        is_mafia,
    })
}

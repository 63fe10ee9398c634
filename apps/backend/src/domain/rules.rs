//! Action legality shared by human submissions and computer players.
//!
//! Computer players only ever see candidates that pass the same checks a
//! human submission is validated against.

use crate::domain::ids::PlayerId;
use crate::domain::roles::{ActionKind, Role};
use crate::domain::state::{
    require_alive_player, require_phase, require_target, GameState, Phase,
};
use crate::errors::domain::{DomainError, ValidationKind};

/// Full validation of a night action submission.
pub fn validate_night_action(
    state: &GameState,
    actor: PlayerId,
    kind: ActionKind,
    target: PlayerId,
) -> Result<(), DomainError> {
    require_phase(state, Phase::Night)?;
    let player = require_alive_player(state, actor)?;
    if player.role.night_action() != Some(kind) {
        return Err(DomainError::validation(
            ValidationKind::WrongRole,
            format!("a {} cannot {kind}", player.role),
        ));
    }
    if state.night.has_received(kind) {
        return Err(DomainError::validation(
            ValidationKind::DuplicateAction,
            format!("tonight's {kind} has already been chosen"),
        ));
    }
    check_night_target(state, actor, kind, target)
}

/// Target rules for `kind`, independent of phase and duplicates.
pub fn check_night_target(
    state: &GameState,
    actor: PlayerId,
    kind: ActionKind,
    target: PlayerId,
) -> Result<(), DomainError> {
    let target_player = require_target(state, target)?;
    match kind {
        ActionKind::Kill => {
            if target == actor {
                return Err(DomainError::validation(
                    ValidationKind::SelfTarget,
                    "you cannot target yourself",
                ));
            }
            if target_player.role == Role::Mafia {
                return Err(DomainError::validation(
                    ValidationKind::TeammateTarget,
                    format!("{} is on your team", target_player.name),
                ));
            }
        }
        ActionKind::Investigate => {
            if target == actor {
                return Err(DomainError::validation(
                    ValidationKind::SelfTarget,
                    "you cannot investigate yourself",
                ));
            }
        }
        ActionKind::Protect => {
            let doctor = require_alive_player(state, actor)?;
            if doctor.last_protected_id == Some(target) {
                return Err(DomainError::validation(
                    ValidationKind::RepeatProtect,
                    format!("you protected {} last night", target_player.name),
                ));
            }
            if target == actor && doctor.self_protect_used {
                return Err(DomainError::validation(
                    ValidationKind::SelfProtectUsed,
                    "you have already protected yourself once",
                ));
            }
        }
    }
    Ok(())
}

/// Every living player `actor` may legally target with `kind`.
pub fn night_candidates(state: &GameState, actor: PlayerId, kind: ActionKind) -> Vec<PlayerId> {
    state
        .alive_players()
        .map(|p| p.id)
        .filter(|id| check_night_target(state, actor, kind, *id).is_ok())
        .collect()
}

pub fn validate_vote(
    state: &GameState,
    voter: PlayerId,
    target: PlayerId,
) -> Result<(), DomainError> {
    require_phase(state, Phase::Vote)?;
    require_alive_player(state, voter)?;
    check_vote_target(state, voter, target)
}

fn check_vote_target(
    state: &GameState,
    voter: PlayerId,
    target: PlayerId,
) -> Result<(), DomainError> {
    require_target(state, target)?;
    if voter == target {
        return Err(DomainError::validation(
            ValidationKind::SelfTarget,
            "you cannot vote for yourself",
        ));
    }
    Ok(())
}

pub fn vote_candidates(state: &GameState, voter: PlayerId) -> Vec<PlayerId> {
    state
        .alive_players()
        .map(|p| p.id)
        .filter(|id| check_vote_target(state, voter, *id).is_ok())
        .collect()
}

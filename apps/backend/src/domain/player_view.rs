//! Player view of game state - what information is visible to a player.
//!
//! This module provides [`DecisionContext`], everything a computer player
//! may see at a decision point, and [`GameStatus`], the public summary
//! returned by the status command. Neither ever exposes another player's
//! role or private notes.

use serde::Serialize;

use crate::domain::ids::PlayerId;
use crate::domain::personality::Personality;
use crate::domain::roles::Role;
use crate::domain::state::{require_player, GameState, Phase};
use crate::errors::domain::DomainError;

/// Information visible to one player at a decision point.
///
/// This is the only input the decision layer receives about a game. It is
/// built under the game lock and then handed to async prompt code, so it
/// owns all of its data.
///
/// ## Bounds
///
/// - [`recent_log`](Self::recent_log) holds at most `max_entries` public
///   entries, newest last, each cut to `max_chars` characters
/// - [`private_notes`](Self::private_notes) only ever contains this
///   player's own notes (for a detective, their investigation results)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionContext {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Role,
    /// `None` for human players.
    pub personality: Option<Personality>,
    pub phase: Phase,
    pub round: u32,

    /// Fellow mafia members still alive. Empty for every other role.
    pub teammates: Vec<String>,

    pub alive: Vec<String>,
    pub eliminated: Vec<String>,

    /// Capped slice of the public log, formatted as `[round phase] text`.
    pub recent_log: Vec<String>,

    pub private_notes: Vec<String>,
}

impl DecisionContext {
    pub fn for_player(
        state: &GameState,
        player_id: PlayerId,
        max_entries: usize,
        max_chars: usize,
    ) -> Result<Self, DomainError> {
        let me = require_player(state, player_id)?;

        let teammates = if me.role == Role::Mafia {
            state
                .alive_players()
                .filter(|p| p.role == Role::Mafia && p.id != player_id)
                .map(|p| p.name.clone())
                .collect()
        } else {
            Vec::new()
        };

        let recent_log = state
            .game_log
            .recent(max_entries)
            .map(|e| {
                let line = format!("[{} {}] {}", e.round, e.phase, e.text);
                truncate_chars(&line, max_chars)
            })
            .collect();

        Ok(Self {
            player_id,
            name: me.name.clone(),
            role: me.role,
            personality: me.personality,
            phase: state.phase,
            round: state.round,
            teammates,
            alive: state.alive_players().map(|p| p.name.clone()).collect(),
            eliminated: state.dead_players().map(|p| p.name.clone()).collect(),
            recent_log,
            private_notes: state.private_notes(player_id).to_vec(),
        })
    }
}

/// Public summary of a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStatus {
    pub game_number: u64,
    pub phase: Phase,
    pub round: u32,
    pub alive: Vec<String>,
    pub eliminated: Vec<String>,
    /// Night only: how many action kinds are in, never which.
    pub night_actions_received: usize,
    pub night_actions_required: usize,
    pub votes_cast: usize,
    pub recent_log: Vec<String>,
}

impl GameStatus {
    pub fn of(state: &GameState, max_entries: usize) -> Self {
        let (received, required) = if state.phase == Phase::Night {
            (
                state.night.actions_received().len(),
                state.required_night_actions().len(),
            )
        } else {
            (0, 0)
        };
        Self {
            game_number: state.game_number,
            phase: state.phase,
            round: state.round,
            alive: state.alive_players().map(|p| p.name.clone()).collect(),
            eliminated: state.dead_players().map(|p| p.name.clone()).collect(),
            night_actions_received: received,
            night_actions_required: required,
            votes_cast: if state.phase == Phase::Vote {
                state.vote.vote_count()
            } else {
                0
            },
            recent_log: state
                .game_log
                .recent(max_entries)
                .map(|e| e.text.clone())
                .collect(),
        }
    }
}

/// Cut `text` to at most `max` characters, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roles::ActionKind;
    use crate::domain::test_state_helpers::{game_with_roles, MAFIA_7};

    #[test]
    fn mafia_sees_living_teammates_only() {
        // MAFIA_7: ids 1 and 2 are mafia
        let mut state = game_with_roles(&MAFIA_7);
        let ctx = DecisionContext::for_player(&state, PlayerId(1), 10, 200).unwrap();
        assert_eq!(ctx.teammates, vec!["P2".to_string()]);

        state.player_mut(PlayerId(2)).unwrap().alive = false;
        let ctx = DecisionContext::for_player(&state, PlayerId(1), 10, 200).unwrap();
        assert!(ctx.teammates.is_empty());
        assert_eq!(ctx.eliminated, vec!["P2".to_string()]);
    }

    #[test]
    fn town_sees_no_teammates_and_only_own_notes() {
        let mut state = game_with_roles(&MAFIA_7);
        state.note_private(PlayerId(3), "secret for detective");
        let ctx = DecisionContext::for_player(&state, PlayerId(4), 10, 200).unwrap();
        assert!(ctx.teammates.is_empty());
        assert!(ctx.private_notes.is_empty());

        let ctx = DecisionContext::for_player(&state, PlayerId(3), 10, 200).unwrap();
        assert_eq!(ctx.private_notes, vec!["secret for detective".to_string()]);
    }

    #[test]
    fn recent_log_is_capped_and_truncated() {
        let mut state = game_with_roles(&MAFIA_7);
        for i in 0..20 {
            state.log_public(format!("message number {i} with some padding"));
        }
        let ctx = DecisionContext::for_player(&state, PlayerId(4), 5, 12).unwrap();
        assert_eq!(ctx.recent_log.len(), 5);
        assert!(ctx.recent_log.iter().all(|l| l.chars().count() <= 12));
    }

    #[test]
    fn unknown_player_is_rejected() {
        let state = game_with_roles(&MAFIA_7);
        assert!(DecisionContext::for_player(&state, PlayerId(99), 5, 100).is_err());
    }

    #[test]
    fn status_counts_night_actions_without_naming_them() {
        let mut state = game_with_roles(&MAFIA_7);
        state.enter_phase(Phase::Night);
        state
            .night
            .mark_received(ActionKind::Kill, PlayerId(1), PlayerId(5));
        let status = GameStatus::of(&state, 10);
        assert_eq!(status.night_actions_received, 1);
        assert_eq!(status.night_actions_required, 3);
        assert_eq!(status.votes_cast, 0);
        assert_eq!(status.alive.len(), 7);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}

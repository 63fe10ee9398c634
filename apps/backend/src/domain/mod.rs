//! Domain layer: pure game logic types and helpers.

pub mod game_transition;
pub mod ids;
pub mod night;
pub mod personality;
pub mod player_view;
pub mod roles;
pub mod rules;
pub mod state;
pub mod vote;
pub mod win;

#[cfg(test)]
pub(crate) mod test_state_helpers;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_roles;
#[cfg(test)]
mod tests_props_vote;
#[cfg(test)]
mod tests_props_win;

// Re-exports for ergonomics
pub use game_transition::{GameTransition, TransitionEvent};
pub use ids::{ChannelId, GuildId, MessageId, PlayerId};
pub use night::{resolve_night, NightOutcome, NightResolution};
pub use personality::Personality;
pub use player_view::{DecisionContext, GameStatus};
pub use roles::{assign_roles, balance_for, ActionKind, Role, Team, MAX_PLAYERS, MIN_PLAYERS};
pub use state::{GameState, Participant, Phase, PlayerState};
pub use vote::{resolve_vote, VoteOutcome, VoteResolution};
pub use win::check_win;

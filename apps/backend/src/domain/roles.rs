//! Roles, teams and the role assigner.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;
use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Mafia,
    Detective,
    Doctor,
    Civilian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Town,
    Mafia,
}

/// Secret actions taken during the night. At most one of each kind is
/// recorded per night regardless of how many players could perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    Kill,
    Protect,
    Investigate,
}

impl Role {
    pub const fn team(self) -> Team {
        match self {
            Role::Mafia => Team::Mafia,
            Role::Detective | Role::Doctor | Role::Civilian => Team::Town,
        }
    }

    /// The night action this role performs, if any.
    pub const fn night_action(self) -> Option<ActionKind> {
        match self {
            Role::Mafia => Some(ActionKind::Kill),
            Role::Doctor => Some(ActionKind::Protect),
            Role::Detective => Some(ActionKind::Investigate),
            Role::Civilian => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Mafia => "Mafia",
            Role::Detective => "Detective",
            Role::Doctor => "Doctor",
            Role::Civilian => "Civilian",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Town => f.write_str("Town"),
            Team::Mafia => f.write_str("Mafia"),
        }
    }
}

impl ActionKind {
    pub const fn role(self) -> Role {
        match self {
            ActionKind::Kill => Role::Mafia,
            ActionKind::Protect => Role::Doctor,
            ActionKind::Investigate => Role::Detective,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Kill => f.write_str("kill"),
            ActionKind::Protect => f.write_str("protect"),
            ActionKind::Investigate => f.write_str("investigate"),
        }
    }
}

/// Role counts for a given table size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBalance {
    pub mafia: usize,
    pub detective: usize,
    pub doctor: usize,
    pub civilian: usize,
}

impl RoleBalance {
    pub const fn total(&self) -> usize {
        self.mafia + self.detective + self.doctor + self.civilian
    }

    pub const fn count_of(&self, role: Role) -> usize {
        match role {
            Role::Mafia => self.mafia,
            Role::Detective => self.detective,
            Role::Doctor => self.doctor,
            Role::Civilian => self.civilian,
        }
    }

    fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(self.total());
        roles.extend(std::iter::repeat(Role::Mafia).take(self.mafia));
        roles.extend(std::iter::repeat(Role::Detective).take(self.detective));
        roles.extend(std::iter::repeat(Role::Doctor).take(self.doctor));
        roles.extend(std::iter::repeat(Role::Civilian).take(self.civilian));
        roles
    }
}

/// Balance table keyed by player count.
pub const fn balance_for(player_count: usize) -> Option<RoleBalance> {
    let balance = match player_count {
        5 => RoleBalance {
            mafia: 1,
            detective: 1,
            doctor: 0,
            civilian: 3,
        },
        6 => RoleBalance {
            mafia: 1,
            detective: 1,
            doctor: 1,
            civilian: 3,
        },
        7 => RoleBalance {
            mafia: 2,
            detective: 1,
            doctor: 1,
            civilian: 3,
        },
        8 => RoleBalance {
            mafia: 2,
            detective: 1,
            doctor: 1,
            civilian: 4,
        },
        _ => return None,
    };
    Some(balance)
}

/// Assign a role to every player.
///
/// Builds the role multiset from the balance table, Fisher–Yates shuffles it
/// in place and zips it onto `player_ids` in input order. Fails for counts
/// outside `MIN_PLAYERS..=MAX_PLAYERS` or duplicate identities, both of
/// which are caller bugs.
pub fn assign_roles<R: Rng + ?Sized>(
    player_ids: &[PlayerId],
    rng: &mut R,
) -> Result<BTreeMap<PlayerId, Role>, DomainError> {
    let balance = balance_for(player_ids.len()).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidPlayerCount,
            format!(
                "a game needs {MIN_PLAYERS}-{MAX_PLAYERS} players, got {}",
                player_ids.len()
            ),
        )
    })?;

    let unique: BTreeSet<PlayerId> = player_ids.iter().copied().collect();
    if unique.len() != player_ids.len() {
        return Err(DomainError::validation(
            ValidationKind::DuplicateParticipant,
            "each player may only be seated once",
        ));
    }

    let mut roles = balance.roles();
    roles.shuffle(rng);

    Ok(player_ids.iter().copied().zip(roles).collect())
}

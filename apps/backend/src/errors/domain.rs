//! Domain-level error type used across the engine.
//!
//! This error type is transport-agnostic. Command entry points return
//! `Result<T, DomainError>` so the calling chat layer can render a specific
//! rejection to the acting player; `From<DomainError> for AppError` lifts it
//! into the crate-level error where needed.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Reasons an action submission or command is rejected.
///
/// Rejections never mutate game state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// Command arrived in a phase that does not accept it
    PhaseMismatch,
    /// Actor's role cannot perform this action
    WrongRole,
    /// Actor has been eliminated
    ActorDead,
    /// Actor is not a participant of the game
    NotInGame,
    /// Only the host may issue this command
    NotHost,
    SelfTarget,
    /// Mafia cannot target a living teammate
    TeammateTarget,
    UnknownTarget,
    TargetDead,
    /// Action kind already recorded this night
    DuplicateAction,
    /// Doctor cannot protect the same player on consecutive nights
    RepeatProtect,
    /// Doctor has already protected themselves once this game
    SelfProtectUsed,
    NothingToRetract,
    /// Resolution of the current phase has already begun
    ResolutionInProgress,
    /// Player count outside the supported 5..=8 range
    InvalidPlayerCount,
    DuplicateParticipant,
    AlreadyReady,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Player,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A game is already running in this channel
    GameAlreadyRunning,
    /// Secret channel is already claimed by another game
    SecretChannelTaken,
    Other(String),
}

/// Infra error kinds. Provider and transport failures never reach a
/// command result, so only engine-internal faults land here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or game rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// The validation kind, if this is a validation rejection.
    pub fn validation_kind(&self) -> Option<&ValidationKind> {
        match self {
            DomainError::Validation(kind, _) => Some(kind),
            _ => None,
        }
    }
}

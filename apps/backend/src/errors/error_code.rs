//! Error codes surfaced to the command layer.
//!
//! Every rejection the engine can produce maps to exactly one code here.
//! The chat layer renders localized text keyed on these strings; never pass
//! ad-hoc strings as codes.

use core::fmt;

use super::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind};

/// Centralized error codes for the engine's command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Phase and identity checks
    /// Command not accepted in the current phase
    PhaseMismatch,
    /// Actor's role cannot perform the action
    WrongRole,
    /// Actor has been eliminated
    ActorDead,
    /// Actor is not part of the game
    NotInGame,
    /// Only the host may do this
    NotHost,

    // Target checks
    SelfTarget,
    TeammateTarget,
    UnknownTarget,
    TargetDead,

    // Night action bookkeeping
    DuplicateAction,
    RepeatProtect,
    SelfProtectUsed,
    NothingToRetract,
    ResolutionInProgress,

    // Lobby
    InvalidPlayerCount,
    DuplicateParticipant,
    AlreadyReady,
    /// General validation error
    ValidationError,

    // Resource Not Found
    GameNotFound,
    PlayerNotFound,
    NotFound,

    // Conflicts
    GameAlreadyRunning,
    SecretChannelTaken,
    Conflict,

    // System Errors
    ProviderError,
    TransportError,
    ConfigError,
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::WrongRole => "WRONG_ROLE",
            Self::ActorDead => "ACTOR_DEAD",
            Self::NotInGame => "NOT_IN_GAME",
            Self::NotHost => "NOT_HOST",

            Self::SelfTarget => "SELF_TARGET",
            Self::TeammateTarget => "TEAMMATE_TARGET",
            Self::UnknownTarget => "UNKNOWN_TARGET",
            Self::TargetDead => "TARGET_DEAD",

            Self::DuplicateAction => "DUPLICATE_ACTION",
            Self::RepeatProtect => "REPEAT_PROTECT",
            Self::SelfProtectUsed => "SELF_PROTECT_USED",
            Self::NothingToRetract => "NOTHING_TO_RETRACT",
            Self::ResolutionInProgress => "RESOLUTION_IN_PROGRESS",

            Self::InvalidPlayerCount => "INVALID_PLAYER_COUNT",
            Self::DuplicateParticipant => "DUPLICATE_PARTICIPANT",
            Self::AlreadyReady => "ALREADY_READY",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::GameAlreadyRunning => "GAME_ALREADY_RUNNING",
            Self::SecretChannelTaken => "SECRET_CHANNEL_TAKEN",
            Self::Conflict => "CONFLICT",

            Self::ProviderError => "PROVIDER_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&ValidationKind> for ErrorCode {
    fn from(kind: &ValidationKind) -> Self {
        match kind {
            ValidationKind::PhaseMismatch => Self::PhaseMismatch,
            ValidationKind::WrongRole => Self::WrongRole,
            ValidationKind::ActorDead => Self::ActorDead,
            ValidationKind::NotInGame => Self::NotInGame,
            ValidationKind::NotHost => Self::NotHost,
            ValidationKind::SelfTarget => Self::SelfTarget,
            ValidationKind::TeammateTarget => Self::TeammateTarget,
            ValidationKind::UnknownTarget => Self::UnknownTarget,
            ValidationKind::TargetDead => Self::TargetDead,
            ValidationKind::DuplicateAction => Self::DuplicateAction,
            ValidationKind::RepeatProtect => Self::RepeatProtect,
            ValidationKind::SelfProtectUsed => Self::SelfProtectUsed,
            ValidationKind::NothingToRetract => Self::NothingToRetract,
            ValidationKind::ResolutionInProgress => Self::ResolutionInProgress,
            ValidationKind::InvalidPlayerCount => Self::InvalidPlayerCount,
            ValidationKind::DuplicateParticipant => Self::DuplicateParticipant,
            ValidationKind::AlreadyReady => Self::AlreadyReady,
            ValidationKind::Other(_) => Self::ValidationError,
        }
    }
}

impl From<&DomainError> for ErrorCode {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Validation(kind, _) => kind.into(),
            DomainError::NotFound(NotFoundKind::Game, _) => Self::GameNotFound,
            DomainError::NotFound(NotFoundKind::Player, _) => Self::PlayerNotFound,
            DomainError::NotFound(NotFoundKind::Other(_), _) => Self::NotFound,
            DomainError::Conflict(ConflictKind::GameAlreadyRunning, _) => Self::GameAlreadyRunning,
            DomainError::Conflict(ConflictKind::SecretChannelTaken, _) => Self::SecretChannelTaken,
            DomainError::Conflict(ConflictKind::Other(_), _) => Self::Conflict,
            DomainError::Infra(InfraErrorKind::Other(_), _) => Self::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::PhaseMismatch.as_str(), "PHASE_MISMATCH");
        assert_eq!(ErrorCode::RepeatProtect.as_str(), "REPEAT_PROTECT");
        assert_eq!(ErrorCode::SelfProtectUsed.as_str(), "SELF_PROTECT_USED");
        assert_eq!(ErrorCode::GameNotFound.as_str(), "GAME_NOT_FOUND");
        assert_eq!(
            ErrorCode::ResolutionInProgress.as_str(),
            "RESOLUTION_IN_PROGRESS"
        );
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::NotHost), "NOT_HOST");
        assert_eq!(format!("{}", ErrorCode::TargetDead), "TARGET_DEAD");
    }
}

use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::errors::ErrorCode;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Rejected: {detail}")]
    Rejected { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Provider error: {detail}")]
    Provider { detail: String },
    #[error("Transport error: {detail}")]
    Transport { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Error code for the command layer to render.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Rejected { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Provider { .. } => ErrorCode::ProviderError,
            AppError::Transport { .. } => ErrorCode::TransportError,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Human-readable detail, without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Rejected { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Provider { detail }
            | AppError::Transport { detail }
            | AppError::Config { detail }
            | AppError::Internal { detail } => detail,
        }
    }

    /// True for errors caused by the caller's input rather than the system.
    ///
    /// Rejections are shown to the acting player only; everything else is
    /// logged and hidden.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::Rejected { .. } | AppError::NotFound { .. } | AppError::Conflict { .. }
        )
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn provider(detail: impl Into<String>) -> Self {
        Self::Provider {
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let code = ErrorCode::from(&err);
        match err {
            DomainError::Validation(_, detail) => AppError::Rejected { code, detail },
            DomainError::NotFound(_, detail) => AppError::NotFound { code, detail },
            DomainError::Conflict(_, detail) => AppError::Conflict { code, detail },
            DomainError::Infra(InfraErrorKind::Other(_), detail) => AppError::Internal { detail },
        }
    }
}

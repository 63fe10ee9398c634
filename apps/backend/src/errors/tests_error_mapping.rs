// Unit tests for error mapping - pure domain logic, no transport involved
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_kinds_to_specific_codes() {
    let de = DomainError::validation(ValidationKind::RepeatProtect, "same target twice");
    assert_eq!(ErrorCode::from(&de), ErrorCode::RepeatProtect);

    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::RepeatProtect);
    assert!(app.is_rejection());
}

#[test]
fn maps_other_validation_to_generic_code() {
    let de = DomainError::validation_other("something odd");
    assert_eq!(ErrorCode::from(&de), ErrorCode::ValidationError);
}

#[test]
fn maps_not_found_and_conflicts() {
    let nf = DomainError::not_found(NotFoundKind::Game, "no game here");
    assert_eq!(ErrorCode::from(&nf).as_str(), "GAME_NOT_FOUND");

    let running = DomainError::conflict(ConflictKind::GameAlreadyRunning, "busy");
    let app: AppError = running.into();
    assert_eq!(app.code().as_str(), "GAME_ALREADY_RUNNING");
    assert!(app.is_rejection());
}

#[test]
fn maps_infra_to_system_errors() {
    let t = DomainError::infra(InfraErrorKind::Other("lock poisoned".into()), "lock poisoned");
    let app: AppError = t.into();
    assert_eq!(app.code(), ErrorCode::Internal);
    assert!(!app.is_rejection());

    let provider = AppError::provider("status 500");
    assert_eq!(provider.code(), ErrorCode::ProviderError);
    assert_eq!(provider.detail(), "status 500");
    assert!(!provider.is_rejection());
}

use thiserror::Error;

use crate::auth::AuthError;
use crate::domain::{AccountId, CategoryId, ExpenseId, TagId, WalletId};

use super::FieldError;

/// Failures surfaced by the hierarchy service. Nothing is retried
/// internally; the transport layer decides what each variant becomes
/// (login redirect, error page, field errors).
#[derive(Error, Debug)]
pub enum AppError {
    /// No valid principal. Transports typically redirect to login.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated, but not the owner of the account. Deliberately
    /// carries no account details beyond the id the caller already sent.
    #[error("not authorized for account {0}")]
    Forbidden(AccountId),

    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("tag not found: {0}")]
    TagNotFound(TagId),

    #[error("expense category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// One or more field constraints violated; carries field-level detail.
    #[error("validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// A resource path without a parseable account id. This is a
    /// routing/config defect, not a user-facing rejection.
    #[error("malformed resource path: {0}")]
    MalformedResourcePath(String),

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MalformedResourcePath(path) => AppError::MalformedResourcePath(path),
            AuthError::Database(err) => AppError::Database(err),
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

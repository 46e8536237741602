//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] aoeyaeng_core::EmailError),

    /// No member is registered with this email.
    #[error("email not found")]
    EmailNotFound,

    /// The password doesn't match the stored hash.
    #[error("incorrect password")]
    IncorrectPassword,

    /// Email already registered.
    #[error("email already in use")]
    EmailInUse,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Registration field failed validation.
    #[error("invalid registration: {0}")]
    InvalidField(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Sending the reset email failed.
    #[error("email delivery failed: {0}")]
    Email(#[from] EmailError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

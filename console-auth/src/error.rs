//! Typed authentication failures.
//!
//! Raw provider errors are classified into the closed [`AuthErrorKind`]
//! taxonomy at the boundary; downstream logic branches only on the kind,
//! never on provider message strings.

use thiserror::Error;

/// Classified cause of a failed authentication attempt.
///
/// Exactly one kind is attached to every failure; the kind decides the next
/// UI state deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    UserNotConfirmed,
    TenantMismatch,
    NoTenantsFound,
    SessionTimeout,
    NetworkOrUnknown,
}

impl AuthErrorKind {
    /// Deterministic user-facing message for this failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentials => "Incorrect email or password.",
            AuthErrorKind::UserNotConfirmed => {
                "Your email address has not been verified yet. Redirecting to verification..."
            }
            AuthErrorKind::TenantMismatch => {
                "Your account does not belong to the selected workspace."
            }
            AuthErrorKind::NoTenantsFound => "No account found for this email address.",
            AuthErrorKind::SessionTimeout => {
                "Sign-in took too long to complete. Please try again."
            }
            AuthErrorKind::NetworkOrUnknown => {
                "Something went wrong while signing you in. Please try again."
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("{}", kind.user_message())]
pub struct AuthError {
    pub kind: AuthErrorKind,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(kind: AuthErrorKind, source: impl Into<anyhow::Error>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }
}

impl From<AuthErrorKind> for AuthError {
    fn from(kind: AuthErrorKind) -> Self {
        AuthError::new(kind)
    }
}

/// Map a provider error identifier to the closed taxonomy.
///
/// Identifiers are the provider's stable error codes (`err.name`/`err.code`
/// shapes), not message text.
pub fn classify_provider_error(code: &str) -> AuthErrorKind {
    match code {
        "NotAuthorizedException" | "UserNotFoundException" => AuthErrorKind::InvalidCredentials,
        "UserNotConfirmedException" => AuthErrorKind::UserNotConfirmed,
        "UserLambdaValidationException" => AuthErrorKind::TenantMismatch,
        "NetworkError" | "TimeoutError" => AuthErrorKind::NetworkOrUnknown,
        _ => AuthErrorKind::NetworkOrUnknown,
    }
}

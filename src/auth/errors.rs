//! # Auth Errors

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Reasons a caller is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing bearer token")]
    MissingToken,

    /// Header present but not `Bearer <token>`, or token not decodable
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token signature")]
    InvalidSignature,

    /// Issuer or audience does not match this service
    #[error("Token not issued for this service")]
    WrongAudience,
}

impl AuthError {
    /// Machine-readable code for response bodies
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::MalformedToken => "malformed_token",
            Self::TokenExpired => "token_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::WrongAudience => "wrong_audience",
        }
    }
}

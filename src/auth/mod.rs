//! # Authentication
//!
//! Caller identity is established by the identity provider; this module
//! only checks the bearer token each protected route requires.

mod errors;
mod jwt;

pub use jwt::{Identity, TokenValidator};

#[cfg(test)]
pub use jwt::test_tokens;

use std::time::Duration;

use meet_protocol::{room::ParticipantIdentity, tokens::AccessTokenClaims};

#[cfg(feature = "jwt-secure")]
pub mod jwt;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("sign token error: {message}")]
    Sign { message: String },
    #[error("api secret must be at least {min_len} bytes")]
    WeakSecret { min_len: usize },
}

/// A token that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub api_key: String,
    pub identity: ParticipantIdentity,
    pub claims: AccessTokenClaims,
    /// Seconds since unix epoch.
    pub expires_at: u64,
}

/// This interface is for minting access tokens which the media platform accepts
pub trait AccessTokenIssuer {
    fn issue_token(&self, identity: &ParticipantIdentity, claims: AccessTokenClaims, ttl: Duration) -> Result<String, TokenError>;
}

/// This interface is for checking tokens issued by an [`AccessTokenIssuer`] with the same key
pub trait AccessTokenVerifier {
    fn verify_token(&self, token: &str) -> Option<VerifiedToken>;
}

/// A single shared password guarding one of the HTTP flows.
#[derive(Clone)]
pub struct SharedPassword {
    password: String,
}

impl SharedPassword {
    pub fn new(password: &str) -> Self {
        Self { password: password.to_owned() }
    }

    pub fn validate(&self, candidate: &str) -> bool {
        self.password.eq(candidate)
    }
}

impl std::fmt::Debug for SharedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedPassword(***)")
    }
}

use std::time::Duration;

use crate::{AccessTokenIssuer, AccessTokenVerifier, TokenError, VerifiedToken};
use jwt_simple::prelude::{Claims, Clock, Duration as JwtDuration, HS256Key, MACLike, VerificationOptions};
use meet_protocol::{room::ParticipantIdentity, tokens::AccessTokenClaims};

/// HS256 keys shorter than this are refused when signing.
pub const MIN_SECRET_LEN: usize = 12;

/// HS256 signer keyed by the platform API key/secret pair.
///
/// Tokens carry the API key as issuer and the participant identity as both subject and jwt id,
/// which is the layout the media platform verifies at connection time.
#[derive(Clone)]
pub struct AccessTokenJwt {
    api_key: String,
    key: HS256Key,
}

impl AccessTokenJwt {
    pub fn new(api_key: &str, api_secret: &str) -> Result<Self, TokenError> {
        if api_secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret { min_len: MIN_SECRET_LEN });
        }
        Ok(Self {
            api_key: api_key.to_owned(),
            key: HS256Key::from_bytes(api_secret.as_bytes()),
        })
    }
}

impl AccessTokenIssuer for AccessTokenJwt {
    fn issue_token(&self, identity: &ParticipantIdentity, claims: AccessTokenClaims, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims::with_custom_claims(claims, JwtDuration::from_secs(ttl.as_secs()))
            .with_issuer(&self.api_key)
            .with_subject(identity.as_str())
            .with_jwt_id(identity.as_str());
        self.key.authenticate(claims).map_err(|e| {
            log::error!("[AccessTokenJwt] sign token for {identity} error {e:?}");
            TokenError::Sign { message: e.to_string() }
        })
    }
}

impl AccessTokenVerifier for AccessTokenJwt {
    fn verify_token(&self, token: &str) -> Option<VerifiedToken> {
        let options = VerificationOptions {
            time_tolerance: Some(JwtDuration::from_secs(0)),
            ..Default::default()
        };
        let claims = self.key.verify_token::<AccessTokenClaims>(token, Some(options)).ok()?;
        let expires_at = claims.expires_at?;
        let now = Clock::now_since_epoch();
        if now >= expires_at {
            return None;
        }
        let issuer = claims.issuer?;
        if issuer != self.api_key {
            return None;
        }
        Some(VerifiedToken {
            api_key: issuer,
            identity: claims.subject?.into(),
            claims: claims.custom,
            expires_at: expires_at.as_secs(),
        })
    }
}

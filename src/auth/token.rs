// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed bearer token issuance and validation (HS256 JWT).
//!
//! Tokens are stateless: validity is decided by signature and expiry alone.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims written into issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: stringified user id
    pub sub: String,
    pub email: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

/// Claims as read back from a presented token.
///
/// `sub` and `email` stay untyped so a token with the right signature but
/// the wrong claim shapes is rejected by us rather than by serde.
#[derive(Debug, Deserialize)]
struct PresentedClaims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    email: Option<serde_json::Value>,
}

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub user_id: u64,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("token payload is invalid: {0}")]
    InvalidPayload(&'static str),
}

/// Creates and validates signed, time-bound tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer; an empty secret is refused.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user_id: u64, email: &str) -> Result<String, TokenError> {
        let now = now_secs();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs() as i64),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims with this issuer's key.
    pub(crate) fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Validate a token and return its payload.
    ///
    /// Rejects bad signatures, expired tokens, a non-string `sub` or `email`
    /// and a `sub` that is not a positive integer.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let data = jsonwebtoken::decode::<PresentedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Rejected(e.to_string()))?;
        let claims = data.claims;

        let sub = match claims.sub {
            Some(serde_json::Value::String(sub)) => sub,
            _ => return Err(TokenError::InvalidPayload("subject is not a string")),
        };
        let email = match claims.email {
            Some(serde_json::Value::String(email)) => email,
            _ => return Err(TokenError::InvalidPayload("email is not a string")),
        };

        let user_id = sub
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(TokenError::InvalidPayload("subject is not a positive integer"))?;

        Ok(TokenPayload { user_id, email })
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret-key-for-testing", Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let issuer = issuer();
        let token = issuer.issue(42, "alice@example.com").unwrap();

        let payload = issuer.verify(&token).unwrap();
        assert_eq!(
            payload,
            TokenPayload {
                user_id: 42,
                email: "alice@example.com".to_string()
            }
        );
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            TokenIssuer::new("", Duration::from_secs(60)),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let other = TokenIssuer::new("different-secret", Duration::from_secs(3600)).unwrap();
        let token = issuer().issue(1, "a@example.com").unwrap();
        assert!(matches!(other.verify(&token), Err(TokenError::Rejected(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer();
        let now = now_secs();
        let token = issuer
            .sign(&json!({ "sub": "1", "email": "a@example.com", "iat": now - 120, "exp": now - 60 }))
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Rejected(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(issuer().verify("not-a-valid-token").is_err());
    }

    #[test]
    fn numeric_subject_is_rejected() {
        let issuer = issuer();
        let exp = now_secs() + 600;
        let token = issuer
            .sign(&json!({ "sub": 1, "email": "a@example.com", "exp": exp }))
            .unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn non_integer_subject_is_rejected() {
        let issuer = issuer();
        let exp = now_secs() + 600;
        for sub in ["abc", "0", "-4", "1.5"] {
            let token = issuer
                .sign(&json!({ "sub": sub, "email": "a@example.com", "exp": exp }))
                .unwrap();
            assert!(
                matches!(issuer.verify(&token), Err(TokenError::InvalidPayload(_))),
                "subject {sub:?} should be rejected"
            );
        }
    }

    #[test]
    fn missing_email_is_rejected() {
        let issuer = issuer();
        let exp = now_secs() + 600;
        let token = issuer.sign(&json!({ "sub": "3", "exp": exp })).unwrap();
        assert!(matches!(
            issuer.verify(&token),
            Err(TokenError::InvalidPayload(_))
        ));
    }
}

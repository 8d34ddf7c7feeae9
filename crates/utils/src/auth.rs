//! Bearer-token verification.
//!
//! Token issuance lives elsewhere; this module only validates signed HS256
//! tokens and exposes the authenticated principal. Handlers treat it as an
//! opaque gate: a request either resolves to an [`AuthUser`] or fails with
//! [`AuthError`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims carried by the coaching platform's session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: Uuid,
    /// Subscription tier, e.g. "transformatie". Absent for free accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Expiry, seconds since epoch.
    pub exp: u64,
}

/// The authenticated principal for a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub tier: Option<String>,
}

impl AuthUser {
    /// Tier gate used by tools that require a paid subscription.
    pub fn has_tier(&self, required: &str) -> bool {
        self.tier.as_deref() == Some(required)
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a raw token string.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(AuthUser {
            id: data.claims.sub,
            tier: data.claims.tier,
        })
    }

    /// Verify the value of an `Authorization` header, if present.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<AuthUser, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    const SECRET: &str = "test-secret";

    fn token_for(claims: &Claims) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn claims(tier: Option<&str>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            tier: tier.map(String::from),
            exp: (chrono::Utc::now().timestamp() as u64) + 3600,
        }
    }

    #[test]
    fn verifies_valid_bearer_header() {
        let claims = claims(Some("transformatie"));
        let header = format!("Bearer {}", token_for(&claims));
        let verifier = TokenVerifier::new(SECRET);

        let user = verifier.verify_bearer(Some(&header)).unwrap();
        assert_eq!(user.id, claims.sub);
        assert!(user.has_tier("transformatie"));
    }

    #[test]
    fn rejects_missing_header() {
        let verifier = TokenVerifier::new(SECRET);
        assert!(matches!(
            verifier.verify_bearer(None),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = format!("Bearer {}", token_for(&claims(None)));
        let verifier = TokenVerifier::new("other-secret");
        assert!(matches!(
            verifier.verify_bearer(Some(&header)),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn tier_gate_defaults_closed() {
        let claims = claims(None);
        let header = format!("Bearer {}", token_for(&claims));
        let user = TokenVerifier::new(SECRET)
            .verify_bearer(Some(&header))
            .unwrap();
        assert!(!user.has_tier("transformatie"));
    }
}

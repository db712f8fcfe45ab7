//! Access token inspection
//!
//! The client never holds the signing secret, so tokens are decoded without
//! signature validation. Only the expiry is trusted, to decide whether a
//! persisted session needs a refresh before use.

use common::{LuminError, LuminResult};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Seconds before the real expiry at which a token counts as expired
pub const EXPIRY_LEEWAY_SECS: u64 = 60;

/// Claims of an identity service access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: Uuid,
    /// Expiration time
    pub exp: u64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the claims of `token` without verifying its signature
pub fn decode_claims(token: &str) -> LuminResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| LuminError::InvalidResponseShape(format!("access token: {}", e)))?;
    Ok(data.claims)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Whether `token` is expired or expires within the leeway
///
/// Undecodable tokens count as expired.
pub fn is_expired(token: &str) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp <= now_secs() + EXPIRY_LEEWAY_SECS,
        Err(_) => true,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    /// Signed token for `sub` expiring `ttl` seconds from now
    pub(crate) fn token_for(sub: Uuid, ttl: i64) -> String {
        let exp = now_secs() as i64 + ttl;
        let claims = json!({
            "sub": sub,
            "exp": exp,
            "aud": "authenticated",
            "role": "authenticated",
            "email": "andrew@example.com",
        });
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_claims_decode_without_secret() {
        let sub = Uuid::new_v4();
        let claims = decode_claims(&token_for(sub, 3600)).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email.as_deref(), Some("andrew@example.com"));
    }

    #[test]
    fn test_expiry_with_leeway() {
        let sub = Uuid::new_v4();
        assert!(!is_expired(&token_for(sub, 3600)));
        assert!(is_expired(&token_for(sub, 30)));
        assert!(is_expired(&token_for(sub, -10)));
    }

    #[test]
    fn test_garbage_is_expired() {
        assert!(is_expired("not-a-jwt"));
        assert!(matches!(
            decode_claims("a.b.c"),
            Err(LuminError::InvalidResponseShape(_))
        ));
    }
}

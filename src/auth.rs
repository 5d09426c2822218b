//! Password checks and session tokens.
//!
//! Registered passwords are stored as argon2 PHC strings when hashing is
//! enabled. Seeded users and users created through the generic endpoint keep
//! whatever `password` they were given, so verification falls back to an
//! exact plaintext comparison for values that are not argon2 PHC hashes.

use crate::document::UserView;
use crate::error::{Error, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Credential settings for a [`RecordStore`](crate::RecordStore).
#[derive(Clone)]
pub struct AuthConfig {
    /// Hash passwords on registration (default: `true`).
    pub hash_passwords: bool,
    /// Secret for HS256 session tokens. Without one, logins get a
    /// placeholder token.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued JWTs, in hours.
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            hash_passwords: true,
            jwt_secret: None,
            token_ttl_hours: 12,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("hash_passwords", &self.hash_passwords)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Value to store in a new user's `password` field.
pub fn store_password(config: &AuthConfig, plain: &str) -> Result<String> {
    if !config.hash_passwords {
        return Ok(plain.to_owned());
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Credential(e.to_string()))
}

/// `true` if `supplied` matches the stored `password` value.
pub fn verify_password(stored: &str, supplied: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) if is_argon2(&parsed) => Argon2::default()
            .verify_password(supplied.as_bytes(), &parsed)
            .is_ok(),
        _ => stored == supplied,
    }
}

fn is_argon2(hash: &PasswordHash<'_>) -> bool {
    matches!(hash.algorithm.as_str(), "argon2id" | "argon2i" | "argon2d")
}

/// Claims carried by a signed session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// User email, if the record has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// User role, if the record has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues (and, for JWTs, verifies) session tokens.
#[derive(Clone)]
pub enum TokenIssuer {
    /// `fake-jwt-token-<id>`: unique per user, carries no proof of anything.
    Placeholder,
    /// HS256 JWT.
    Jwt {
        /// Signing secret.
        secret: String,
        /// Token lifetime in hours.
        ttl_hours: i64,
    },
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenIssuer::Placeholder => f.write_str("Placeholder"),
            TokenIssuer::Jwt { ttl_hours, .. } => f
                .debug_struct("Jwt")
                .field("ttl_hours", ttl_hours)
                .finish_non_exhaustive(),
        }
    }
}

impl TokenIssuer {
    /// Pick the issuer described by `config`.
    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) if !secret.is_empty() => TokenIssuer::Jwt {
                secret: secret.clone(),
                ttl_hours: config.token_ttl_hours,
            },
            _ => TokenIssuer::Placeholder,
        }
    }

    /// Token for `user`.
    pub fn issue(&self, user: &UserView) -> Result<String> {
        match self {
            TokenIssuer::Placeholder => Ok(format!("fake-jwt-token-{}", user.id_text())),
            TokenIssuer::Jwt { secret, ttl_hours } => {
                let now = chrono::Utc::now();
                let exp = chrono::Duration::try_hours(*ttl_hours)
                    .and_then(|ttl| now.checked_add_signed(ttl))
                    .ok_or_else(|| {
                        Error::Credential(format!("token ttl of {ttl_hours}h is out of range"))
                    })?;
                let claims = Claims {
                    sub: user.id_text(),
                    email: user.email.clone(),
                    role: user.role.clone(),
                    iat: now.timestamp(),
                    exp: exp.timestamp(),
                };
                encode(
                    &Header::default(),
                    &claims,
                    &EncodingKey::from_secret(secret.as_bytes()),
                )
                .map_err(|e| Error::Credential(e.to_string()))
            }
        }
    }

    /// Decode and validate a JWT issued by [`issue`](Self::issue).
    /// Placeholder tokens cannot be verified and always fail.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        match self {
            TokenIssuer::Placeholder => Err(Error::Unauthorized),
            TokenIssuer::Jwt { secret, .. } => decode::<Claims>(
                token,
                &DecodingKey::from_secret(secret.as_bytes()),
                &Validation::default(),
            )
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(id: &str) -> UserView {
        UserView {
            id: json!(id),
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            role: Some("customer".into()),
        }
    }

    #[test]
    fn hashed_password_verifies() {
        let stored = store_password(&AuthConfig::default(), "s3cret").unwrap();
        assert_ne!(stored, "s3cret");
        assert!(stored.starts_with("$argon2"));
        assert!(verify_password(&stored, "s3cret"));
        assert!(!verify_password(&stored, "s3cres"));
    }

    #[test]
    fn plaintext_when_hashing_disabled() {
        let cfg = AuthConfig {
            hash_passwords: false,
            ..AuthConfig::default()
        };
        assert_eq!(store_password(&cfg, "pw").unwrap(), "pw");
    }

    #[test]
    fn legacy_plaintext_compares_exactly() {
        assert!(verify_password("hunter2", "hunter2"));
        assert!(!verify_password("hunter2", "Hunter2"));
        assert!(!verify_password("hunter2", "hunter2 "));
    }

    #[test]
    fn plaintext_that_looks_like_a_phc_string_compares_exactly() {
        assert!(verify_password("$money$bags", "$money$bags"));
        assert!(!verify_password("$money$bags", "money bags"));
    }

    #[test]
    fn placeholder_token_names_the_user() {
        let token = TokenIssuer::Placeholder.issue(&view("abc")).unwrap();
        assert_eq!(token, "fake-jwt-token-abc");
        assert!(TokenIssuer::Placeholder.verify(&token).is_err());
    }

    #[test]
    fn out_of_range_ttl_is_an_error() {
        let issuer = TokenIssuer::Jwt {
            secret: "test-secret".into(),
            ttl_hours: 10_000_000_000,
        };
        assert!(matches!(
            issuer.issue(&view("u-1")),
            Err(Error::Credential(_))
        ));
    }

    #[test]
    fn jwt_round_trips_claims() {
        let issuer = TokenIssuer::from_config(&AuthConfig {
            jwt_secret: Some("test-secret".into()),
            ..AuthConfig::default()
        });
        let token = issuer.issue(&view("u-1")).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn jwt_with_wrong_secret_is_rejected() {
        let a = TokenIssuer::Jwt { secret: "a".into(), ttl_hours: 1 };
        let b = TokenIssuer::Jwt { secret: "b".into(), ttl_hours: 1 };
        let token = a.issue(&view("x")).unwrap();
        assert_eq!(b.verify(&token), Err(Error::Unauthorized));
    }
}

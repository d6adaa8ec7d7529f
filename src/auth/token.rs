//! Session tokens
//!
//! HS256 JWTs carrying `{sub, iat, exp, jti, iss}`. Tokens are stateless: the
//! signature and the expiry claim are the whole of their validity.
//!
//! Expiry is checked here rather than by `jsonwebtoken` so that an expired
//! token (valid signature, `now >= exp`) can be told apart from a forged or
//! malformed one, and so that verification can run against a supplied clock.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::config::{ConfigError, TokenConfig, MAX_TOKEN_TTL_SECONDS};
use crate::domain::entities::identity::Identity;
use crate::secrets::SigningSecret;

/// Value of the `iss` claim on every token this service issues
pub const TOKEN_ISSUER: &str = "trade-ledger";

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
}

/// Token signing failed; only possible with a broken key or claims encoder
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to sign session token: {0}")]
pub struct SigningError(String);

/// A freshly issued bearer token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens with a symmetric key.
///
/// Holds only immutable key material, so one instance is shared across all
/// requests behind an `Arc`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &SigningSecret, ttl_seconds: i64) -> Result<Self, ConfigError> {
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(ConfigError::InvalidTokenTtl(ttl_seconds));
        }
        let ttl = Duration::try_seconds(ttl_seconds).ok_or(ConfigError::InvalidTokenTtl(ttl_seconds))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Ok(TokenService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &TokenConfig) -> Result<Self, ConfigError> {
        Self::new(&config.secret, config.ttl_seconds)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `identity` valid from now for the configured TTL
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, SigningError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, SigningError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| SigningError("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: identity.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SigningError(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, structure and expiry of `token` as of `now`.
    ///
    /// Pure: the same inputs always give the same result.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        if now.timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn service(ttl_seconds: i64) -> TokenService {
        let secret = SigningSecret::new("unit-test-signing-key-with-enough-bytes").unwrap();
        TokenService::new(&secret, ttl_seconds).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    /// Flip one character in the middle of the signature segment
    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = signature.chars().collect();
        let i = sig.len() / 2;
        sig[i] = if sig[i] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", head, sig.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_then_verify_returns_identity() {
        let tokens = service(3600);
        let issued = tokens.issue(&Identity::new("alice")).unwrap();
        let claims = tokens.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn test_alice_scenario() {
        let tokens = service(3600);
        let issued = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        assert_eq!(issued.expires_at, t0() + Duration::seconds(3600));

        let claims = tokens
            .verify_at(&issued.token, t0() + Duration::seconds(1800))
            .unwrap();
        assert_eq!(claims.sub, "alice");

        let err = tokens
            .verify_at(&issued.token, t0() + Duration::seconds(3601))
            .unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let tokens = service(60);
        let issued = tokens.issue_at(&Identity::new("bob"), t0()).unwrap();

        assert!(tokens.verify_at(&issued.token, t0() + Duration::seconds(59)).is_ok());
        assert!(matches!(
            tokens.verify_at(&issued.token, t0() + Duration::seconds(60)),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_verification_is_idempotent() {
        let tokens = service(3600);
        let issued = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        let at = t0() + Duration::seconds(10);

        let first = tokens.verify_at(&issued.token, at).unwrap();
        let second = tokens.verify_at(&issued.token, at).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokens_for_same_identity_are_distinct() {
        let tokens = service(3600);
        let a = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        let b = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        assert_ne!(a.token, b.token);

        let later = tokens
            .issue_at(&Identity::new("alice"), t0() + Duration::seconds(5))
            .unwrap();
        let at = t0() + Duration::seconds(6);
        assert_eq!(tokens.verify_at(&a.token, at).unwrap().sub, "alice");
        assert_eq!(tokens.verify_at(&later.token, at).unwrap().iat, t0().timestamp() + 5);
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let tokens = service(3600);
        let issued = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        let tampered = tamper_signature(&issued.token);

        let err = tokens
            .verify_at(&tampered, t0() + Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_tampered_expired_token_is_invalid_not_expired() {
        let tokens = service(60);
        let issued = tokens.issue_at(&Identity::new("alice"), t0()).unwrap();
        let tampered = tamper_signature(&issued.token);

        let err = tokens
            .verify_at(&tampered, t0() + Duration::days(2))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let issuer = service(3600);
        let other_secret = SigningSecret::new("a-completely-different-signing-key-0002").unwrap();
        let verifier = TokenService::new(&other_secret, 3600).unwrap();

        let issued = issuer.issue_at(&Identity::new("alice"), t0()).unwrap();
        assert!(matches!(
            verifier.verify_at(&issued.token, t0()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let tokens = service(3600);
        for garbage in ["", "not-a-jwt", "a.b.c", "...."] {
            assert!(matches!(
                tokens.verify_at(garbage, t0()),
                Err(AuthError::InvalidToken(_))
            ));
        }
    }

    #[test]
    fn test_non_positive_ttl_is_configuration_error() {
        let secret = SigningSecret::new("unit-test-signing-key-with-enough-bytes").unwrap();
        assert!(matches!(
            TokenService::new(&secret, 0),
            Err(ConfigError::InvalidTokenTtl(0))
        ));
    }

    #[test]
    fn test_oversized_ttl_is_configuration_error() {
        let secret = SigningSecret::new("unit-test-signing-key-with-enough-bytes").unwrap();
        assert!(matches!(
            TokenService::new(&secret, 10_000_000_000_000),
            Err(ConfigError::InvalidTokenTtl(10_000_000_000_000))
        ));
        assert!(matches!(
            TokenService::new(&secret, i64::MAX),
            Err(ConfigError::InvalidTokenTtl(i64::MAX))
        ));
    }

    #[test]
    fn test_longest_ttl_still_issues() {
        let tokens = service(MAX_TOKEN_TTL_SECONDS);
        let issued = tokens.issue(&Identity::new("alice")).unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap().sub, "alice");
    }

    #[test]
    fn test_expiry_overflow_is_an_error_not_a_panic() {
        let tokens = service(3600);
        let result = tokens.issue_at(&Identity::new("alice"), DateTime::<Utc>::MAX_UTC);
        assert!(result.is_err());
    }
}

//! Session token handling
//!
//! Tokens are compact HS256 JWTs: `header.payload.signature`, each segment
//! base64url without padding. The payload carries the user id (`sub`) and
//! an expiry (`exp`, unix seconds). Verification never fails loudly: any
//! problem yields an invalid result that the authorization layer reads as
//! "unauthenticated".
//!
//! Security notes:
//! - The signing secret is loaded once at startup and never rotated
//! - Default expiry is 7 days
//! - No leeway is granted on expiry

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::MIN_SECRET_LEN;
use crate::types::BoggaError;

/// Default session lifetime (7 days)
pub const DEFAULT_EXPIRY_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Payload stored in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Result of token validation
#[derive(Debug)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

impl TokenValidationResult {
    pub fn valid(claims: Claims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            claims: None,
            error: Some(error.into()),
        }
    }
}

/// Session token signer and validator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtValidator {
    /// Create a new validator
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, BoggaError> {
        if secret.is_empty() {
            return Err(BoggaError::Config(
                "JWT_SECRET is required outside dev mode".into(),
            ));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(BoggaError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Create a validator for dev mode (built-in secret)
    pub fn new_dev(expiry_seconds: u64) -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            expiry_seconds,
        }
    }

    /// Issue a session token for a user
    pub fn generate_token(&self, user_id: &str) -> Result<String, BoggaError> {
        let now = unix_now()?;
        self.sign(&Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.expiry_seconds,
        })
    }

    /// Sign an arbitrary payload with the server secret
    pub fn sign(&self, claims: &Claims) -> Result<String, BoggaError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| BoggaError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify and decode a session token
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(token_data) => TokenValidationResult::valid(token_data.claims),
            Err(err) => {
                use jsonwebtoken::errors::ErrorKind;
                let error_msg = match err.kind() {
                    ErrorKind::ExpiredSignature => "Token expired",
                    ErrorKind::InvalidToken => "Invalid token",
                    ErrorKind::InvalidSignature => "Invalid signature",
                    ErrorKind::Json(_) | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                        "Malformed token"
                    }
                    _ => "Token validation failed",
                };
                TokenValidationResult::invalid(error_msg)
            }
        }
    }
}

fn unix_now() -> Result<u64, BoggaError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| BoggaError::Internal(format!("System time error: {}", e)))
}

/// Extract token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn test_validator() -> JwtValidator {
        JwtValidator::new(
            "test-secret-that-is-at-least-32-characters-long".into(),
            DEFAULT_EXPIRY_SECONDS,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_and_verify_token() {
        let validator = test_validator();

        let token = validator.generate_token("user-123").unwrap();
        assert_eq!(token.split('.').count(), 3);

        let result = validator.verify_token(&token);
        assert!(result.valid);

        let claims = result.claims.unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.exp - claims.iat, DEFAULT_EXPIRY_SECONDS);
    }

    #[test]
    fn test_header_is_hs256_jwt() {
        let token = test_validator().generate_token("user-123").unwrap();
        let header_segment = token.split('.').next().unwrap();
        assert!(!header_segment.contains('='));

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_segment).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn test_round_trip_arbitrary_payload() {
        let validator = test_validator();
        let claims = Claims {
            sub: "u1".into(),
            iat: 0,
            exp: unix_now().unwrap() + 60,
        };

        let token = validator.sign(&claims).unwrap();
        let result = validator.verify_token(&token);
        assert_eq!(result.claims, Some(claims));
    }

    #[test]
    fn test_expired_token() {
        let validator = test_validator();
        let token = validator
            .sign(&Claims {
                sub: "u1".into(),
                iat: 0,
                exp: unix_now().unwrap() - 10,
            })
            .unwrap();

        let result = validator.verify_token(&token);
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Token expired"));
    }

    #[test]
    fn test_invalid_token() {
        let validator = test_validator();

        let result = validator.verify_token("invalid-token");
        assert!(!result.valid);
        assert!(result.error.is_some());

        assert!(!validator.verify_token("a.b").valid);
        assert!(!validator.verify_token("a.b.c.d").valid);
        assert!(!validator.verify_token("").valid);
    }

    #[test]
    fn test_unparsable_payload() {
        let validator = test_validator();
        let token = validator.generate_token("u1").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], URL_SAFE_NO_PAD.encode("not json"), parts[2]);

        assert!(!validator.verify_token(&forged).valid);
    }

    #[test]
    fn test_wrong_secret() {
        let validator1 = test_validator();
        let validator2 = JwtValidator::new(
            "different-secret-that-is-at-least-32-characters".into(),
            3600,
        )
        .unwrap();

        let token = validator1.generate_token("user-123").unwrap();

        let result = validator2.verify_token(&token);
        assert!(!result.valid);
    }

    #[test]
    fn test_tampered_signature() {
        let validator = test_validator();
        let token = validator.generate_token("user-123").unwrap();

        let (head, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = sig.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", head, sig.into_iter().collect::<String>());

        assert!(!validator.verify_token(&tampered).valid);
    }

    #[test]
    fn test_tampered_payload() {
        let validator = test_validator();
        let token = validator.generate_token("user-123").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({ "sub": "someone-else", "exp": u64::MAX / 2 }).to_string(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(!validator.verify_token(&forged).valid);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc123")), Some("abc123"));

        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(Some("abc123")), None);
        assert_eq!(extract_bearer_token(Some("Basic abc123")), None);
    }

    #[test]
    fn test_secret_validation() {
        assert!(JwtValidator::new("short".into(), 3600).is_err());
        assert!(JwtValidator::new("".into(), 3600).is_err());
        assert!(JwtValidator::new("this-secret-is-at-least-32-chars-long".into(), 3600).is_ok());
    }

    #[test]
    fn test_dev_mode_validator() {
        let validator = JwtValidator::new_dev(3600);
        let token = validator.generate_token("user-123").unwrap();
        assert!(validator.verify_token(&token).valid);
    }
}

//! Authentication and authorization for Bogga
//!
//! Provides:
//! - PIN digests (SHA-256, optionally salted per deployment)
//! - Session token generation and validation (HS256 JWT)
//! - Share tokens that carry their role in a prefix sigil
//! - Principals and the per-action permission table

pub mod jwt;
pub mod permissions;
pub mod pin;
pub mod share;

pub use jwt::{extract_bearer_token, Claims, JwtValidator, TokenValidationResult};
pub use permissions::{is_action_allowed, AccessLevel, Action, Principal};
pub use pin::{hash_pin, is_valid_pin, PinHasher};
pub use share::{ShareRole, ShareToken};

/// Resolve the owner identity behind an `Authorization` header.
///
/// Returns the user id (`sub`) on success. Missing, malformed or expired
/// credentials all resolve to `None`; the caller answers 401.
pub fn resolve_owner(auth_header: Option<&str>, jwt: &JwtValidator) -> Option<String> {
    let token = extract_bearer_token(auth_header)?;
    let result = jwt.verify_token(token);
    if !result.valid {
        tracing::warn!(
            reason = result.error.as_deref().unwrap_or("unknown"),
            "Rejected session token"
        );
    }
    result.claims.map(|claims| claims.sub)
}

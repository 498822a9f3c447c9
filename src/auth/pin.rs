//! PIN hashing
//!
//! The deployment has a single user, identified by a four digit PIN. The PIN
//! is stored as a lowercase hex SHA-256 digest. A per-deployment salt can be
//! configured; without one the digest is plain SHA-256 over the UTF-8 bytes.

use sha2::{Digest, Sha256};

/// Length of a valid PIN
pub const PIN_LENGTH: usize = 4;

/// SHA-256 digest of a PIN, lowercase hex
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

/// True if the PIN is exactly four ASCII digits
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}

/// PIN hasher bound to the deployment's salt
#[derive(Debug, Clone, Default)]
pub struct PinHasher {
    salt: Option<String>,
}

impl PinHasher {
    pub fn new(salt: Option<String>) -> Self {
        Self {
            salt: salt.filter(|s| !s.is_empty()),
        }
    }

    /// Digest a PIN for storage or comparison
    pub fn hash(&self, pin: &str) -> String {
        match &self.salt {
            Some(salt) => {
                let mut hasher = Sha256::new();
                hasher.update(salt.as_bytes());
                hasher.update(pin.as_bytes());
                hex::encode(hasher.finalize())
            }
            None => hash_pin(pin),
        }
    }
}

//! Account service - setup and PIN login

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{is_valid_pin, JwtValidator, PinHasher};
use crate::db::{users, TaskDb};
use crate::types::BoggaError;

pub const MISSING_PIN: &str = "Missing PIN";
pub const PIN_MUST_BE_DIGITS: &str = "PIN must be 4 digits";
pub const ALREADY_SET_UP: &str = "Already set up";
pub const WRONG_PIN: &str = "Wrong PIN";

/// Session handed back by setup and login
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub name: String,
}

/// First-run setup and login
pub struct AccountService {
    db: Arc<TaskDb>,
    jwt: Arc<JwtValidator>,
    hasher: PinHasher,
    default_name: String,
}

impl AccountService {
    pub fn new(
        db: Arc<TaskDb>,
        jwt: Arc<JwtValidator>,
        hasher: PinHasher,
        default_name: String,
    ) -> Self {
        Self {
            db,
            jwt,
            hasher,
            default_name,
        }
    }

    /// Whether a user exists yet
    pub fn is_set_up(&self) -> Result<bool, BoggaError> {
        self.db.with_conn(users::has_any_user)
    }

    /// Create the deployment user. Refused once any user exists.
    pub fn setup(&self, pin: Option<&str>, name: Option<&str>) -> Result<Session, BoggaError> {
        let display_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_name)
            .to_string();

        let user = self.db.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if users::has_any_user(&tx)? {
                return Err(BoggaError::Forbidden(ALREADY_SET_UP.into()));
            }
            let pin = pin
                .filter(|p| is_valid_pin(p))
                .ok_or_else(|| BoggaError::bad_request(PIN_MUST_BE_DIGITS))?;
            let user = users::create_user(&tx, &self.hasher.hash(pin), &display_name)?;
            tx.commit()?;
            Ok(user)
        })?;

        info!(user_id = %user.id, "Deployment user created");
        Ok(Session {
            token: self.jwt.generate_token(&user.id)?,
            name: user.display_name,
        })
    }

    /// Exchange a PIN for a session token
    pub fn login(&self, pin: Option<&str>) -> Result<Session, BoggaError> {
        let pin = pin
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BoggaError::bad_request(MISSING_PIN))?;

        let digest = self.hasher.hash(pin);
        let user = self
            .db
            .with_conn(|conn| users::find_user_by_pin_hash(conn, &digest))?
            .ok_or_else(|| {
                warn!("Login rejected: wrong PIN");
                BoggaError::Unauthorized(WRONG_PIN.into())
            })?;

        info!(user_id = %user.id, "Login");
        Ok(Session {
            token: self.jwt.generate_token(&user.id)?,
            name: user.display_name,
        })
    }
}

//! Configuration for Bogga
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Minimum accepted length for the token signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Bogga - personal to-do lists with shareable links
#[derive(Parser, Debug, Clone)]
#[command(name = "bogga")]
#[command(about = "Single-tenant to-do list service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8787")]
    pub listen: SocketAddr,

    /// SQLite database file (":memory:" for a throwaway store)
    #[arg(long, env = "DATABASE_PATH", default_value = "bogga.db")]
    pub database_path: String,

    /// Secret for session token signing (required unless in dev mode)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "604800")]
    pub jwt_expiry_seconds: u64,

    /// Optional per-deployment salt mixed into PIN digests
    #[arg(long, env = "PIN_SALT")]
    pub pin_salt: Option<String>,

    /// Display name used at setup when none is given
    #[arg(long, env = "APP_NAME", default_value = "Bogga")]
    pub default_display_name: String,

    /// Directory holding the single-page app (index.html and assets)
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Enable development mode (built-in signing secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None | Some("") if !self.dev_mode => {
                return Err("JWT_SECRET is required outside dev mode".into());
            }
            Some(secret) if !secret.is_empty() && secret.len() < MIN_SECRET_LEN => {
                return Err(format!(
                    "JWT_SECRET must be at least {} characters",
                    MIN_SECRET_LEN
                ));
            }
            _ => {}
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".into());
        }

        if self.default_display_name.trim().is_empty() {
            return Err("APP_NAME must not be blank".into());
        }

        Ok(())
    }

    /// True when the store lives only for the lifetime of the process
    pub fn is_memory_database(&self) -> bool {
        self.database_path == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["bogga", "--jwt-secret", SECRET]);
        assert_eq!(args.jwt_expiry_seconds, 604_800);
        assert_eq!(args.default_display_name, "Bogga");
        assert_eq!(args.database_path, "bogga.db");
        assert!(args.static_dir.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_secret_required_outside_dev_mode() {
        let args = Args::parse_from(["bogga"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["bogga", "--dev-mode"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let args = Args::parse_from(["bogga", "--jwt-secret", "short"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let args = Args::parse_from([
            "bogga",
            "--jwt-secret",
            SECRET,
            "--jwt-expiry-seconds",
            "0",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_memory_database() {
        let args = Args::parse_from(["bogga", "--dev-mode", "--database-path", ":memory:"]);
        assert!(args.is_memory_database());
    }
}

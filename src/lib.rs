//! Bogga - personal to-do lists with shareable links
//!
//! A single-tenant HTTP service: one owner signs in with a four-digit PIN,
//! keeps lists of tasks, and hands out share links that let others view a
//! list or add tasks to it.
//!
//! ## Modules
//!
//! - **auth**: PIN digests, session tokens, share tokens, permissions
//! - **lifecycle**: task status machine, validation, recurrence projection
//! - **db**: SQLite store (users, lists, tasks, recurrence rules)
//! - **services**: account, list and task operations over the store
//! - **routes** / **server**: HTTP surface

pub mod auth;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::BoggaError;

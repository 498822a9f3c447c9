//! Shared types for Bogga

pub mod error;

pub use error::BoggaError;

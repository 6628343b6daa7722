//! # Piket Common Library
//!
//! Shared code for the Piket duty-roster service:
//! - Recap reconciliation (pure)
//! - Duty roster model
//! - Row models and error taxonomy
//! - Configuration loading
//! - Database schema, seeding and roster persistence
//! - Credential hashing and session tokens

pub mod auth;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod optimistic;
pub mod recap;
pub mod schedule;
pub mod time;

pub use error::{Error, Result};
pub use recap::{reconcile, RecapEntry, RecapStatus};
pub use schedule::DutySchedule;

//! Database access layer for piket-server
//!
//! One module per table. Functions take a pool for standalone statements or a
//! connection when the caller groups several statements in a transaction.

pub mod completions;
pub mod groups;
pub mod sessions;
pub mod tasks;
pub mod users;

pub use piket_common::db::{init_database, load_schedule, schedule_version};

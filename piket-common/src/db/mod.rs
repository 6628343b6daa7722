//! Schema creation, seeding and shared table accessors

pub mod init;
pub mod schedule;
pub mod settings;

pub use init::*;
pub use schedule::*;
pub use settings::*;

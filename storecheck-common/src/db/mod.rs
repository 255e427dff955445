//! Database access layer

pub mod init;
pub mod provider;

pub use init::init_database;
pub use provider::{ChecklistProvider, SqliteProvider};

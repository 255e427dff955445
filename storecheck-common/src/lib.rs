//! # StoreCheck Common Library
//!
//! Shared code for the StoreCheck service including:
//! - Checklist and inspection data models
//! - Database initialization and the `ChecklistProvider` backend
//! - The in-progress inspection session state machine
//! - Local session persistence (`StateStore`)
//! - Submission pipeline
//! - Configuration loading and admin API authentication

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod icons;
pub mod models;
pub mod session;
pub mod store;
pub mod submission;

pub use error::{Error, Result};
pub use icons::Icon;

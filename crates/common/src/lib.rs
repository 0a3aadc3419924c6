//! Shared utilities, configuration, and error handling for Parish
//!
//! This crate provides common functionality used across the Parish backend:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Pagination and request-body extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;
pub mod username;

pub use config::{Config, LogFormat};
pub use db::{is_unique_violation, RepositoryError};
pub use error::{error_response, Error, Result};
pub use extractors::{Page, PageInfo, Pagination, ValidatedJson};
pub use state::StateError;
pub use username::{is_valid_username, normalize_username};

//! Cash Lens Common Library
//!
//! Shared code for the Cash Lens backend including:
//! - File record entity and repository
//! - Error types and handling
//! - Configuration management
//! - Text decoding and line counting
//! - Mock progress reporting
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod progress;
pub mod text;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{DbPool, Repository};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parser identifier recorded for every upload until parser selection exists
pub const DEFAULT_PARSER_NAME: &str = "default";

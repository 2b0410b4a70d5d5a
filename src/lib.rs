//! # Clipdex
//!
//! Local, single-user clipboard history manager.
//!
//! Clipdex records unique pieces of copied text in most-recently-used order,
//! pages through them nine at a time, and searches them by matching every
//! whitespace-separated query word as a prefix against the words of each
//! stored entry.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod engine;
pub mod history;
pub mod nav;
pub mod search;
pub mod watcher;

pub use config::Config;
pub use engine::Engine;

/// Result type alias for Clipdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Clipdex operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// History store error
    #[error("Store error: {0}")]
    Store(#[from] history::StoreError),

    /// Persistence error
    #[error("Database error: {0}")]
    Database(#[from] history::database::DatabaseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of entries shown per history or search page
pub const PAGE_SIZE: u32 = 9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_errors_convert_and_display() {
        let err: Error = history::StoreError::DuplicateText(7).into();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.to_string().contains("id 7"));

        let err: Error = clipboard::ClipboardError::Platform("no display".into()).into();
        assert!(err.to_string().starts_with("Clipboard error"));
    }
}

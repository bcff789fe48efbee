//! Error types for the Versed core library.

use thiserror::Error;

/// Top-level error type for all Versed operations.
#[derive(Error, Debug)]
pub enum VersedError {
    /// A passage with the given ID was not found.
    #[error("Passage not found: {0}")]
    PassageNotFound(crate::PassageId),

    /// A paragraph with the given ID is not part of the passage it was looked up in.
    #[error("Paragraph {paragraph} not found in passage {passage}")]
    ParagraphNotFound {
        /// The passage that was searched.
        passage: crate::PassageId,
        /// The paragraph that was missing.
        paragraph: crate::ParagraphId,
    },

    /// A passage was submitted with all four text fields empty.
    #[error("Nothing to add: before, goal, after and reference are all empty")]
    EmptySubmission,

    /// A quiz action was attempted in a state that does not allow it.
    #[error("Invalid quiz transition: cannot {action} while {state}")]
    InvalidTransition {
        /// The state the session was in.
        state: &'static str,
        /// The action that was rejected.
        action: &'static str,
    },

    /// Another user passage already holds this index.
    #[error("Passage index {0} is already taken")]
    DuplicateIndex(i64),

    /// A backup was requested while writes are still pending.
    #[error("Cannot back up with unsaved changes pending")]
    UnsavedChanges,

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, VersedError>;

//! Error handling module for the HBnB console
//!
//! Two families of errors live here:
//!
//! - [`HbnbError`]: failures of the program itself (I/O, JSON, configuration).
//! - [`CommandError`]: mistakes in a typed command. These are printed on the
//!   console verbatim and never stop the read loop.

use thiserror::Error;

/// Main error type for the HBnB console
#[derive(Error, Debug)]
pub enum HbnbError {
    /// IO errors (backing file, console streams)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors (CLI flags, paths)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage errors (malformed records, unknown classes)
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for HBnB operations
pub type Result<T> = std::result::Result<T, HbnbError>;

impl HbnbError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// User-input errors reported by console commands.
///
/// The `Display` output is exactly the line printed to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    ClassDoesNotExist,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstanceFound,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,

    /// The command ran but persisting the result failed
    #[error("** could not save: {0} **")]
    SaveFailed(String),
}

impl From<HbnbError> for CommandError {
    fn from(err: HbnbError) -> Self {
        Self::SaveFailed(err.to_string())
    }
}

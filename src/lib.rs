//! HBnB Console Library
//!
//! This library provides the model, storage engine and command interpreter
//! behind the `hbnb` console.

pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod types;

// Re-export main types for convenience
pub use config::ConsoleConfig;
pub use console::{Console, Flow, DEFAULT_PROMPT};
pub use engine::storage::FileStorage;
pub use error::{CommandError, HbnbError};
pub use models::{AttrValue, Entity};
pub use types::EntityKind;

//! Console configuration
//!
//! Resolves the command line into the settings the console runs with.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::console::DEFAULT_PROMPT;
use crate::error::{HbnbError, Result};

/// Settings for one console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Backing JSON document
    pub file_path: PathBuf,
    /// Prompt text, `None` when no prompt should be printed
    pub prompt: Option<String>,
    /// Log verbosity from `-v` flags
    pub verbosity: u8,
}

impl ConsoleConfig {
    /// Build from parsed CLI flags. `stdin_is_terminal` decides whether the
    /// prompt is shown when `--no-prompt` is absent.
    pub fn from_cli(cli: &Cli, stdin_is_terminal: bool) -> Result<Self> {
        let config = Self {
            file_path: cli.file.clone(),
            prompt: (stdin_is_terminal && !cli.no_prompt).then(|| DEFAULT_PROMPT.to_string()),
            verbosity: cli.verbose,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_path.as_os_str().is_empty() {
            return Err(HbnbError::config("storage file path must not be empty"));
        }
        if self.file_path.file_name().is_none() {
            return Err(HbnbError::config(format!(
                "storage file path {:?} does not name a file",
                self.file_path
            )));
        }
        Ok(())
    }
}

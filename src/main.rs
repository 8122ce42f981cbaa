//! HBnB console - main entry point
//!
//! Reloads the object set, then runs the interpreter over stdin until `quit`
//! or end of input.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use tracing::{debug, info};

use hbnb::cli::Cli;
use hbnb::logging::init_logging;
use hbnb::{Console, ConsoleConfig, FileStorage};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let config = ConsoleConfig::from_cli(&cli, io::stdin().is_terminal())
        .context("Invalid console configuration")?;
    init_logging(config.verbosity);
    debug!("Console configuration: {:?}", config);

    // The object set must be loaded before the first command is read
    let storage = FileStorage::open(&config.file_path);
    info!(
        "Console starting with {} objects from {:?}",
        storage.len(),
        config.file_path
    );

    let stdin = io::stdin();
    let mut console = Console::new(storage, stdin.lock(), io::stdout().lock());
    if let Some(prompt) = config.prompt {
        console = console.with_prompt(prompt);
    }

    console.run().context("Console I/O failed")?;
    info!("Console exiting");
    Ok(())
}

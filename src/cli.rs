use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::engine::storage::DEFAULT_FILE_PATH;

/// HBnB console - manage BaseModel, User, State, City, Amenity, Place and Review objects
#[derive(Parser, Debug)]
#[command(name = "hbnb")]
#[command(about = "Interactive command interpreter for HBnB objects stored in a JSON file")]
#[command(version)]
pub struct Cli {
    /// JSON file holding all objects (created on first save)
    #[arg(short, long, default_value = DEFAULT_FILE_PATH)]
    pub file: PathBuf,

    /// Never print the "(hbnb) " prompt, even on a terminal
    #[arg(long)]
    pub no_prompt: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["hbnb"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("file.json"));
        assert!(!cli.no_prompt);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["hbnb", "--file", "/tmp/store.json", "--no-prompt", "-vv"])
            .unwrap();
        assert_eq!(cli.file, PathBuf::from("/tmp/store.json"));
        assert!(cli.no_prompt);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["hbnb", "--bogus"]).is_err());
    }
}

//! The HBnB command interpreter
//!
//! [`Console`] reads one line at a time, dispatches it and writes the result.
//! It is generic over its input and output so the same loop serves an
//! interactive terminal, a piped script and in-memory buffers in tests.
//!
//! # Line handling
//!
//! | Line | Effect |
//! |------|--------|
//! | empty | nothing |
//! | `quit` | stop |
//! | `EOF` or end of input | print a newline, stop |
//! | `<command> args` | run the command, print its output or error message |
//! | anything else | dotted-call handler (`User.count()`), silent if unmatched |

pub mod commands;
pub mod parse;

use crate::engine::storage::FileStorage;
use crate::error::Result;
use commands::{Command, Outcome};
use std::borrow::Cow;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Prompt printed before each line in interactive mode
pub const DEFAULT_PROMPT: &str = "(hbnb) ";

/// Whether the read loop should keep going after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Line-oriented interpreter over a storage engine.
pub struct Console<R, W> {
    storage: FileStorage,
    input: R,
    output: W,
    prompt: Option<String>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console with no prompt. The storage should already be
    /// reloaded; see [`FileStorage::open`].
    pub fn new(storage: FileStorage, input: R, output: W) -> Self {
        Self {
            storage,
            input,
            output,
            prompt: None,
        }
    }

    /// Print `prompt` before reading each line
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Consume the console, returning its output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until `quit`, `EOF` or end of input.
    ///
    /// Only I/O failures on the console streams are returned; command errors
    /// are printed and the loop carries on.
    pub fn run(&mut self) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            if let Some(prompt) = &self.prompt {
                write!(self.output, "{}", prompt)?;
                self.output.flush()?;
            }

            buf.clear();
            if self.input.read_until(b'\n', &mut buf)? == 0 {
                self.execute("EOF")?;
                break;
            }

            // Bytes that are not UTF-8 are replaced rather than ending the session
            let line = String::from_utf8_lossy(&buf);
            if let Cow::Owned(_) = line {
                warn!("Input line contained invalid UTF-8; replaced undecodable bytes");
            }
            let text = line.trim_end_matches(['\n', '\r']);
            if self.execute(text)? == Flow::Stop {
                break;
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Interpret a single line and write whatever it prints.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (word, args) = parse::split_command(line);
        let outcome: Outcome = match word.parse::<Command>() {
            Ok(Command::Quit) => return Ok(Flow::Stop),
            Ok(Command::Eof) => {
                writeln!(self.output)?;
                return Ok(Flow::Stop);
            }
            Ok(command) => {
                debug!("Dispatching {} {:?}", command, args);
                self.dispatch(command, args)
            }
            Err(_) => commands::dotted(&mut self.storage, line),
        };

        match outcome {
            Ok(Some(text)) => writeln!(self.output, "{}", text)?,
            Ok(None) => {}
            Err(err) => writeln!(self.output, "{}", err)?,
        }
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, command: Command, args: &str) -> Outcome {
        match command {
            Command::Help => commands::help(args),
            Command::Create => commands::create(&mut self.storage, args),
            Command::Show => commands::show(&self.storage, args),
            Command::Destroy => commands::destroy(&mut self.storage, args),
            Command::All => commands::all(&self.storage, args),
            Command::Update => commands::update(&mut self.storage, args),
            Command::Quit | Command::Eof => Ok(None),
        }
    }
}

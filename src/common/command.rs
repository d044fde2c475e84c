//! Commands the station sends down to the fixture.
//!
//! The fixture firmware accepts `KEY=value` lines terminated by `\n`.

use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Fixed buffer size for one formatted command line.
pub const COMMAND_CAPACITY: usize = 64;

/// Represents a command for the fixture.
///
/// Note: The `Display` implementation for this enum generates the exact line sent on
/// the wire, including the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Select Model (`MODEL=<part>\n`) - switches the fixture to the part's relay/ADC pairing.
    SelectModel { part: &'a str },
}

/// Errors produced while turning a [`Command`] into bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandFormatError {
    /// The model token is empty after trimming.
    #[error("model token is empty")]
    EmptyModel,
    /// The model token contains a control character or separator the firmware would misparse.
    #[error("model token contains an illegal character")]
    IllegalCharacter,
    /// The formatted command does not fit the fixed command buffer.
    #[error("command does not fit the command buffer")]
    TooLong,
}

impl<'a> Command<'a> {
    /// Builds a model-select command, trimming the operator input.
    pub fn select_model(part: &'a str) -> Result<Self, CommandFormatError> {
        let part = part.trim();
        if part.is_empty() {
            return Err(CommandFormatError::EmptyModel);
        }
        if part.chars().any(|c| c.is_control() || c == '=') {
            return Err(CommandFormatError::IllegalCharacter);
        }
        Ok(Command::SelectModel { part })
    }

    /// Formats the command into a stack buffer ready for the transport.
    pub fn format_into(&self) -> Result<ArrayString<COMMAND_CAPACITY>, CommandFormatError> {
        let mut buf = ArrayString::new();
        write!(buf, "{}", self).map_err(|_| CommandFormatError::TooLong)?;
        Ok(buf)
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SelectModel { part } => write!(f, "MODEL={}\n", part),
        }
    }
}

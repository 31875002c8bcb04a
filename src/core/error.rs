//! Error types for region editing

use thiserror::Error;

/// Broad category of an [`Error`], used to decide how it is surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or state; shown to the user as-is.
    Precondition,
    /// Blueprint storage or stream framing failed.
    Io,
    /// Anything else. Logged in full, user gets a generic notice.
    Unexpected,
}

/// Validation failures raised before (or instead of) touching the world.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Please set both points first!")]
    SelectionNotSet,

    #[error("No block type with name {0} found!")]
    UnknownBlockType(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Unable to determine direction from '{0}'")]
    InvalidDirection(String),

    #[error("Rotation must be a multiple of 90 degrees, got {0}")]
    InvalidRotation(i32),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("A command is still running, try again once it finishes")]
    CommandInFlight,

    #[error("Clipboard is empty, copy or import something first")]
    EmptyClipboard,

    #[error("Command has already been executed")]
    AlreadyExecuted,

    #[error("Invalid blueprint name '{0}'")]
    InvalidBlueprintName(String),
}

/// Main error type for the editing engine
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blueprint format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Precondition(_) => ErrorKind::Precondition,
            Error::Io(_) | Error::Format(_) => ErrorKind::Io,
            Error::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Message suitable for showing to the user who issued the command.
    ///
    /// Unexpected errors are collapsed into a generic notice; the detail
    /// belongs in the log.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Unexpected => "Something went wrong, see the server log".to_string(),
            _ => self.to_string(),
        }
    }
}

//! Error handling module for piprov
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Every fatal condition the provisioner can hit is one variant here; recoverable
//! conditions (bad input, a failed `passwd` attempt) never leave the stage that
//! handles them.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::provision_state::StageTransitionError;
use crate::token::TokenError;

/// Main error type for piprov
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Permission denied while touching a protected file
    #[error(
        "Permission denied while accessing {}. piprov must run as superuser: sudo piprov",
        path.display()
    )]
    Privilege { path: PathBuf },

    /// Any other IO error, with the path that caused it
    #[error("Unknown error occurred while accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings self-check or payload errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Dynamic DNS token missing or still the placeholder
    #[error(transparent)]
    Token(#[from] TokenError),

    /// External tool could not be spawned or exited non-zero
    #[error("Command `{program}` failed: {message}")]
    Command { program: String, message: String },

    /// Standard input closed while a prompt was waiting
    #[error("Input closed before all parameters were collected")]
    InputClosed,

    /// User interrupted an interactive prompt
    #[error("Cancelled by user")]
    Cancelled,

    /// A prompt loop hit the configured attempt limit
    #[error("Giving up on {what} after {attempts} attempts")]
    TooManyAttempts { what: String, attempts: u32 },

    /// Stage state machine misuse
    #[error("Stage transition error: {0}")]
    StageTransition(#[from] StageTransitionError),
}

/// Result type alias for piprov operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

// Convenient error constructors
impl ProvisionError {
    /// Classify an IO error against the path it happened on.
    ///
    /// `PermissionDenied` becomes a privilege error so the user is told to re-run
    /// with sudo; everything else keeps the underlying message.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::Privilege { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a command error
    pub fn command(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by missing root privileges
    pub fn is_privilege(&self) -> bool {
        matches!(self, Self::Privilege { .. })
    }
}

/// Extension for attaching a path to `io::Result`s
pub trait IoResultExt<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| ProvisionError::io(path, e))
    }
}

//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `modsync` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! Failures fall into two classes:
//!
//! - **Precondition violations** (`InvalidArgument`): bad caller input such
//!   as a non-directory template root, a missing required subdirectory, or a
//!   root directory that does not exist. Surfaced synchronously,
//!   non-retryable.
//! - **Operational failures** (`GitClone`, `GitCommand`, `GitReset`): a git
//!   subprocess reported a non-zero exit status. These carry the captured
//!   stdout/stderr of the failed operation for diagnostics. No automatic
//!   retry is attempted anywhere.
//!
//! Two cases are deliberately downgraded from error to warning and never
//! reach this enum: an unclean working tree during ref checkout, and a
//! malformed module-level `.sync.yml` override. Both reflect user-editable
//! state the tool should not destroy or block on.

use thiserror::Error;

/// Main error type for modsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// A caller supplied an argument that violates an operation's
    /// precondition (wrong kind of source, missing directory, invalid
    /// template layout).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An error occurred while cloning the template repository.
    #[error("Unable to clone git repository from {url}: {stderr}")]
    GitClone {
        url: String,
        stdout: String,
        stderr: String,
    },

    /// A git subprocess could not be spawned or reported a non-zero exit
    /// status.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// A hard reset of a clean working copy to a resolved ref failed.
    ///
    /// Carries the captured stdout and stderr of the failed `git reset` so
    /// callers can surface the full diagnostics.
    #[error("Unable to set HEAD of git repository at '{path}' to ref '{ref_name}':\n{stdout}\n{stderr}")]
    GitReset {
        path: String,
        ref_name: String,
        stdout: String,
        stderr: String,
    },

    /// A partial ref could not be resolved to a full commit identifier via
    /// a remote-reference listing.
    #[error("Unable to find a branch or tag named '{ref_name}' in repository at '{path}'")]
    RefNotFound { path: String, ref_name: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    ///
    /// Only raised for the trusted template-bundled and site configuration
    /// layers; a malformed module-level override is downgraded to a warning
    /// by the cascade resolver instead.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand constructor for precondition violations.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

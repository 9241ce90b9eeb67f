//! Error types for ssh-exec

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ssh-exec
///
/// Every variant is fatal. The first failure aborts the run and is reported
/// with its underlying cause.
#[derive(Debug, Error)]
pub enum SshExecError {
    /// Missing required parameter or no credential supplied
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    /// Private key file could not be read
    #[error("Failed to read private key file {}: {source}", path.display())]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Private key file content is not a usable key
    #[error("Failed to parse private key: {0}")]
    KeyParse(String),

    /// Transport dial or handshake failed
    #[error("Failed to dial: {0}")]
    Connection(String),

    /// Server rejected the credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Session channel could not be opened
    #[error("Failed to create session: {0}")]
    Session(String),

    /// Remote command failed or the channel errored while reading output
    #[error("Failed to run command: {0}")]
    Execution(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using SshExecError
pub type Result<T> = std::result::Result<T, SshExecError>;

impl SshExecError {
    /// Create an invalid invocation error from a string
    pub fn invalid_invocation(msg: impl Into<String>) -> Self {
        SshExecError::InvalidInvocation(msg.into())
    }

    /// Create a key parse error from a string
    pub fn key_parse(msg: impl Into<String>) -> Self {
        SshExecError::KeyParse(msg.into())
    }

    /// Create a connection error from a string
    pub fn connection(msg: impl Into<String>) -> Self {
        SshExecError::Connection(msg.into())
    }

    /// Create an authentication error from a string
    pub fn auth(msg: impl Into<String>) -> Self {
        SshExecError::Authentication(msg.into())
    }

    /// Create a session error from a string
    pub fn session(msg: impl Into<String>) -> Self {
        SshExecError::Session(msg.into())
    }

    /// Create an execution error from a string
    pub fn execution(msg: impl Into<String>) -> Self {
        SshExecError::Execution(msg.into())
    }
}

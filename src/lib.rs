//! ssh-exec - Run a single command on a remote host over SSH
//!
//! Connects to one server, authenticates with a password or a private key,
//! executes exactly one command and returns its standard output. There is
//! no session reuse, no retry and no interactive shell.
//!
//! # Authentication
//!
//! - A password, when given, is used exclusively
//! - Otherwise the private key file is read and parsed (OpenSSH, PEM, PKCS#8)
//!
//! # Host keys
//!
//! Host key verification is disabled by default (`insecure-accept-any`),
//! which is not suitable for production use. `--host-key-policy known-hosts`
//! verifies against a known_hosts file instead.
//!
//! # Example Usage (CLI)
//!
//! ```bash
//! ssh-exec -server 192.168.1.100 -username admin -password secret -command "uptime"
//! ssh-exec --server 192.168.1.100 --username admin --key ~/.ssh/id_ed25519 --command "df -h"
//! ```

pub mod config;
pub mod error;
pub mod runner;
pub mod ssh;

// Re-exports for convenience
pub use config::{normalize_flag_style, Args, Config, HostKeyMode};
pub use error::{Result, SshExecError};
pub use runner::{Connector, RemoteSession, Report, Runner, SshConnector};
pub use ssh::{
    resolve_auth_method, AuthMethod, CommandOutput, Credential, HostKeyPolicy, SshConfig,
    SshConnection, SshHandler,
};

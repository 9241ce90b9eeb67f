//! SSH layer
//!
//! Authentication method selection, host key policy, a single transient
//! connection and command execution over one session channel.

pub mod auth;
pub mod command;
pub mod config;
pub mod connection;
pub mod handler;

// Re-exports
pub use auth::{resolve_auth_method, AuthMethod, Credential};
pub use command::CommandOutput;
pub use config::{HostKeyPolicy, SshConfig};
pub use connection::SshConnection;
pub use handler::SshHandler;

//! SSH configuration types
//!
//! Connection parameters for a single SSH connection.

use std::path::PathBuf;
use std::time::Duration;

/// How the server's host key is checked during the handshake
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HostKeyPolicy {
    /// Accept any host key without verification.
    ///
    /// Leaves the connection open to man-in-the-middle attacks and is not
    /// suitable for production use.
    #[default]
    InsecureAcceptAny,

    /// Verify the host key against a known_hosts file.
    /// If `path` is None, uses the default ~/.ssh/known_hosts.
    KnownHosts { path: Option<PathBuf> },
}

/// SSH connection configuration
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Remote hostname or IP address
    pub host: String,

    /// SSH port (default: 22)
    pub port: u16,

    /// Username for authentication
    pub username: String,

    /// Host key checking policy
    pub host_key_policy: HostKeyPolicy,

    /// Bound on dial + authentication (None = wait indefinitely)
    pub connect_timeout: Option<Duration>,
}

impl SshConfig {
    /// Create a new SSH configuration with minimal required fields
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            host_key_policy: HostKeyPolicy::default(),
            connect_timeout: None,
        }
    }

    /// Set the SSH port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the host key checking policy
    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

//! SSH client handler implementation
//!
//! Implements the `russh::client::Handler` trait to apply the configured
//! host key policy.

use russh::keys::known_hosts::{check_known_hosts, check_known_hosts_path};
use russh::keys::PublicKey;
use tracing::warn;

use super::config::HostKeyPolicy;

/// SSH client handler for russh
#[derive(Debug, Clone)]
pub struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl SshHandler {
    /// Create a new SSH handler for the given target and policy
    pub fn new(host: impl Into<String>, port: u16, policy: HostKeyPolicy) -> Self {
        Self {
            host: host.into(),
            port,
            policy,
        }
    }

    /// Decide whether the server key is acceptable
    pub fn verify(&self, server_public_key: &PublicKey) -> bool {
        match &self.policy {
            HostKeyPolicy::InsecureAcceptAny => {
                warn!(
                    "Host key verification disabled: accepting any key from {}:{} (insecure)",
                    self.host, self.port
                );
                true
            }
            HostKeyPolicy::KnownHosts { path } => {
                let result = match path {
                    Some(path) => {
                        check_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => check_known_hosts(&self.host, self.port, server_public_key),
                };

                match result {
                    Ok(true) => true,
                    Ok(false) => {
                        warn!(
                            "Host key for {}:{} not found in known_hosts",
                            self.host, self.port
                        );
                        false
                    }
                    Err(russh::keys::Error::KeyChanged { line }) => {
                        warn!(
                            "Host key for {}:{} does not match known_hosts line {}",
                            self.host, self.port, line
                        );
                        false
                    }
                    Err(e) => {
                        warn!("Failed to check known_hosts: {}", e);
                        false
                    }
                }
            }
        }
    }
}

impl russh::client::Handler for SshHandler {
    type Error = anyhow::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(self.verify(server_public_key))
    }
}

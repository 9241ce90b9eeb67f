//! SSH connection
//!
//! A single transient SSH connection: dial, authenticate, open one session
//! channel, disconnect.

use std::sync::Arc;

use russh::client::{self, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use russh::Channel;
use tokio::time::timeout;
use tracing::{debug, error, info};

use super::auth::AuthMethod;
use super::config::SshConfig;
use super::handler::SshHandler;
use crate::error::{Result, SshExecError};

/// An authenticated SSH connection
pub struct SshConnection {
    /// SSH configuration
    config: SshConfig,

    /// Authenticated session handle
    handle: Handle<SshHandler>,
}

impl SshConnection {
    /// Dial the server and authenticate
    ///
    /// If authentication fails after the transport is up, the transport is
    /// disconnected before the error is returned.
    pub async fn connect(config: SshConfig, auth: AuthMethod) -> Result<Self> {
        match config.connect_timeout {
            Some(limit) => match timeout(limit, Self::do_connect(config, auth)).await {
                Ok(result) => result,
                Err(_) => {
                    error!("SSH connection timeout after {:?}", limit);
                    Err(SshExecError::connection(format!(
                        "Connection timeout after {:?}",
                        limit
                    )))
                }
            },
            None => Self::do_connect(config, auth).await,
        }
    }

    /// Internal connection logic
    async fn do_connect(config: SshConfig, auth: AuthMethod) -> Result<Self> {
        info!(
            "Connecting to SSH server {}:{}...",
            config.host, config.port
        );

        let ssh_config = Arc::new(client::Config::default());
        let handler = SshHandler::new(
            config.host.clone(),
            config.port,
            config.host_key_policy.clone(),
        );

        let mut handle = client::connect(ssh_config, (config.host.as_str(), config.port), handler)
            .await
            .map_err(|e| {
                error!("SSH connection failed: {:#}", e);
                SshExecError::connection(format!("{:#}", e))
            })?;

        if let Err(e) = Self::authenticate(&mut handle, &config.username, auth).await {
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "")
                .await;
            return Err(e);
        }

        info!(
            "Successfully connected to {}@{}:{}",
            config.username, config.host, config.port
        );

        Ok(Self { config, handle })
    }

    /// Authenticate with the SSH server
    async fn authenticate(
        handle: &mut Handle<SshHandler>,
        username: &str,
        auth: AuthMethod,
    ) -> Result<()> {
        let kind = auth.kind();
        debug!("Attempting {} authentication for user '{}'", kind, username);

        let auth_result = match auth {
            AuthMethod::Password(password) => handle
                .authenticate_password(username, password)
                .await
                .map_err(|e| SshExecError::auth(e.to_string()))?,
            AuthMethod::PublicKey(key) => {
                // RSA keys need the server's preferred signature hash
                let hash_alg = handle
                    .best_supported_rsa_hash()
                    .await
                    .map_err(|e| SshExecError::auth(e.to_string()))?
                    .flatten();

                handle
                    .authenticate_publickey(username, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await
                    .map_err(|e| SshExecError::auth(e.to_string()))?
            }
        };

        if auth_result.success() {
            info!("Authentication successful");
            Ok(())
        } else {
            error!("Server rejected {} authentication for '{}'", kind, username);
            Err(SshExecError::auth(format!(
                "server rejected credentials for user '{}'",
                username
            )))
        }
    }

    /// Open a new session channel
    pub async fn open_channel(&self) -> Result<Channel<client::Msg>> {
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| SshExecError::session(e.to_string()))
    }

    /// Close the SSH connection
    pub async fn close(self) {
        if let Err(e) = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
        {
            debug!("Disconnect reported an error: {}", e);
        }

        info!(
            "SSH connection to {}:{} closed",
            self.config.host, self.config.port
        );
    }
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("username", &self.config.username)
            .finish()
    }
}

//! Command runner
//!
//! Drives one invocation end to end: resolve the authentication method,
//! connect, run the command, close the connection, build the report.

use std::io::Write;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::ssh::{resolve_auth_method, AuthMethod, CommandOutput, SshConfig, SshConnection};

/// Header printed before the command output
pub const REPORT_HEADER: &str = "Server output for command:";

/// Opens remote sessions
#[async_trait]
pub trait Connector: Send + Sync {
    /// Dial and authenticate
    async fn connect(&self, config: SshConfig, auth: AuthMethod)
        -> Result<Box<dyn RemoteSession>>;
}

/// An open, authenticated remote session
#[async_trait]
pub trait RemoteSession: Send {
    /// Run one command and return whatever it produced
    async fn exec(&mut self, command: &str) -> Result<CommandOutput>;

    /// Release the session
    async fn close(self: Box<Self>);
}

/// Connector backed by russh
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        config: SshConfig,
        auth: AuthMethod,
    ) -> Result<Box<dyn RemoteSession>> {
        let connection = SshConnection::connect(config, auth).await?;
        Ok(Box::new(connection))
    }
}

#[async_trait]
impl RemoteSession for SshConnection {
    async fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        SshConnection::exec(self, command).await
    }

    async fn close(self: Box<Self>) {
        SshConnection::close(*self).await
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The command that was executed
    pub command: String,

    /// Captured standard output
    pub output: Vec<u8>,
}

impl Report {
    /// Create a new report
    pub fn new(command: impl Into<String>, output: Vec<u8>) -> Self {
        Self {
            command: command.into(),
            output,
        }
    }

    /// Write the header line followed by the output verbatim
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {}", REPORT_HEADER, self.command)?;
        write!(f, "{}", String::from_utf8_lossy(&self.output))
    }
}

/// Runs a single command described by a [`Config`]
#[derive(Debug, Clone)]
pub struct Runner<C = SshConnector> {
    connector: C,
}

impl Runner<SshConnector> {
    /// Runner that talks to real SSH servers
    pub fn ssh() -> Self {
        Self::new(SshConnector)
    }
}

impl<C: Connector> Runner<C> {
    /// Create a runner over the given connector
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Execute the configured command
    ///
    /// Halts at the first failure. Once connected, the session is closed on
    /// every path before this returns.
    pub async fn run(&self, config: &Config) -> Result<Report> {
        let auth = resolve_auth_method(&config.credential).await?;

        let mut session = self.connector.connect(config.ssh_config(), auth).await?;

        debug!("Running command: {}", config.command);
        let result = session
            .exec(&config.command)
            .await
            .and_then(CommandOutput::into_success);

        session.close().await;

        let output = result?;
        Ok(Report::new(&config.command, output.stdout))
    }
}

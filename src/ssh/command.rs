//! Command execution over SSH
//!
//! Provides the `CommandOutput` struct and `exec` for running one command
//! over one session channel.

use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tracing::debug;

use super::connection::SshConnection;
use crate::error::{Result, SshExecError};

/// Output from a command execution
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output from the command
    pub stdout: Vec<u8>,

    /// Standard error from the command
    pub stderr: Vec<u8>,

    /// Exit status of the command (if reported)
    pub exit_status: Option<u32>,

    /// Signal that terminated the command (if any)
    pub exit_signal: Option<String>,

    /// The server answered the exec request with a failure
    pub exec_refused: bool,
}

impl CommandOutput {
    /// Create a new empty CommandOutput
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the command succeeded (exit status reported and 0)
    pub fn success(&self) -> bool {
        !self.exec_refused && self.exit_signal.is_none() && self.exit_status == Some(0)
    }

    /// Standard output decoded as text
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Turn an unsuccessful run into an execution error
    ///
    /// The error carries the exit status or signal and any stderr text.
    pub fn into_success(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        let reason = match (&self.exit_signal, self.exit_status) {
            _ if self.exec_refused => "server refused exec request".to_string(),
            (Some(signal), _) => format!("terminated by signal {}", signal),
            (None, Some(code)) => format!("exited with status {}", code),
            (None, None) => "channel closed without exit status".to_string(),
        };

        let stderr = String::from_utf8_lossy(&self.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(SshExecError::execution(reason))
        } else {
            Err(SshExecError::execution(format!("{}: {}", reason, stderr)))
        }
    }
}

impl SshConnection {
    /// Execute a command over a new session channel
    ///
    /// The command is sent verbatim; the remote shell interprets it.
    ///
    /// # Returns
    /// * `Ok(CommandOutput)` - Whatever the command produced, successful or not
    /// * `Err(SshExecError::Session)` - The channel could not be opened
    /// * `Err(SshExecError::Execution)` - The exec request failed
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.open_channel().await?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| SshExecError::execution(format!("exec request failed: {}", e)))?;

        let (output, closed) = collect_channel_output(&mut channel).await;

        if !closed {
            let _ = channel.close().await;
        }

        debug!(
            "Command completed: exit_status={:?}, exit_signal={:?}, stdout_len={}, stderr_len={}",
            output.exit_status,
            output.exit_signal,
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(output)
    }
}

/// Collect output from a channel until it closes
///
/// Exit status may arrive after EOF, so reading continues until the channel
/// is closed. Returns whether the server closed the channel.
async fn collect_channel_output(channel: &mut Channel<Msg>) -> (CommandOutput, bool) {
    let mut output = CommandOutput::new();

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { data } => {
                output.stdout.extend_from_slice(&data);
            }
            ChannelMsg::ExtendedData { data, ext } => {
                // ext == 1 is stderr
                if ext == 1 {
                    output.stderr.extend_from_slice(&data);
                }
            }
            ChannelMsg::ExitStatus { exit_status } => {
                output.exit_status = Some(exit_status);
            }
            ChannelMsg::ExitSignal {
                signal_name,
                error_message,
                ..
            } => {
                let signal = format!("{:?}", signal_name);
                output.exit_signal = Some(if error_message.is_empty() {
                    signal
                } else {
                    format!("{} ({})", signal, error_message)
                });
            }
            ChannelMsg::Failure => {
                debug!("Server refused the exec request");
                output.exec_refused = true;
            }
            ChannelMsg::Close => return (output, true),
            _ => {}
        }
    }

    (output, false)
}

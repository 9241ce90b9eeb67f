//! Configuration and CLI argument parsing for ssh-exec

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{Result, SshExecError};
use crate::ssh::{Credential, HostKeyPolicy, SshConfig};

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Long flags that are also accepted with a single leading dash
/// (`-server host`, `-command=uptime`).
pub const SINGLE_DASH_FLAGS: &[&str] = &["server", "username", "password", "key", "command"];

/// Long options whose value may be given as the next argument
const VALUE_FLAGS: &[&str] = &[
    "server",
    "host",
    "port",
    "username",
    "user",
    "password",
    "key",
    "key-passphrase",
    "command",
    "host-key-policy",
    "known-hosts",
    "connect-timeout",
];

/// ssh-exec CLI Arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "ssh-exec")]
#[command(version)]
#[command(about = "Run a single command on a remote host over SSH")]
pub struct Args {
    /// Remote host to connect to
    #[arg(long, visible_alias = "host", env = "SSH_EXEC_SERVER", allow_hyphen_values = true)]
    pub server: Option<String>,

    /// SSH port
    #[arg(long, default_value_t = DEFAULT_PORT, env = "SSH_EXEC_PORT")]
    pub port: u16,

    /// Remote login user
    #[arg(long, visible_alias = "user", env = "SSH_EXEC_USERNAME", allow_hyphen_values = true)]
    pub username: Option<String>,

    /// SSH password (preferred over --key when both are given)
    #[arg(
        long,
        env = "SSH_EXEC_PASSWORD",
        hide_env_values = true,
        allow_hyphen_values = true
    )]
    pub password: Option<String>,

    /// Path to SSH private key file (alternative to password)
    #[arg(long, env = "SSH_EXEC_KEY", allow_hyphen_values = true)]
    pub key: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    #[arg(
        long,
        env = "SSH_EXEC_KEY_PASSPHRASE",
        hide_env_values = true,
        allow_hyphen_values = true
    )]
    pub key_passphrase: Option<String>,

    /// Command line to execute on the remote host
    #[arg(long, env = "SSH_EXEC_COMMAND", allow_hyphen_values = true)]
    pub command: Option<String>,

    /// How the server's host key is checked
    #[arg(
        long,
        value_enum,
        default_value_t = HostKeyMode::InsecureAcceptAny,
        env = "SSH_EXEC_HOST_KEY_POLICY"
    )]
    pub host_key_policy: HostKeyMode,

    /// known_hosts file used by `--host-key-policy known-hosts`
    /// (default: ~/.ssh/known_hosts)
    #[arg(long, env = "SSH_EXEC_KNOWN_HOSTS", allow_hyphen_values = true)]
    pub known_hosts: Option<PathBuf>,

    /// Seconds allowed for connecting and authenticating.
    /// Unset or 0 waits indefinitely.
    #[arg(long, env = "SSH_EXEC_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<u64>,
}

/// Host key checking mode selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostKeyMode {
    /// Accept any host key. Not suitable for production use.
    InsecureAcceptAny,
    /// Verify the host key against a known_hosts file
    KnownHosts,
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote host
    pub server: String,

    /// SSH port
    pub port: u16,

    /// Remote login user
    pub username: String,

    /// Credential used to authenticate
    pub credential: Credential,

    /// Remote command, passed verbatim
    pub command: String,

    /// Host key checking policy
    pub host_key_policy: HostKeyPolicy,

    /// Bound on dial + authentication (None = wait indefinitely)
    pub connect_timeout: Option<Duration>,
}

impl Config {
    /// Create Config from CLI Args
    ///
    /// Performs no I/O. The key file is only touched later, and only when
    /// no password was supplied.
    pub fn from_args(args: Args) -> Result<Self> {
        let server = non_empty(args.server);
        let username = non_empty(args.username);
        let command = non_empty(args.command);
        let password = non_empty(args.password);
        let key = args.key.filter(|p| !p.as_os_str().is_empty());

        let mut errors = Vec::new();

        if server.is_none() {
            errors.push("Missing required --server".to_string());
        }

        if username.is_none() {
            errors.push("Missing required --username".to_string());
        }

        if command.is_none() {
            errors.push("Missing required --command".to_string());
        }

        // Password wins when both are present
        let credential = match (password, key) {
            (Some(password), _) => Some(Credential::Password(password)),
            (None, Some(path)) => Some(Credential::KeyFile {
                path,
                passphrase: non_empty(args.key_passphrase),
            }),
            (None, None) => {
                errors.push(
                    "No authentication method: provide either --password or --key".to_string(),
                );
                None
            }
        };

        let (Some(server), Some(username), Some(command), Some(credential)) =
            (server, username, command, credential)
        else {
            return Err(SshExecError::invalid_invocation(errors.join("; ")));
        };

        let host_key_policy = match args.host_key_policy {
            HostKeyMode::InsecureAcceptAny => HostKeyPolicy::InsecureAcceptAny,
            HostKeyMode::KnownHosts => HostKeyPolicy::KnownHosts {
                path: args.known_hosts,
            },
        };

        Ok(Config {
            server,
            port: args.port,
            username,
            credential,
            command,
            host_key_policy,
            connect_timeout: parse_connect_timeout(args.connect_timeout),
        })
    }

    /// Connection parameters for the SSH layer
    pub fn ssh_config(&self) -> SshConfig {
        SshConfig::new(&self.server, &self.username)
            .with_port(self.port)
            .with_host_key_policy(self.host_key_policy.clone())
            .with_connect_timeout(self.connect_timeout)
    }
}

/// Parse connect timeout argument
///
/// - None or 0 → None (wait indefinitely)
/// - positive → Some(seconds)
pub fn parse_connect_timeout(value: Option<u64>) -> Option<Duration> {
    value.filter(|&secs| secs > 0).map(Duration::from_secs)
}

/// Rewrite single-dash long flags (`-server`, `-command=ls`) to the
/// double-dash form clap expects.
///
/// The argument following a value-taking flag is its value and is never
/// rewritten, so `-password -key` sets the password to `-key`. Arguments
/// after `--` are left untouched.
pub fn normalize_flag_style<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut value_pending = false;

    while let Some(arg) = args.next() {
        if value_pending {
            value_pending = false;
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if text == "--" {
            normalized.push(arg);
            normalized.extend(args);
            break;
        }

        let (name, inline_value) = match text.split_once('=') {
            Some((name, _)) => (name, true),
            None => (text, false),
        };

        if let Some(long) = name.strip_prefix("--") {
            value_pending = !inline_value && VALUE_FLAGS.contains(&long);
            normalized.push(arg);
        } else if name
            .strip_prefix('-')
            .is_some_and(|short| SINGLE_DASH_FLAGS.contains(&short))
        {
            value_pending = !inline_value;
            normalized.push(OsString::from(format!("-{text}")));
        } else {
            normalized.push(arg);
        }
    }

    normalized
}

/// Return None if empty
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

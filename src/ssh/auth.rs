//! Authentication method selection
//!
//! Turns the validated [`Credential`] into an [`AuthMethod`] ready for the
//! SSH handshake. A password always wins; the key file is only read when no
//! password was supplied.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use russh::keys::{decode_secret_key, PrivateKey};
use tracing::debug;

use crate::error::{Result, SshExecError};

/// Credential supplied on the command line
#[derive(Clone)]
pub enum Credential {
    /// Password authentication
    Password(String),

    /// Public key authentication from a private key file
    KeyFile {
        path: PathBuf,
        passphrase: Option<String>,
    },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
            Credential::KeyFile { path, passphrase } => f
                .debug_struct("KeyFile")
                .field("path", path)
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

/// Resolved authentication method
#[derive(Clone)]
pub enum AuthMethod {
    /// Password credential
    Password(String),

    /// Parsed private key
    PublicKey(Arc<PrivateKey>),
}

impl AuthMethod {
    /// Short name used in logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::Password(_) => "password",
            AuthMethod::PublicKey(_) => "public key",
        }
    }
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
            AuthMethod::PublicKey(key) => f
                .debug_tuple("PublicKey")
                .field(&key.algorithm().to_string())
                .finish(),
        }
    }
}

/// Resolve the authentication method for a credential
///
/// # Returns
/// * `Ok(AuthMethod::Password)` - A password was supplied; no file is read
/// * `Ok(AuthMethod::PublicKey)` - The key file was read and parsed
/// * `Err(SshExecError::KeyRead)` - The key file could not be read
/// * `Err(SshExecError::KeyParse)` - The key file is not a usable private key
pub async fn resolve_auth_method(credential: &Credential) -> Result<AuthMethod> {
    match credential {
        Credential::Password(password) => {
            debug!("Using password authentication");
            Ok(AuthMethod::Password(password.clone()))
        }
        Credential::KeyFile { path, passphrase } => {
            let key = load_private_key(path, passphrase.as_deref()).await?;
            debug!(
                "Loaded {} private key from {}",
                key.algorithm(),
                path.display()
            );
            Ok(AuthMethod::PublicKey(Arc::new(key)))
        }
    }
}

/// Read and parse a private key file
async fn load_private_key(path: &Path, passphrase: Option<&str>) -> Result<PrivateKey> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| SshExecError::KeyRead {
            path: path.to_path_buf(),
            source,
        })?;

    parse_private_key(&raw, passphrase)
}

/// Parse private key bytes (OpenSSH, PEM or PKCS#8)
pub fn parse_private_key(raw: &[u8], passphrase: Option<&str>) -> Result<PrivateKey> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| SshExecError::key_parse("key file is not valid UTF-8 text"))?;

    decode_secret_key(text, passphrase).map_err(|e| SshExecError::key_parse(e.to_string()))
}

//! Test support utilities
//!
//! An in-process SSH server with scripted command replies.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use russh::keys::{PrivateKey, PublicKey};
use russh::server::{self, Auth, Msg, Session};
use russh::{Channel, ChannelId, CryptoVec};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const USER: &str = "tester";
pub const PASSWORD: &str = "correct-horse";

/// Path of a file under tests/fixtures
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture should exist")
}

/// Public key parsed from an OpenSSH `.pub` fixture (comment dropped)
#[allow(dead_code)]
pub fn fixture_public_key(name: &str) -> PublicKey {
    let line = read_fixture(name);
    let base64 = line.split_whitespace().nth(1).expect("key field");
    russh::keys::parse_public_key_base64(base64).expect("valid public key")
}

/// Scripted reply for one command
#[derive(Debug, Clone)]
pub struct Reply {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_status: u32,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
            exit_status: 0,
        }
    }

    pub fn failed(exit_status: u32, stderr: &str) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            exit_status,
        }
    }
}

struct State {
    authorized_key: Option<PublicKey>,
    replies: HashMap<String, Reply>,
    executed: Mutex<Vec<String>>,
}

/// Mock server configuration
#[derive(Default)]
pub struct MockServerBuilder {
    authorized_key: Option<PublicKey>,
    replies: HashMap<String, Reply>,
}

impl MockServerBuilder {
    /// Accept this public key for USER
    #[allow(dead_code)]
    pub fn authorize_key(mut self, key: PublicKey) -> Self {
        self.authorized_key = Some(key);
        self
    }

    /// Reply to `command` with `reply`
    pub fn reply(mut self, command: &str, reply: Reply) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    pub async fn start(self) -> MockServer {
        let host_key = PrivateKey::from_openssh(read_fixture("host_ed25519"))
            .expect("valid host key fixture");

        let config = Arc::new(server::Config {
            keys: vec![host_key],
            auth_rejection_time: Duration::from_millis(10),
            auth_rejection_time_initial: Some(Duration::ZERO),
            ..Default::default()
        });

        let state = Arc::new(State {
            authorized_key: self.authorized_key,
            replies: self.replies,
            executed: Mutex::new(Vec::new()),
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let port = listener.local_addr().expect("local addr").port();

        let accept_state = state.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let config = config.clone();
                let handler = MockHandler::new(accept_state.clone());
                tokio::spawn(async move {
                    if let Ok(session) = server::run_stream(config, stream, handler).await {
                        let _ = session.await;
                    }
                });
            }
        });

        MockServer { port, state, task }
    }
}

/// Running mock SSH server on 127.0.0.1
pub struct MockServer {
    pub port: u16,
    state: Arc<State>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder::default()
    }

    /// Commands received so far
    pub fn executed(&self) -> Vec<String> {
        self.state.executed.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct MockHandler {
    state: Arc<State>,
    channels: HashMap<ChannelId, Channel<Msg>>,
}

impl MockHandler {
    fn new(state: Arc<State>) -> Self {
        Self {
            state,
            channels: HashMap::new(),
        }
    }
}

impl server::Handler for MockHandler {
    type Error = russh::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        if user == USER && password == PASSWORD {
            Ok(Auth::Accept)
        } else {
            Ok(Auth::reject())
        }
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        let authorized = self
            .state
            .authorized_key
            .as_ref()
            .is_some_and(|key| key.key_data() == public_key.key_data());

        if user == USER && authorized {
            Ok(Auth::Accept)
        } else {
            Ok(Auth::reject())
        }
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        self.channels.insert(channel.id(), channel);
        Ok(true)
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        let command = String::from_utf8_lossy(data).into_owned();
        self.state.executed.lock().unwrap().push(command.clone());

        let reply = self
            .state
            .replies
            .get(&command)
            .cloned()
            .unwrap_or_else(|| Reply::failed(127, &format!("sh: {}: not found\n", command)));

        let _ = session.channel_success(channel);
        if !reply.stdout.is_empty() {
            let _ = session.data(channel, CryptoVec::from(reply.stdout));
        }
        if !reply.stderr.is_empty() {
            let _ = session.extended_data(channel, 1, CryptoVec::from(reply.stderr));
        }
        // OpenSSH order: EOF, exit-status, close
        let _ = session.eof(channel);
        let _ = session.exit_status_request(channel, reply.exit_status);
        let _ = session.close(channel);
        Ok(())
    }
}

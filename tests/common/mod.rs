//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use arena_server::config::ServerSettings;
use arena_server::subsystems::{
    RecoveryError, StateRecovery, StorageCredentials, StorageError, StorageManager, Subsystem,
};
use arena_server::{Server, ServerState};

/// Ordered log of lifecycle notifications shared by recording collaborators.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// A subsystem that records every hook it receives.
pub struct Recorder {
    name: &'static str,
    journal: Journal,
}

impl Recorder {
    pub fn new(name: &'static str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name,
            journal: journal.clone(),
        })
    }
}

impl Subsystem for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn set_server_started(&self, started: bool) {
        let event = if started { "started" } else { "stopped" };
        self.journal.record(format!("{}:{event}", self.name));
    }

    fn pause(&self) {
        self.journal.record(format!("{}:paused", self.name));
    }

    fn resume(&self) {
        self.journal.record(format!("{}:resumed", self.name));
    }
}

/// A storage collaborator that succeeds or fails on demand.
pub struct RecordingStorage {
    recorder: Arc<Recorder>,
    fail: bool,
}

impl RecordingStorage {
    pub fn new(journal: &Journal, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            recorder: Recorder::new("storage", journal),
            fail,
        })
    }
}

impl Subsystem for RecordingStorage {
    fn name(&self) -> &'static str {
        self.recorder.name()
    }

    fn set_server_started(&self, started: bool) {
        self.recorder.set_server_started(started);
    }

    fn pause(&self) {
        self.recorder.pause();
    }

    fn resume(&self) {
        self.recorder.resume();
    }
}

#[async_trait]
impl StorageManager for RecordingStorage {
    async fn initialize(&self, credentials: StorageCredentials) -> Result<(), StorageError> {
        self.recorder.journal.record("storage:initialize");
        if self.fail {
            return Err(StorageError::Init(format!(
                "connection refused by {}:{}",
                credentials.ip, credentials.port
            )));
        }
        Ok(())
    }
}

/// Records where it was asked to persist.
#[derive(Default)]
pub struct RecordingRecovery {
    pub locations: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl StateRecovery for RecordingRecovery {
    async fn persist(&self, location: &Path) -> Result<(), RecoveryError> {
        self.locations.lock().unwrap().push(location.to_path_buf());
        Ok(())
    }
}

/// Default settings bound to loopback on `port`.
pub fn settings_on(port: u16) -> ServerSettings {
    let mut settings = ServerSettings::default();
    settings.network.ip = "127.0.0.1".to_string();
    settings.network.port = port;
    settings.lifecycle.grace_period_secs = 1;
    settings
}

/// Poll until the server reports a bound listener address.
pub async fn wait_for_listening(server: &Server) -> SocketAddr {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(addr) = server.local_addr().await {
                return addr;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("server did not start listening")
}

/// Poll until the server reaches `state`.
pub async fn wait_for_state(server: &Server, state: ServerState) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.state().await != state {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("server did not reach expected state");
}

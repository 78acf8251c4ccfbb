//! Session lifecycle manager: connection state, scan challenge, resets.
//!
//! The lifecycle manager is the single writer of session state; every
//! other component reads snapshots. It reacts to connector events and to
//! the explicit reconnect/disconnect commands, and owns the destructive
//! reset that follows an explicit logout: quiesce the connector, wipe
//! on-disk artifacts, clear every message record, then schedule a
//! reinitialization after a fixed delay.
//!
//! Teardown and cleanup failures are logged and swallowed -- they never
//! prevent the scheduled reinitialization and never surface to callers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use chatgate_types::session::{ConnectionState, SessionSnapshot};

use crate::connector::{ChatConnector, ConnectorEvent};
use crate::repository::MessageRepository;

/// Owns connection state and the destructive reset-and-reinitialize
/// procedure.
pub struct SessionLifecycle<C, R> {
    connector: Arc<C>,
    repo: R,
    state: RwLock<SessionSnapshot>,
    /// Cached media files, wiped on logout.
    media_dir: PathBuf,
    /// Connector authentication artifacts, wiped on logout.
    session_dir: PathBuf,
    reinit_delay: Duration,
}

impl<C, R> SessionLifecycle<C, R>
where
    C: ChatConnector,
    R: MessageRepository,
{
    pub fn new(
        connector: Arc<C>,
        repo: R,
        media_dir: PathBuf,
        session_dir: PathBuf,
        reinit_delay: Duration,
    ) -> Self {
        Self {
            connector,
            repo,
            state: RwLock::new(SessionSnapshot::disconnected()),
            media_dir,
            session_dir,
            reinit_delay,
        }
    }

    /// Point-in-time view of the session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    /// Apply a connector lifecycle event.
    pub async fn handle_event(&self, event: &ConnectorEvent) {
        match event {
            ConnectorEvent::ChallengeIssued { payload } => {
                info!("scan challenge issued");
                self.set_state(ConnectionState::AwaitingScan, Some(payload.clone()))
                    .await;
            }
            ConnectorEvent::Authenticated => {
                info!("challenge accepted, waiting for session");
            }
            ConnectorEvent::Ready => {
                info!("session connected");
                self.set_state(ConnectionState::Connected, None).await;
            }
            ConnectorEvent::SessionEnded { reason } => {
                info!(?reason, "session ended");
                self.set_state(ConnectionState::Disconnected, None).await;
                if reason.is_logout() {
                    self.reset_session().await;
                }
            }
            ConnectorEvent::MessageReceived(_) => {}
        }
    }

    /// Tear the connector down and schedule a fresh initialization.
    ///
    /// Returns once the reinitialization is *scheduled*, not completed.
    pub async fn reconnect(&self) {
        self.teardown_quietly().await;
        self.set_state(ConnectionState::Disconnected, None).await;
        self.schedule_reinitialize();
    }

    /// Tear the connector down and stay disconnected.
    pub async fn disconnect(&self) {
        self.teardown_quietly().await;
        self.set_state(ConnectionState::Disconnected, None).await;
    }

    /// Destructive reset after an explicit logout: the connector must be
    /// fully quiesced before any on-disk artifact is deleted, since the
    /// engine may still hold files open.
    async fn reset_session(&self) {
        self.teardown_quietly().await;

        clear_directory(&self.session_dir).await;
        clear_directory(&self.media_dir).await;

        if let Err(e) = self.repo.clear_all().await {
            warn!(error = %e, "failed to clear message records during reset");
        }

        self.schedule_reinitialize();
    }

    async fn teardown_quietly(&self) {
        if let Err(e) = self.connector.teardown().await {
            warn!(error = %e, "connector teardown failed");
        }
    }

    fn schedule_reinitialize(&self) {
        let connector = Arc::clone(&self.connector);
        let delay = self.reinit_delay;
        info!(delay_ms = delay.as_millis() as u64, "reinitialization scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = connector.initialize().await {
                warn!(error = %e, "scheduled reinitialization failed");
            }
        });
    }

    async fn set_state(&self, state: ConnectionState, challenge: Option<String>) {
        let mut guard = self.state.write().await;
        guard.state = state;
        guard.challenge = challenge;
    }
}

/// Remove everything inside `dir`, leaving the directory itself in place.
/// Errors are logged and swallowed.
async fn clear_directory(dir: &Path) {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to read directory during reset");
            return;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                let result = if is_dir {
                    tokio::fs::remove_dir_all(&path).await
                } else {
                    tokio::fs::remove_file(&path).await
                };
                if let Err(e) = result {
                    warn!(path = %path.display(), error = %e, "failed to delete session artifact");
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to walk directory during reset");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemoryMessageRepository;
    use crate::testing::{record, MockConnector};
    use chatgate_types::session::DisconnectReason;
    use std::sync::atomic::Ordering;

    struct Fixture {
        connector: Arc<MockConnector>,
        lifecycle: SessionLifecycle<MockConnector, Arc<InMemoryMessageRepository>>,
        media_dir: tempfile::TempDir,
        session_dir: tempfile::TempDir,
        repo: Arc<InMemoryMessageRepository>,
    }

    fn fixture() -> Fixture {
        let connector = Arc::new(MockConnector::new());
        let repo = Arc::new(InMemoryMessageRepository::new());
        let media_dir = tempfile::tempdir().unwrap();
        let session_dir = tempfile::tempdir().unwrap();
        let lifecycle = SessionLifecycle::new(
            Arc::clone(&connector),
            Arc::clone(&repo),
            media_dir.path().to_path_buf(),
            session_dir.path().to_path_buf(),
            Duration::from_millis(10),
        );
        Fixture {
            connector,
            lifecycle,
            media_dir,
            session_dir,
            repo,
        }
    }

    #[tokio::test]
    async fn challenge_then_ready_transitions() {
        let f = fixture();

        f.lifecycle
            .handle_event(&ConnectorEvent::ChallengeIssued {
                payload: "SCAN-ME".to_string(),
            })
            .await;
        let snap = f.lifecycle.snapshot().await;
        assert_eq!(snap.state, ConnectionState::AwaitingScan);
        assert_eq!(snap.challenge.as_deref(), Some("SCAN-ME"));

        f.lifecycle.handle_event(&ConnectorEvent::Ready).await;
        let snap = f.lifecycle.snapshot().await;
        assert_eq!(snap.state, ConnectionState::Connected);
        assert!(snap.challenge.is_none());
    }

    #[tokio::test]
    async fn logout_wipes_records_artifacts_and_schedules_reinit() {
        let f = fixture();
        f.repo.upsert(&record("a", "chat", 1)).await.unwrap();
        std::fs::write(f.media_dir.path().join("a.ogg"), b"x").unwrap();
        std::fs::write(f.session_dir.path().join("auth.json"), b"x").unwrap();

        f.lifecycle.handle_event(&ConnectorEvent::Ready).await;
        f.lifecycle
            .handle_event(&ConnectorEvent::SessionEnded {
                reason: DisconnectReason::Logout,
            })
            .await;

        let snap = f.lifecycle.snapshot().await;
        assert_eq!(snap.state, ConnectionState::Disconnected);
        assert!(snap.challenge.is_none());
        assert!(f.repo.is_empty().await);
        assert!(std::fs::read_dir(f.media_dir.path()).unwrap().next().is_none());
        assert!(std::fs::read_dir(f.session_dir.path()).unwrap().next().is_none());
        assert_eq!(f.connector.teardown_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.connector.initialize_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_logout_disconnect_takes_no_action() {
        let f = fixture();
        f.repo.upsert(&record("a", "chat", 1)).await.unwrap();
        std::fs::write(f.media_dir.path().join("a.ogg"), b"x").unwrap();

        f.lifecycle
            .handle_event(&ConnectorEvent::SessionEnded {
                reason: DisconnectReason::Other("navigation".to_string()),
            })
            .await;

        assert_eq!(
            f.lifecycle.snapshot().await.state,
            ConnectionState::Disconnected
        );
        assert_eq!(f.repo.len().await, 1);
        assert!(f.media_dir.path().join("a.ogg").exists());
        assert_eq!(f.connector.teardown_calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.connector.initialize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reconnect_schedules_reinitialize() {
        let f = fixture();
        f.lifecycle.reconnect().await;

        assert_eq!(
            f.lifecycle.snapshot().await.state,
            ConnectionState::Disconnected
        );
        assert_eq!(f.connector.teardown_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.connector.initialize_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disconnect_does_not_reinitialize() {
        let f = fixture();
        f.lifecycle.disconnect().await;

        assert_eq!(f.connector.teardown_calls.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.connector.initialize_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn teardown_failure_does_not_block_reinit() {
        let f = fixture();
        f.connector.fail_teardown.store(true, Ordering::SeqCst);

        f.lifecycle.reconnect().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(f.connector.initialize_calls.load(Ordering::SeqCst), 1);
    }
}

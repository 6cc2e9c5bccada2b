//! Periodic background saves of an active session.
//!
//! The autosaver snapshots the shared session every fixed interval while
//! the form step is active. It skips a tick rather than blocking when the
//! session is busy; explicit saves and the timer race benignly because both
//! overwrite the same slot with a full snapshot. Stopping (or dropping) the
//! autosaver aborts the task so no periodic work leaks past step teardown.

use super::ProgressStore;
use crate::form::FormSession;
use log::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time between automatic saves.
///
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Handle for a running autosave timer.
///
pub struct Autosaver {
    handle: JoinHandle<()>,
}

impl Autosaver {
    /// Spawn a task that saves the session every `interval` until stopped.
    ///
    pub fn start(
        session: Arc<Mutex<FormSession>>,
        store: ProgressStore,
        interval: Duration,
    ) -> Autosaver {
        debug!("Starting autosave every {:?}", interval);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; the session was just
            // loaded or restored, so there is nothing new to save yet.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match session.try_lock() {
                    Ok(session) => {
                        if !store.save(&session) {
                            warn!("Autosave skipped: storage unavailable");
                        }
                    }
                    Err(_) => debug!("Autosave skipped: session busy"),
                }
            }
        });
        Autosaver { handle }
    }

    /// Stop the timer. Equivalent to dropping the handle.
    ///
    pub fn stop(self) {
        debug!("Stopping autosave");
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::AnswerValue;
    use crate::progress::MemoryBackend;

    fn shared_session() -> Arc<Mutex<FormSession>> {
        let mut session = FormSession::new();
        session.set_answer("incidentCategory", AnswerValue::from("Other"));
        Arc::new(Mutex::new(session))
    }

    #[tokio::test]
    async fn test_autosaver_writes_snapshots_while_running() {
        let store = ProgressStore::new(Arc::new(MemoryBackend::new()));
        let session = shared_session();

        let autosaver = Autosaver::start(
            Arc::clone(&session),
            store.clone(),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(120)).await;
        autosaver.stop();

        let progress = store.load().expect("autosave should have written");
        assert_eq!(
            progress.form_data.get("incidentCategory"),
            Some(&AnswerValue::from("Other"))
        );
    }

    #[tokio::test]
    async fn test_stopped_autosaver_writes_nothing_further() {
        let store = ProgressStore::new(Arc::new(MemoryBackend::new()));
        let session = shared_session();

        let autosaver = Autosaver::start(
            Arc::clone(&session),
            store.clone(),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(120)).await;
        autosaver.stop();

        store.clear();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_autosaver_with_unavailable_storage_keeps_running() {
        let store = ProgressStore::new(Arc::new(MemoryBackend::unavailable()));
        let session = shared_session();

        let autosaver = Autosaver::start(Arc::clone(&session), store, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(autosaver);

        // The session itself is untouched by failed saves.
        let session = session.lock().unwrap();
        assert_eq!(session.current_step(), 1);
    }
}

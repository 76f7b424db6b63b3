//! The coordinator: single owner of the run's dedup/limit state.
//!
//! All state transitions funnel through one critical section: admission
//! decisions made by [`Coordinator::admit`] and the completion
//! callbacks invoked by download tasks. The network fetch itself runs
//! unsynchronized outside that section, so completions may interleave
//! in any order with admissions without ever violating the state
//! invariants.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::admission::{Decision, RejectReason, decide};
use super::state::CollectorState;
use crate::config::RunConfig;
use crate::download::{self, AvatarClient, DownloadError};
use crate::event::Event;

/// What the stream driver should do after delivering an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep delivering events.
    Continue,
    /// The target count is met; tear the stream down.
    Stop,
}

/// Outcome of the admission critical section for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The run's goal is met; no admission, stream should end.
    Stop,
    /// Discarded, with the first matching cause.
    Rejected(RejectReason),
    /// Admitted; the key is now in flight. `index` is the display
    /// index assigned under the lock (`saved + processing - 1`).
    Admitted {
        /// Display index for diagnostics.
        index: usize,
    },
}

/// Coordinates admissions, spawned download tasks, and completions for
/// one collection run.
#[derive(Debug)]
pub struct Coordinator {
    config: RunConfig,
    client: AvatarClient,
    state: Mutex<CollectorState>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Creates a coordinator with fresh state.
    #[must_use]
    pub fn new(config: RunConfig, client: AvatarClient) -> Self {
        Self {
            config,
            client,
            state: Mutex::new(CollectorState::new()),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Number of avatars saved so far.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.state().saved_count()
    }

    /// Number of downloads currently in flight.
    #[must_use]
    pub fn processing_count(&self) -> usize {
        self.state().processing_count()
    }

    /// Whether the target count has been reached.
    #[must_use]
    pub fn target_reached(&self) -> bool {
        self.state().saved_count() >= self.config.max
    }

    /// Runs the admission filter and, on admit, transitions the key
    /// into `processing` — all under the state lock.
    ///
    /// This is the whole read-modify-write for one event; two events
    /// can never interleave here, and a completion can never slip in
    /// between the decision and the state update.
    pub fn admit(&self, event: &Event) -> Admission {
        let mut state = self.state();
        match decide(event, &state, &self.config) {
            Decision::Stop => Admission::Stop,
            Decision::Reject(reason) => {
                debug!(user = %event.user_key, ?reason, "event rejected");
                Admission::Rejected(reason)
            }
            Decision::Admit => {
                state.begin(&event.user_key);
                let index = state.saved_count() + state.processing_count() - 1;
                Admission::Admitted { index }
            }
        }
    }

    /// Delivers one event: admission plus, when admitted, spawning the
    /// download task. Called serially by the stream driver.
    pub fn on_event(self: &Arc<Self>, event: Event) -> Flow {
        match self.admit(&event) {
            Admission::Stop => Flow::Stop,
            Admission::Rejected(_) => Flow::Continue,
            Admission::Admitted { index } => {
                let coordinator = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    coordinator.run_task(event, index).await;
                });
                let mut handles = self.handles_guard();
                // Reap finished tasks so the vec stays bounded by the
                // in-flight count, not the lifetime of the run.
                handles.retain(|h| !h.is_finished());
                handles.push(handle);
                Flow::Continue
            }
        }
    }

    /// Marks a key's download as successfully persisted.
    ///
    /// Returns `false` when other tasks already reached the target
    /// while this one was finishing: the slot is released but the
    /// result is not counted (documented race, not an error).
    pub fn on_task_success(&self, user_key: &str, index: usize, path: &Path) -> bool {
        let counted = self.state().complete(user_key, self.config.max);
        if counted {
            info!(index, user = %user_key, path = %path.display(), "avatar saved");
        } else {
            debug!(index, user = %user_key, "finished after target was met; not counted");
        }
        counted
    }

    /// Marks a key's download as failed: the slot is released, the key
    /// becomes eligible again for a later event, and the run goes on.
    pub fn on_task_failure(&self, user_key: &str, index: usize, error: &DownloadError) {
        self.state().release(user_key);
        warn!(index, user = %user_key, error = %error, "avatar download failed");
    }

    /// One spawned download task: fetch, sniff, persist, and report
    /// back exactly once.
    async fn run_task(self: Arc<Self>, event: Event, index: usize) {
        info!(
            index,
            screen_name = %event.screen_name,
            user = %event.user_key,
            "downloading avatar",
        );

        let payload = match self.client.fetch(&event.avatar_url).await {
            Ok(payload) => payload,
            Err(error) => return self.on_task_failure(&event.user_key, index, &error),
        };

        // Other tasks may have reached the target while the fetch was
        // outstanding; release the slot and skip the write.
        if self.target_reached() {
            self.state().release(&event.user_key);
            debug!(index, user = %event.user_key, "target reached mid-flight; discarding");
            return;
        }

        let Some(ext) = download::image_extension(&payload) else {
            let error = DownloadError::invalid_image(&event.avatar_url);
            return self.on_task_failure(&event.user_key, index, &error);
        };

        let key = self.config.file_key(&event);
        match download::save_avatar(&payload, self.config.output_dir(), key, ext).await {
            Ok(path) => {
                self.on_task_success(&event.user_key, index, &path);
            }
            Err(error) => self.on_task_failure(&event.user_key, index, &error),
        }
    }

    /// Awaits every outstanding download task. Called after the stream
    /// has stopped; in-flight tasks run to completion rather than being
    /// cancelled.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.handles_guard());
        debug!(task_count = handles.len(), "draining download tasks");
        for handle in handles {
            // Task panics are logged but don't fail the run.
            if let Err(e) = handle.await {
                warn!(error = %e, "download task panicked");
            }
        }
    }

    #[allow(clippy::expect_used)]
    fn state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().expect("collector state lock poisoned")
    }

    #[allow(clippy::expect_used)]
    fn handles_guard(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().expect("task handle lock poisoned")
    }
}

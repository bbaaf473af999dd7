/*
[INPUT]:  GenerationApi backend, prompt submission, image picks, progress refreshes
[OUTPUT]: TaskSnapshot (current task + error) via `watch`, view/poll decisions
[POS]:    State layer - single owner of the in-progress creation task
[UPDATE]: When the creation flow changes or task polling cadence changes
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use meshcraft_adapter::{GenerationApi, GenerationTask, MeshcraftError, TaskStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ErrorNotice, StoreError};
use crate::task_view::{TaskView, select_view};

/// Refresh cadence while the backend is working on the task
pub const TASK_POLL_INTERVAL: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task: Option<GenerationTask>,
    #[serde(skip)]
    pub submitting: bool,
    #[serde(skip)]
    pub error: Option<ErrorNotice>,
}

pub struct TaskStore<B: ?Sized> {
    backend: Arc<B>,
    state: watch::Sender<TaskSnapshot>,
    /// Bumped on submit/reset so responses for a discarded task are ignored
    epoch: AtomicU64,
}

impl<B: GenerationApi + ?Sized> TaskStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _rx) = watch::channel(TaskSnapshot::default());
        Self {
            backend,
            state,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> Option<GenerationTask> {
        self.state.borrow().task.clone()
    }

    /// Screen for the current task, `None` when nothing is in progress
    pub fn view(&self) -> Option<TaskView> {
        self.state.borrow().task.as_ref().map(select_view)
    }

    /// How long to wait before the next refresh; `None` when waiting on the user or done
    pub fn polling_interval(&self) -> Option<Duration> {
        let state = self.state.borrow();
        let task = state.task.as_ref()?;
        task.status.is_active().then_some(TASK_POLL_INTERVAL)
    }

    /// Start a new task, discarding the previous one
    pub async fn submit(&self, prompt: &str) -> Result<GenerationTask, StoreError> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(TaskSnapshot {
            task: None,
            submitting: true,
            error: None,
        });

        let result = self.backend.create_task(prompt).await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return result.map_err(StoreError::from);
        }

        match result {
            Ok(task) => {
                info!(task_id = %task.id, "generation task submitted");
                self.state.send_replace(TaskSnapshot {
                    task: Some(task.clone()),
                    submitting: false,
                    error: None,
                });
                Ok(task)
            }
            Err(err) => {
                warn!(error = %err, "failed to submit generation task");
                self.record_failure(&err);
                Err(err.into())
            }
        }
    }

    /// Fetch the latest state of the current task and replace it wholesale
    pub async fn refresh(&self) -> Result<GenerationTask, StoreError> {
        let task_id = self.current().ok_or(StoreError::NoActiveTask)?.id;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let result = self.backend.task(&task_id).await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(%task_id, "task was discarded during refresh");
            return Err(StoreError::Cancelled);
        }

        match result {
            Ok(task) => {
                if task.status == TaskStatus::Failed {
                    warn!(%task_id, error = ?task.error, "generation failed");
                }
                self.state.send_modify(|s| {
                    s.task = Some(task.clone());
                    s.error = None;
                });
                Ok(task)
            }
            Err(err) => {
                warn!(%task_id, error = %err, "failed to refresh generation task");
                self.record_failure(&err);
                Err(err.into())
            }
        }
    }

    /// Pick an image and start model generation
    pub async fn select_image(&self, index: usize) -> Result<GenerationTask, StoreError> {
        let task = self.current().ok_or(StoreError::NoActiveTask)?;
        if index >= task.images.len() {
            return Err(StoreError::InvalidSelection {
                index,
                len: task.images.len(),
            });
        }
        let epoch = self.epoch.load(Ordering::SeqCst);

        let updated = self.backend.select_image(&task.id, index).await?;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Err(StoreError::Cancelled);
        }
        info!(task_id = %task.id, index, "image selected");
        self.state.send_modify(|s| {
            s.task = Some(updated.clone());
            s.error = None;
        });
        Ok(updated)
    }

    /// Drop the current task (new task, navigation away, logout)
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(TaskSnapshot::default());
    }

    pub fn restore(&self, snapshot: TaskSnapshot) {
        self.state.send_modify(|s| s.task = snapshot.task);
    }

    fn record_failure(&self, err: &MeshcraftError) {
        let notice = ErrorNotice::from(err);
        self.state.send_modify(|s| {
            s.submitting = false;
            s.error = Some(notice);
        });
    }
}

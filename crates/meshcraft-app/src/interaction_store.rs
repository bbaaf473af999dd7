/*
[INPUT]:  GalleryApi backend, like/favorite taps keyed by model id
[OUTPUT]: InteractionSnapshot (per-model flags + in-flight set) via `watch`
[POS]:    State layer - duplicate-tap guard and commit-on-success toggles
[UPDATE]: When interaction kinds are added or the toggle contract changes
*/

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use meshcraft_adapter::{GalleryApi, InteractionStatus, ToggleOutcome};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    pub statuses: HashMap<String, InteractionStatus>,
    /// Model ids with a toggle waiting on the backend
    #[serde(skip)]
    pub in_flight: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Toggle {
    Like,
    Favorite,
}

/// Removes the id from the in-flight set however the toggle ends
struct InFlightGuard<'a> {
    state: &'a watch::Sender<InteractionSnapshot>,
    model_id: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.in_flight.remove(self.model_id);
        });
    }
}

pub struct InteractionStore<B: ?Sized> {
    backend: Arc<B>,
    state: watch::Sender<InteractionSnapshot>,
}

impl<B: GalleryApi + ?Sized> InteractionStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _rx) = watch::channel(InteractionSnapshot::default());
        Self { backend, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<InteractionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        self.state.borrow().clone()
    }

    /// Flags for a model; all false when never loaded
    pub fn status(&self, model_id: &str) -> InteractionStatus {
        self.state
            .borrow()
            .statuses
            .get(model_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_in_flight(&self, model_id: &str) -> bool {
        self.state.borrow().in_flight.contains(model_id)
    }

    pub async fn toggle_like(&self, model_id: &str) -> Result<ToggleOutcome, StoreError> {
        self.toggle(model_id, Toggle::Like).await
    }

    pub async fn toggle_favorite(&self, model_id: &str) -> Result<ToggleOutcome, StoreError> {
        self.toggle(model_id, Toggle::Favorite).await
    }

    async fn toggle(&self, model_id: &str, kind: Toggle) -> Result<ToggleOutcome, StoreError> {
        let accepted = self
            .state
            .send_if_modified(|s| s.in_flight.insert(model_id.to_string()));
        if !accepted {
            debug!(model_id, ?kind, "toggle rejected, request already in flight");
            return Err(StoreError::AlreadyInFlight {
                model_id: model_id.to_string(),
            });
        }
        let _guard = InFlightGuard {
            state: &self.state,
            model_id,
        };

        let result = match kind {
            Toggle::Like => self.backend.toggle_like(model_id).await,
            Toggle::Favorite => self.backend.toggle_favorite(model_id).await,
        };

        match result {
            Ok(outcome) => {
                self.state.send_modify(|s| {
                    let entry = s.statuses.entry(model_id.to_string()).or_default();
                    match kind {
                        Toggle::Like => entry.is_liked = outcome.active,
                        Toggle::Favorite => entry.is_favorited = outcome.active,
                    }
                });
                Ok(outcome)
            }
            Err(err) => {
                warn!(model_id, ?kind, error = %err, "toggle failed; status unchanged");
                Err(err.into())
            }
        }
    }

    /// Fetch flags for `model_ids` and merge them in
    pub async fn load_statuses(&self, model_ids: &[String]) -> Result<(), StoreError> {
        if model_ids.is_empty() {
            return Ok(());
        }
        let statuses = self.backend.interaction_statuses(model_ids).await?;
        self.state.send_modify(|s| s.statuses.extend(statuses));
        Ok(())
    }

    pub fn restore(&self, snapshot: InteractionSnapshot) {
        self.state.send_modify(|s| s.statuses = snapshot.statuses);
    }

    pub fn clear(&self) {
        self.state.send_modify(|s| s.statuses.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use std::time::Duration;

    fn store() -> (Arc<FakeBackend>, Arc<InteractionStore<FakeBackend>>) {
        let fake = Arc::new(FakeBackend::default());
        (fake.clone(), Arc::new(InteractionStore::new(fake)))
    }

    #[tokio::test]
    async fn test_toggle_like_updates_status() {
        let (_fake, store) = store();
        let outcome = store.toggle_like("m1").await.expect("like");
        assert_eq!(outcome, ToggleOutcome { active: true, count: 1 });
        assert!(store.status("m1").is_liked);
        assert!(!store.status("m1").is_favorited);
        assert!(!store.is_in_flight("m1"));
    }

    #[tokio::test]
    async fn test_second_toggle_rejected_while_in_flight() {
        let (fake, store) = store();
        *fake.toggle_delay.lock().unwrap() = Duration::from_millis(60);

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_like("m1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_in_flight("m1"));

        let err = store.toggle_like("m1").await.expect_err("duplicate");
        assert!(matches!(err, StoreError::AlreadyInFlight { .. }));
        assert_eq!(fake.calls("like:m1"), 1);

        first.await.expect("join").expect("first toggle");
        *fake.toggle_delay.lock().unwrap() = Duration::ZERO;

        let outcome = store.toggle_like("m1").await.expect("accepted after resolve");
        assert!(!outcome.active);
        assert_eq!(fake.calls("like:m1"), 2);
    }

    #[tokio::test]
    async fn test_failed_toggle_releases_and_keeps_status() {
        let (fake, store) = store();
        store.toggle_favorite("m1").await.expect("favorite");
        assert!(store.status("m1").is_favorited);

        fake.set_fail_writes(true);
        assert!(store.toggle_favorite("m1").await.is_err());
        assert!(store.status("m1").is_favorited);
        assert!(!store.is_in_flight("m1"));

        fake.set_fail_writes(false);
        let outcome = store.toggle_favorite("m1").await.expect("retry accepted");
        assert!(!outcome.active);
    }

    #[tokio::test]
    async fn test_different_models_do_not_block() {
        let (fake, store) = store();
        *fake.toggle_delay.lock().unwrap() = Duration::from_millis(30);

        let (a, b) = tokio::join!(store.toggle_like("m1"), store.toggle_like("m2"));
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_toggle_releases_id() {
        let (fake, store) = store();
        *fake.toggle_delay.lock().unwrap() = Duration::from_millis(200);

        let pending = {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_like("m1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        pending.abort();
        let _ = pending.await;

        assert!(!store.is_in_flight("m1"));
    }

    #[tokio::test]
    async fn test_load_statuses_and_clear() {
        let (fake, store) = store();
        fake.likes.lock().unwrap().insert("m1".to_string(), (true, 5));

        store
            .load_statuses(&["m1".to_string(), "m2".to_string()])
            .await
            .expect("load");
        assert!(store.status("m1").is_liked);
        assert!(!store.status("m2").is_liked);

        store.clear();
        assert!(!store.status("m1").is_liked);
    }
}

/*
[INPUT]:  AppConfig, backend implementation, key-value storage, session
[OUTPUT]: App wiring every store to one backend + persistence and logout
[POS]:    Coordination layer - owns stores, session and snapshot storage
[UPDATE]: When adding a store or changing what survives a restart
*/

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use futures_util::future;
use meshcraft_adapter::{
    GalleryApi, GenerationApi, GuardDecision, MeshcraftClient, PrinterApi, PrinterStatus, Route,
    SessionManager, SortBy, TokenData, guard,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::gallery_store::{GallerySnapshot, GalleryStore};
use crate::interaction_store::{InteractionSnapshot, InteractionStore};
use crate::printer_store::{PrinterSnapshot, PrinterStore};
use crate::state::storage::{JsonFileStore, KeyValueStore, load_snapshot, save_snapshot};
use crate::task_store::{TaskSnapshot, TaskStore};

pub const SESSION_KEY: &str = "session";
pub const PRINTERS_KEY: &str = "printers";
pub const INTERACTIONS_KEY: &str = "interactions";
pub const TASK_KEY: &str = "task";
pub const GALLERY_KEY: &str = "gallery";

const ALL_KEYS: [&str; 5] = [SESSION_KEY, PRINTERS_KEY, INTERACTIONS_KEY, TASK_KEY, GALLERY_KEY];

/// Everything the stores need from the backend
pub trait Backend: PrinterApi + GalleryApi + GenerationApi {}

impl<T: PrinterApi + GalleryApi + GenerationApi + ?Sized> Backend for T {}

pub struct App<B: ?Sized> {
    pub session: SessionManager,
    pub printers: Arc<PrinterStore<B>>,
    pub gallery: Arc<GalleryStore<B>>,
    pub interactions: Arc<InteractionStore<B>>,
    pub tasks: Arc<TaskStore<B>>,
    storage: Arc<dyn KeyValueStore>,
}

impl App<MeshcraftClient> {
    /// Build the HTTP client and file storage described by `config`
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let session = SessionManager::new();
        let client =
            MeshcraftClient::with_config_and_base_url(config.client_config(), &config.api.base_url)
                .context("create API client")?
                .with_session(session.clone());

        let storage = match &config.storage.data_dir {
            Some(dir) => JsonFileStore::open(dir).await?,
            None => JsonFileStore::new().await?,
        };
        info!(data_dir = %storage.dir().display(), "storage ready");

        Self::new(Arc::new(client), session, Arc::new(storage), config)
    }
}

impl<B: Backend + ?Sized> App<B> {
    pub fn new(
        backend: Arc<B>,
        session: SessionManager,
        storage: Arc<dyn KeyValueStore>,
        config: &AppConfig,
    ) -> Result<Self> {
        PrinterStatus::verify_mapping().map_err(|err| anyhow!("printer status table: {err}"))?;

        let gallery = GalleryStore::new(backend.clone())
            .with_proxy(config.image_proxy())
            .with_page_size(config.gallery.page_size);

        Ok(Self {
            session,
            printers: Arc::new(PrinterStore::with_policy(
                backend.clone(),
                config.polling_policy(),
            )),
            gallery: Arc::new(gallery),
            interactions: Arc::new(InteractionStore::new(backend.clone())),
            tasks: Arc::new(TaskStore::new(backend)),
            storage,
        })
    }

    /// Decide whether `route` may be shown with the current session
    pub fn guard(&self, route: &Route) -> GuardDecision {
        guard(route, &self.session)
    }

    /// Install a fresh token and persist it
    pub async fn login(
        &self,
        token: String,
        expires_seconds: Option<u64>,
        user_id: Option<String>,
    ) -> Result<()> {
        self.session.set_token(token, expires_seconds, user_id);
        if let Some(data) = self.session.token_data() {
            save_snapshot(self.storage.as_ref(), SESSION_KEY, &data).await?;
        }
        info!("signed in");
        Ok(())
    }

    /// Clear the session, every store and everything persisted
    pub async fn logout(&self) -> Result<()> {
        self.session.clear();
        self.printers.clear();
        self.interactions.clear();
        self.gallery.clear();
        self.tasks.reset();

        for key in ALL_KEYS {
            self.storage
                .remove(key)
                .await
                .with_context(|| format!("remove persisted '{key}'"))?;
        }
        info!("signed out");
        Ok(())
    }

    /// Load persisted snapshots into the stores. Missing blobs are skipped.
    pub async fn restore(&self) -> Result<()> {
        let storage = self.storage.as_ref();

        if let Some(token) = load_snapshot::<TokenData>(storage, SESSION_KEY).await? {
            self.session.restore(token);
        }
        if let Some(snapshot) = load_snapshot::<PrinterSnapshot>(storage, PRINTERS_KEY).await? {
            debug!(count = snapshot.printers.len(), "restoring printers");
            self.printers.restore(snapshot);
        }
        if let Some(snapshot) =
            load_snapshot::<InteractionSnapshot>(storage, INTERACTIONS_KEY).await?
        {
            self.interactions.restore(snapshot);
        }
        if let Some(snapshot) = load_snapshot::<TaskSnapshot>(storage, TASK_KEY).await? {
            self.tasks.restore(snapshot);
        }
        if let Some(snapshot) = load_snapshot::<GallerySnapshot>(storage, GALLERY_KEY).await? {
            self.gallery.restore(snapshot);
        }

        info!(authenticated = self.session.is_authenticated(), "state restored");
        Ok(())
    }

    /// Write every store's snapshot to storage
    pub async fn persist(&self) -> Result<()> {
        let storage = self.storage.as_ref();

        if let Some(token) = self.session.token_data() {
            save_snapshot(storage, SESSION_KEY, &token).await?;
        }
        save_snapshot(storage, PRINTERS_KEY, &self.printers.snapshot()).await?;
        save_snapshot(storage, INTERACTIONS_KEY, &self.interactions.snapshot()).await?;
        save_snapshot(storage, TASK_KEY, &self.tasks.snapshot()).await?;
        save_snapshot(storage, GALLERY_KEY, &self.gallery.snapshot()).await?;

        debug!("state persisted");
        Ok(())
    }

    /// Refresh the gallery (and printers when signed in) concurrently.
    ///
    /// Failures are already recorded on each store; this only reports them.
    pub async fn refresh(&self, sort: SortBy) {
        let authenticated = self.session.is_authenticated();
        let gallery = async {
            if let Err(err) = self.gallery.load(sort).await {
                warn!(error = %err, "gallery refresh failed");
            }
        };
        let printers = async {
            if !authenticated {
                return;
            }
            if let Err(err) = self.printers.fetch_printers().await {
                warn!(error = %err, "printer refresh failed");
            }
        };
        future::join(gallery, printers).await;

        if !authenticated {
            return;
        }
        let ids: Vec<String> = self
            .gallery
            .snapshot()
            .models
            .iter()
            .map(|m| m.id.clone())
            .collect();
        if let Err(err) = self.interactions.load_statuses(&ids).await {
            warn!(error = %err, "interaction status refresh failed");
        }
    }
}

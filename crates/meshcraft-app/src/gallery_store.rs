/*
[INPUT]:  GalleryApi backend, sort choice, scroll-to-end (load more), detail opens
[OUTPUT]: GallerySnapshot (paged model list) via `watch`, proxied image URLs
[POS]:    State layer - public model gallery with offset pagination
[UPDATE]: When gallery paging, sorting or image rewriting changes
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use meshcraft_adapter::{GalleryApi, GalleryModel, GalleryPage, ImageProxy, SortBy};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ErrorNotice, StoreError};
use crate::loading::LoadingGuard;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GallerySnapshot {
    pub models: Vec<GalleryModel>,
    pub total: u64,
    pub has_more: bool,
    pub sort: SortBy,
    #[serde(skip)]
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<ErrorNotice>,
}

pub struct GalleryStore<B: ?Sized> {
    backend: Arc<B>,
    proxy: Option<ImageProxy>,
    page_size: u32,
    state: watch::Sender<GallerySnapshot>,
    /// Bumped by `load`; pages fetched for an older listing are dropped
    generation: AtomicU64,
    active_reads: AtomicUsize,
}

fn loading_flag(s: &mut GallerySnapshot) -> &mut bool {
    &mut s.loading
}

impl<B: GalleryApi + ?Sized> GalleryStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _rx) = watch::channel(GallerySnapshot::default());
        Self {
            backend,
            proxy: None,
            page_size: DEFAULT_PAGE_SIZE,
            state,
            generation: AtomicU64::new(0),
            active_reads: AtomicUsize::new(0),
        }
    }

    /// Rewrite image URLs of every fetched model through `proxy`
    pub fn with_proxy(mut self, proxy: ImageProxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<GallerySnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.state.borrow().clone()
    }

    /// Fetch the first page for `sort`, replacing the list on success
    pub async fn load(&self, sort: SortBy) -> Result<Vec<GalleryModel>, StoreError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::begin(&self.state, &self.active_reads, loading_flag);
        self.state.send_modify(|s| s.sort = sort);

        let result = self.backend.list_models(sort, self.page_size, 0).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(?sort, "gallery load superseded");
            return Err(StoreError::Cancelled);
        }

        match result {
            Ok(page) => {
                let page = self.proxied(page);
                info!(?sort, count = page.models.len(), total = page.total, "gallery loaded");
                let models = page.models.clone();
                self.state.send_modify(|s| {
                    s.models = page.models;
                    s.total = page.total;
                    s.has_more = page.has_more;
                    s.error = None;
                });
                Ok(models)
            }
            Err(err) => {
                warn!(?sort, error = %err, "gallery load failed; keeping previous list");
                let notice = ErrorNotice::from(&err);
                self.state.send_modify(|s| s.error = Some(notice));
                Err(err.into())
            }
        }
    }

    /// Append the next page. Returns the newly added models, empty when exhausted.
    pub async fn load_more(&self) -> Result<Vec<GalleryModel>, StoreError> {
        let (sort, offset) = {
            let state = self.state.borrow();
            if !state.has_more || state.loading {
                return Ok(Vec::new());
            }
            (state.sort, state.models.len() as u32)
        };
        let generation = self.generation.load(Ordering::SeqCst);
        let _loading = LoadingGuard::begin(&self.state, &self.active_reads, loading_flag);

        let result = self.backend.list_models(sort, self.page_size, offset).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(offset, "stale gallery page dropped");
            return Err(StoreError::Cancelled);
        }

        match result {
            Ok(page) => {
                let page = self.proxied(page);
                debug!(offset, count = page.models.len(), "gallery page appended");
                let added = page.models.clone();
                self.state.send_modify(|s| {
                    s.models.extend(page.models);
                    s.total = page.total;
                    s.has_more = page.has_more;
                    s.error = None;
                });
                Ok(added)
            }
            Err(err) => {
                warn!(offset, error = %err, "gallery page failed");
                let notice = ErrorNotice::from(&err);
                self.state.send_modify(|s| s.error = Some(notice));
                Err(err.into())
            }
        }
    }

    pub async fn model(&self, model_id: &str) -> Result<GalleryModel, StoreError> {
        let model = self.backend.model(model_id).await?;
        Ok(self.proxy_model(model))
    }

    /// Bump the download counter; failures are ignored
    pub async fn record_download(&self, model_id: &str) {
        self.backend.record_download(model_id).await;
    }

    pub fn restore(&self, snapshot: GallerySnapshot) {
        self.state.send_modify(|s| {
            s.models = snapshot.models;
            s.total = snapshot.total;
            s.has_more = snapshot.has_more;
            s.sort = snapshot.sort;
        });
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(GallerySnapshot::default());
    }

    fn proxied(&self, mut page: GalleryPage) -> GalleryPage {
        if let Some(proxy) = &self.proxy {
            page.models = page.models.iter().map(|m| proxy.rewrite_model(m)).collect();
        }
        page
    }

    fn proxy_model(&self, model: GalleryModel) -> GalleryModel {
        match &self.proxy {
            Some(proxy) => proxy.rewrite_model(&model),
            None => model,
        }
    }
}

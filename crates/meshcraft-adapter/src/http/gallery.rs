/*
[INPUT]:  Sort order, pagination window, model identifiers
[OUTPUT]: Gallery pages, model details, like/favorite toggles
[POS]:    HTTP layer - public gallery endpoints (toggles require session)
[UPDATE]: When adding new gallery endpoints or changing response format
*/

use std::collections::HashMap;

use reqwest::Method;
use tracing::debug;

use crate::http::{MeshcraftClient, Result};
use crate::types::{
    FavoriteResponse, GalleryModel, GalleryPage, InteractionStatus, InteractionStatusRequest,
    LikeResponse, SortBy, ToggleOutcome,
};

impl MeshcraftClient {
    /// List gallery models
    ///
    /// GET /api/gallery/models?sortBy={sort}&limit={limit}&offset={offset}
    pub async fn list_gallery_models(
        &self,
        sort: SortBy,
        limit: u32,
        offset: u32,
    ) -> Result<GalleryPage> {
        let endpoint = format!(
            "/api/gallery/models?sortBy={}&limit={}&offset={}",
            sort.as_query(),
            limit,
            offset
        );
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }

    /// Get a single gallery model
    ///
    /// GET /api/gallery/models/{id}
    pub async fn get_gallery_model(&self, model_id: &str) -> Result<GalleryModel> {
        let endpoint = format!("/api/gallery/models/{}", model_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }

    /// Record a download. Best-effort: failures are logged and dropped.
    ///
    /// POST /api/gallery/models/{id}/download
    pub async fn record_download(&self, model_id: &str) {
        let endpoint = format!("/api/gallery/models/{}/download", model_id);
        let outcome = match self.request(Method::POST, &endpoint) {
            Ok(builder) => self.send_unit(builder).await,
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            debug!(model_id, error = %err, "download count not recorded");
        }
    }

    /// Toggle like on a model
    ///
    /// POST /api/gallery/models/{id}/like
    pub async fn toggle_like(&self, model_id: &str) -> Result<ToggleOutcome> {
        let endpoint = format!("/api/gallery/models/{}/like", model_id);
        let builder = self.request(Method::POST, &endpoint)?;
        let response: LikeResponse = self.send_json(builder).await?;
        Ok(response.into())
    }

    /// Toggle favorite on a model
    ///
    /// POST /api/gallery/models/{id}/favorite
    pub async fn toggle_favorite(&self, model_id: &str) -> Result<ToggleOutcome> {
        let endpoint = format!("/api/gallery/models/{}/favorite", model_id);
        let builder = self.request(Method::POST, &endpoint)?;
        let response: FavoriteResponse = self.send_json(builder).await?;
        Ok(response.into())
    }

    /// Batch-load like/favorite flags for the signed-in user
    ///
    /// POST /api/gallery/interactions
    pub async fn interaction_statuses(
        &self,
        model_ids: &[String],
    ) -> Result<HashMap<String, InteractionStatus>> {
        let body = InteractionStatusRequest {
            model_ids: model_ids.to_vec(),
        };
        let builder = self.request(Method::POST, "/api/gallery/interactions")?;
        self.send_json(builder.json(&body)).await
    }
}

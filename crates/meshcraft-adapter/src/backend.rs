/*
[INPUT]:  Store operations that need the remote backend
[OUTPUT]: Async traits the app stores are generic over, implemented by MeshcraftClient
[POS]:    Seam between state containers and the HTTP layer (fakes plug in here in tests)
[UPDATE]: When a store needs a new remote operation
*/

use std::collections::HashMap;

use async_trait::async_trait;

use crate::http::{MeshcraftClient, Result};
use crate::types::{
    GalleryModel, GalleryPage, GenerationTask, InteractionStatus, PrintTaskCreated, PrinterRecord,
    SortBy, ToggleOutcome,
};

/// Printer endpoints
#[async_trait]
pub trait PrinterApi: Send + Sync {
    async fn list_printers(&self) -> Result<Vec<PrinterRecord>>;

    async fn printer_detail(&self, device_id: &str) -> Result<PrinterRecord>;

    /// Implementations may assume inputs were already validated
    async fn bind_printer(&self, device_name: &str, code: &str) -> Result<PrinterRecord>;

    async fn unbind_printer(&self, device_id: &str) -> Result<()>;

    async fn create_print_task(
        &self,
        device_id: &str,
        model_id: &str,
        task_name: &str,
    ) -> Result<PrintTaskCreated>;
}

/// Gallery and interaction endpoints
#[async_trait]
pub trait GalleryApi: Send + Sync {
    async fn list_models(&self, sort: SortBy, limit: u32, offset: u32) -> Result<GalleryPage>;

    async fn model(&self, model_id: &str) -> Result<GalleryModel>;

    /// Never fails; implementations swallow errors
    async fn record_download(&self, model_id: &str);

    async fn toggle_like(&self, model_id: &str) -> Result<ToggleOutcome>;

    async fn toggle_favorite(&self, model_id: &str) -> Result<ToggleOutcome>;

    async fn interaction_statuses(
        &self,
        model_ids: &[String],
    ) -> Result<HashMap<String, InteractionStatus>>;
}

/// Generation task endpoints
#[async_trait]
pub trait GenerationApi: Send + Sync {
    async fn create_task(&self, prompt: &str) -> Result<GenerationTask>;

    async fn task(&self, task_id: &str) -> Result<GenerationTask>;

    async fn select_image(&self, task_id: &str, image_index: usize) -> Result<GenerationTask>;
}

#[async_trait]
impl PrinterApi for MeshcraftClient {
    async fn list_printers(&self) -> Result<Vec<PrinterRecord>> {
        MeshcraftClient::list_printers(self).await
    }

    async fn printer_detail(&self, device_id: &str) -> Result<PrinterRecord> {
        MeshcraftClient::printer_detail(self, device_id).await
    }

    async fn bind_printer(&self, device_name: &str, code: &str) -> Result<PrinterRecord> {
        MeshcraftClient::bind_printer(self, device_name, code).await
    }

    async fn unbind_printer(&self, device_id: &str) -> Result<()> {
        MeshcraftClient::unbind_printer(self, device_id).await
    }

    async fn create_print_task(
        &self,
        device_id: &str,
        model_id: &str,
        task_name: &str,
    ) -> Result<PrintTaskCreated> {
        MeshcraftClient::create_print_task(self, device_id, model_id, task_name).await
    }
}

#[async_trait]
impl GalleryApi for MeshcraftClient {
    async fn list_models(&self, sort: SortBy, limit: u32, offset: u32) -> Result<GalleryPage> {
        self.list_gallery_models(sort, limit, offset).await
    }

    async fn model(&self, model_id: &str) -> Result<GalleryModel> {
        self.get_gallery_model(model_id).await
    }

    async fn record_download(&self, model_id: &str) {
        MeshcraftClient::record_download(self, model_id).await
    }

    async fn toggle_like(&self, model_id: &str) -> Result<ToggleOutcome> {
        MeshcraftClient::toggle_like(self, model_id).await
    }

    async fn toggle_favorite(&self, model_id: &str) -> Result<ToggleOutcome> {
        MeshcraftClient::toggle_favorite(self, model_id).await
    }

    async fn interaction_statuses(
        &self,
        model_ids: &[String],
    ) -> Result<HashMap<String, InteractionStatus>> {
        MeshcraftClient::interaction_statuses(self, model_ids).await
    }
}

#[async_trait]
impl GenerationApi for MeshcraftClient {
    async fn create_task(&self, prompt: &str) -> Result<GenerationTask> {
        self.create_generation_task(prompt).await
    }

    async fn task(&self, task_id: &str) -> Result<GenerationTask> {
        self.generation_task(task_id).await
    }

    async fn select_image(&self, task_id: &str, image_index: usize) -> Result<GenerationTask> {
        MeshcraftClient::select_image(self, task_id, image_index).await
    }
}

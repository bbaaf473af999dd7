/*
[INPUT]:  Prompts, task identifiers, image selections
[OUTPUT]: Generation task snapshots
[POS]:    HTTP layer - image/model generation endpoints (require session)
[UPDATE]: When the generation flow gains steps or changes its payloads
*/

use reqwest::Method;

use crate::http::{MeshcraftClient, MeshcraftError, Result};
use crate::types::{CreateGenerationTaskRequest, GenerationTask, SelectImageRequest};

impl MeshcraftClient {
    /// Submit a prompt and create a generation task
    ///
    /// POST /api/generation/tasks
    pub async fn create_generation_task(&self, prompt: &str) -> Result<GenerationTask> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(MeshcraftError::validation("prompt", "must not be empty"));
        }
        let body = CreateGenerationTaskRequest {
            prompt: prompt.to_string(),
        };
        let builder = self.request(Method::POST, "/api/generation/tasks")?;
        self.send_json(builder.json(&body)).await
    }

    /// Fetch the latest state of a generation task
    ///
    /// GET /api/generation/tasks/{id}
    pub async fn generation_task(&self, task_id: &str) -> Result<GenerationTask> {
        let endpoint = format!("/api/generation/tasks/{}", task_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }

    /// Pick one of the generated images and start model generation
    ///
    /// POST /api/generation/tasks/{id}/select
    pub async fn select_image(&self, task_id: &str, image_index: usize) -> Result<GenerationTask> {
        let endpoint = format!("/api/generation/tasks/{}/select", task_id);
        let body = SelectImageRequest { image_index };
        let builder = self.request(Method::POST, &endpoint)?;
        self.send_json(builder.json(&body)).await
    }
}

//! In-memory backend used by store unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use meshcraft_adapter::{
    GalleryApi, GalleryModel, GalleryPage, GenerationApi, GenerationTask, InteractionStatus,
    MeshcraftError, PrintTaskCreated, PrinterApi, PrinterRecord, PrinterStatus, Result, SortBy,
    TaskStatus, ToggleOutcome,
};

/// One scripted detail response: wait `delay`, then answer (`None` = failure)
pub struct Scripted {
    pub delay: Duration,
    pub outcome: Option<PrinterRecord>,
}

#[derive(Default)]
pub struct FakeBackend {
    pub printers: Mutex<Vec<PrinterRecord>>,
    pub detail_script: Mutex<VecDeque<Scripted>>,
    pub gallery: Mutex<Vec<GalleryModel>>,
    pub task: Mutex<Option<GenerationTask>>,
    pub task_script: Mutex<VecDeque<GenerationTask>>,
    pub likes: Mutex<HashMap<String, (bool, u64)>>,
    pub favorites: Mutex<HashMap<String, (bool, u64)>>,
    pub toggle_delay: Mutex<Duration>,
    pub list_delay: Mutex<Duration>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    calls: Mutex<Vec<String>>,
}

pub fn printer(device_id: &str, status: PrinterStatus) -> PrinterRecord {
    PrinterRecord {
        device_id: device_id.to_string(),
        device_name: format!("R1-{}", device_id.to_ascii_uppercase()),
        status,
        start_time: None,
        estimated_end_time: None,
        progress: None,
        current_task_name: None,
    }
}

pub fn gallery_model(id: &str) -> GalleryModel {
    GalleryModel {
        id: id.to_string(),
        title: format!("Model {id}"),
        description: None,
        thumbnail_url: Some(format!("https://bucket.cos.myqcloud.com/{id}.png")),
        model_url: None,
        author: None,
        like_count: 0,
        favorite_count: 0,
        download_count: 0,
        created_at: None,
    }
}

fn network_error() -> MeshcraftError {
    MeshcraftError::Timeout { duration: 10 }
}

fn server_error() -> MeshcraftError {
    MeshcraftError::Api {
        code: 500,
        message: "backend exploded".to_string(),
    }
}

fn not_found(what: &str) -> MeshcraftError {
    MeshcraftError::Api {
        code: 404,
        message: what.to_string(),
    }
}

impl FakeBackend {
    pub fn with_printers(printers: Vec<PrinterRecord>) -> Self {
        let fake = Self::default();
        *fake.printers.lock().unwrap() = printers;
        fake
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn script_detail(&self, delay: Duration, outcome: Option<PrinterRecord>) {
        self.detail_script
            .lock()
            .unwrap()
            .push_back(Scripted { delay, outcome });
    }

    pub fn calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn reads_fail(&self) -> bool {
        self.fail_reads.load(Ordering::SeqCst)
    }

    fn writes_fail(&self) -> bool {
        self.fail_writes.load(Ordering::SeqCst)
    }

    async fn toggle(
        &self,
        table: &Mutex<HashMap<String, (bool, u64)>>,
        model_id: &str,
    ) -> Result<ToggleOutcome> {
        let delay = *self.toggle_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.writes_fail() {
            return Err(server_error());
        }
        let mut table = table.lock().unwrap();
        let entry = table.entry(model_id.to_string()).or_insert((false, 0));
        entry.0 = !entry.0;
        entry.1 = if entry.0 { entry.1 + 1 } else { entry.1.saturating_sub(1) };
        Ok(ToggleOutcome {
            active: entry.0,
            count: entry.1,
        })
    }
}

#[async_trait]
impl PrinterApi for FakeBackend {
    async fn list_printers(&self) -> Result<Vec<PrinterRecord>> {
        self.record("list_printers".to_string());
        if self.reads_fail() {
            return Err(network_error());
        }
        Ok(self.printers.lock().unwrap().clone())
    }

    async fn printer_detail(&self, device_id: &str) -> Result<PrinterRecord> {
        self.record(format!("detail:{device_id}"));
        let scripted = self.detail_script.lock().unwrap().pop_front();
        if let Some(Scripted { delay, outcome }) = scripted {
            tokio::time::sleep(delay).await;
            return outcome.ok_or_else(network_error);
        }
        if self.reads_fail() {
            return Err(network_error());
        }
        self.printers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.device_id == device_id)
            .cloned()
            .ok_or_else(|| not_found("printer not found"))
    }

    async fn bind_printer(&self, device_name: &str, _code: &str) -> Result<PrinterRecord> {
        self.record(format!("bind:{device_name}"));
        if self.writes_fail() {
            return Err(server_error());
        }
        let mut record = printer(&device_name.to_ascii_lowercase(), PrinterStatus::Idle);
        record.device_name = device_name.to_string();
        self.printers.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn unbind_printer(&self, device_id: &str) -> Result<()> {
        self.record(format!("unbind:{device_id}"));
        if self.writes_fail() {
            return Err(server_error());
        }
        self.printers
            .lock()
            .unwrap()
            .retain(|p| p.device_id != device_id);
        Ok(())
    }

    async fn create_print_task(
        &self,
        device_id: &str,
        model_id: &str,
        task_name: &str,
    ) -> Result<PrintTaskCreated> {
        self.record(format!("print:{device_id}:{model_id}"));
        if self.writes_fail() {
            return Err(server_error());
        }
        let mut printers = self.printers.lock().unwrap();
        if let Some(p) = printers.iter_mut().find(|p| p.device_id == device_id) {
            p.status = PrinterStatus::Printing;
            p.current_task_name = Some(task_name.to_string());
        }
        Ok(PrintTaskCreated {
            task_id: "p-1".to_string(),
            device_id: Some(device_id.to_string()),
        })
    }
}

#[async_trait]
impl GalleryApi for FakeBackend {
    async fn list_models(&self, _sort: SortBy, limit: u32, offset: u32) -> Result<GalleryPage> {
        self.record(format!("list_models:{offset}"));
        let delay = *self.list_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.reads_fail() {
            return Err(network_error());
        }
        let all = self.gallery.lock().unwrap();
        let start = (offset as usize).min(all.len());
        let end = (start + limit as usize).min(all.len());
        Ok(GalleryPage {
            models: all[start..end].to_vec(),
            total: all.len() as u64,
            has_more: end < all.len(),
        })
    }

    async fn model(&self, model_id: &str) -> Result<GalleryModel> {
        self.record(format!("model:{model_id}"));
        if self.reads_fail() {
            return Err(network_error());
        }
        self.gallery
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == model_id)
            .cloned()
            .ok_or_else(|| not_found("model not found"))
    }

    async fn record_download(&self, model_id: &str) {
        self.record(format!("download:{model_id}"));
    }

    async fn toggle_like(&self, model_id: &str) -> Result<ToggleOutcome> {
        self.record(format!("like:{model_id}"));
        self.toggle(&self.likes, model_id).await
    }

    async fn toggle_favorite(&self, model_id: &str) -> Result<ToggleOutcome> {
        self.record(format!("favorite:{model_id}"));
        self.toggle(&self.favorites, model_id).await
    }

    async fn interaction_statuses(
        &self,
        model_ids: &[String],
    ) -> Result<HashMap<String, InteractionStatus>> {
        self.record("interactions".to_string());
        if self.reads_fail() {
            return Err(network_error());
        }
        let likes = self.likes.lock().unwrap();
        let favorites = self.favorites.lock().unwrap();
        Ok(model_ids
            .iter()
            .map(|id| {
                let status = InteractionStatus {
                    is_liked: likes.get(id).is_some_and(|e| e.0),
                    is_favorited: favorites.get(id).is_some_and(|e| e.0),
                };
                (id.clone(), status)
            })
            .collect())
    }
}

#[async_trait]
impl GenerationApi for FakeBackend {
    async fn create_task(&self, prompt: &str) -> Result<GenerationTask> {
        self.record("create_task".to_string());
        if self.writes_fail() {
            return Err(server_error());
        }
        let task = GenerationTask {
            id: "t1".to_string(),
            status: TaskStatus::Queued,
            images: Vec::new(),
            selected_image_index: None,
            model_url: None,
            prompt: prompt.to_string(),
            progress: None,
            error: None,
            created_at: None,
        };
        *self.task.lock().unwrap() = Some(task.clone());
        Ok(task)
    }

    async fn task(&self, task_id: &str) -> Result<GenerationTask> {
        self.record(format!("task:{task_id}"));
        if self.reads_fail() {
            return Err(network_error());
        }
        if let Some(next) = self.task_script.lock().unwrap().pop_front() {
            *self.task.lock().unwrap() = Some(next.clone());
            return Ok(next);
        }
        self.task
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| not_found("task not found"))
    }

    async fn select_image(&self, task_id: &str, image_index: usize) -> Result<GenerationTask> {
        self.record(format!("select:{task_id}:{image_index}"));
        if self.writes_fail() {
            return Err(server_error());
        }
        let mut guard = self.task.lock().unwrap();
        let task = guard
            .as_mut()
            .ok_or_else(|| not_found("task not found"))?;
        task.selected_image_index = Some(image_index);
        task.status = TaskStatus::GeneratingModel;
        Ok(task.clone())
    }
}

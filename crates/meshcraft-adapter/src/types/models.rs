/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ApiPrinterStatus, PrinterStatus, TaskStatus};

/// One generated image candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// A user-initiated generation job progressing image -> model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTask {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub images: Vec<GeneratedImage>,
    #[serde(default)]
    pub selected_image_index: Option<usize>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GenerationTask {
    /// Image the user picked, if the index points inside `images`
    pub fn selected_image(&self) -> Option<&GeneratedImage> {
        self.selected_image_index.and_then(|idx| self.images.get(idx))
    }
}

/// Printer as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPrinter {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    pub status: ApiPrinterStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub current_task_name: Option<String>,
}

/// Local reflection of a remote printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterRecord {
    pub device_id: String,
    pub device_name: String,
    pub status: PrinterStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub current_task_name: Option<String>,
}

impl PrinterRecord {
    /// Time left until the estimated end, never negative
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.estimated_end_time {
            Some(end) => (end - now).max(Duration::zero()),
            None => Duration::zero(),
        }
    }

    /// Time since the print started, never negative
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match self.start_time {
            Some(start) => (now - start).max(Duration::zero()),
            None => Duration::zero(),
        }
    }
}

impl From<ApiPrinter> for PrinterRecord {
    fn from(p: ApiPrinter) -> Self {
        Self {
            device_id: p.device_id,
            device_name: p.device_name,
            status: p.status.into(),
            start_time: p.start_time,
            estimated_end_time: p.estimated_end_time,
            progress: p.progress,
            current_task_name: p.current_task_name,
        }
    }
}

/// Public gallery entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryModel {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-model like/favorite flags for the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStatus {
    pub is_liked: bool,
    pub is_favorited: bool,
}

/// Result of a like/favorite toggle: the new flag and the new total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: u64,
}

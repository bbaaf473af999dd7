/*
[INPUT]:  Public API exports for meshcraft-app crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod app;
pub mod config;
pub mod error;
pub mod gallery_store;
pub mod interaction_store;
mod loading;
pub mod poller;
pub mod printer_store;
pub mod state;
pub mod task_store;
pub mod task_view;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use app::{App, Backend};
pub use config::AppConfig;
pub use error::{ErrorNotice, StoreError};
pub use gallery_store::{GallerySnapshot, GalleryStore};
pub use interaction_store::{InteractionSnapshot, InteractionStore};
pub use poller::PrinterPoller;
pub use printer_store::{PollingPolicy, PrinterSnapshot, PrinterStore, polling_interval};
pub use task_store::{TaskSnapshot, TaskStore};
pub use task_view::{ImageSelectionPhase, TaskView, image_selection_phase, select_view};

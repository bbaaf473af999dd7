/*
[INPUT]:  GenerationTask snapshot
[OUTPUT]: Which creation screen to render, and the image-picker sub-state
[POS]:    Presentation decision layer - pure, no side effects
[UPDATE]: When the creation flow gains a screen or the rule order changes
*/

use meshcraft_adapter::{GenerationTask, TaskStatus};

/// The three creation screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskView {
    ImageSelection,
    ModelGenerating,
    ModelComplete,
}

/// What the image-selection screen should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSelectionPhase {
    /// No candidates to pick from yet
    Generating,
    AwaitingPick,
    Failed,
}

/// Pick the screen for a task. First matching rule wins.
///
/// A selected index with status still `generating_images` lands on
/// `ModelGenerating`; this ordering is current behavior and is kept as is.
pub fn select_view(task: &GenerationTask) -> TaskView {
    if task.selected_image_index.is_none() {
        TaskView::ImageSelection
    } else if task.status == TaskStatus::ModelReady {
        TaskView::ModelComplete
    } else {
        TaskView::ModelGenerating
    }
}

pub fn image_selection_phase(task: &GenerationTask) -> ImageSelectionPhase {
    match task.status {
        TaskStatus::Failed => ImageSelectionPhase::Failed,
        TaskStatus::Queued | TaskStatus::GeneratingImages => ImageSelectionPhase::Generating,
        _ if task.images.is_empty() => ImageSelectionPhase::Generating,
        _ => ImageSelectionPhase::AwaitingPick,
    }
}

use serde::{Deserialize, Serialize};

/// Change notifications emitted by the engine.
///
/// Hosts use these to mark a document dirty and schedule a redraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationEvent {
    ArtifactCreated { name: String },
    ArtifactChanged { name: String },
    ArtifactRemoved { name: String },
    CreationCancelled,
    ArtifactsLoaded { count: usize },
    BarsUpdated { bars_len: usize },
}

/// Observer hook for bounded host logic.
///
/// Observers see every event the engine emits and read artifact state
/// through the engine without mutating internals directly.
pub trait AnnotationObserver {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: &AnnotationEvent);
}

//! Progress reporting for the ingestion pipeline.
//!
//! The pipeline emits one event per completed stage so callers can print
//! progress as it happens instead of after the whole run.

use std::sync::Arc;
use std::time::Instant;

/// A completed ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    /// Pages with text were read from the PDF.
    Loaded { pages: usize },

    /// Pages were split into chunks.
    Split { chunks: usize },

    /// Every chunk received an embedding.
    Embedded { chunks: usize },

    /// Chunks and embeddings were committed to the store.
    Stored { chunks: usize },
}

impl IngestEvent {
    /// Stage name used in logs.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "load",
            Self::Split { .. } => "split",
            Self::Embedded { .. } => "embed",
            Self::Stored { .. } => "store",
        }
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(&IngestEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Instant::now(),
        }
    }

    /// Create a reporter that only logs.
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Instant::now(),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: IngestEvent) {
        tracing::debug!(
            phase = event.phase(),
            elapsed_secs = self.start_time.elapsed().as_secs_f64(),
            "Progress event: {:?}",
            event
        );

        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }
}

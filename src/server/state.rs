//! Application state shared by all handlers.

use crate::client::AnalysisClient;
use crate::upload::UploadStore;
use std::sync::Arc;

/// Immutable per-process state. Cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn AnalysisClient>,
    pub uploads: UploadStore,
    /// Largest accepted `POST /analyze_audio` body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(client: Arc<dyn AnalysisClient>, uploads: UploadStore, max_upload_bytes: usize) -> Self {
        Self {
            client,
            uploads,
            max_upload_bytes,
        }
    }
}

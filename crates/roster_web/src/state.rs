//! Shared request state.

use crate::error::ApiError;
use crate::resource::Resource;
use roster_core::{ImageStore, RecordRepository, RecordService};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use warp::Filter;

pub type SharedRepository = Arc<dyn RecordRepository>;
pub type SharedImageStore = Arc<dyn ImageStore>;

/// Handles injected into every request handler.
pub struct AppState {
    repo: SharedRepository,
    images: SharedImageStore,
    upload_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(repo: SharedRepository, images: SharedImageStore) -> Self {
        Self {
            repo,
            images,
            upload_dir: None,
        }
    }

    /// Serves files from `dir` under `/uploads`.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Returns a service bound to `resource`'s collection.
    pub fn service(&self, resource: Resource) -> RecordService<SharedRepository> {
        RecordService::new(Arc::clone(&self.repo), resource.collection)
    }

    pub fn images(&self) -> &dyn ImageStore {
        self.images.as_ref()
    }

    pub fn upload_dir(&self) -> Option<&Path> {
        self.upload_dir.as_deref()
    }
}

/// Injects the shared state into a filter chain.
pub fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

/// Runs store and filesystem work on the blocking pool.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}

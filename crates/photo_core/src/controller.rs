use std::sync::Arc;

use shared::error::{ErrorCode, FetchFailure};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    list_state::{ListStateError, PhotoListState},
    photo_service::{PhotoServiceError, PhotoSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Loaded { count: usize },
    Failed(FetchFailure),
}

impl FeedStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Fetch(#[from] PhotoServiceError),
    #[error(transparent)]
    Load(#[from] ListStateError),
}

impl ControllerError {
    fn failure(&self) -> FetchFailure {
        match self {
            Self::Fetch(err) => FetchFailure::from(err),
            Self::Load(err) => FetchFailure::new(ErrorCode::Validation, err.to_string()),
        }
    }
}

/// Fetches the photo list once and hands it to the list state.
pub struct PhotoGridController {
    source: Arc<dyn PhotoSource>,
    list: PhotoListState,
    status: watch::Sender<FeedStatus>,
}

impl PhotoGridController {
    pub fn new(source: Arc<dyn PhotoSource>, list: PhotoListState) -> Self {
        let (status, _) = watch::channel(FeedStatus::Idle);
        Self {
            source,
            list,
            status,
        }
    }

    pub fn list(&self) -> &PhotoListState {
        &self.list
    }

    pub fn status(&self) -> FeedStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<FeedStatus> {
        self.status.subscribe()
    }

    /// Single best-effort fetch. On success the list is loaded and its driver
    /// starts; on failure the driver never starts and the error is returned.
    pub async fn fetch_and_start(&self) -> Result<usize, ControllerError> {
        self.status.send_replace(FeedStatus::Loading);

        let result = match self.source.fetch_photos().await {
            Ok(photos) => self.list.load(photos).map_err(ControllerError::from),
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(revision) => {
                let count = revision.len();
                info!(count, "loaded {count} photos");
                self.status.send_replace(FeedStatus::Loaded { count });
                Ok(count)
            }
            Err(err) => {
                error!("error fetching photos: {err}");
                self.status.send_replace(FeedStatus::Failed(err.failure()));
                Err(err)
            }
        }
    }

    pub fn shutdown(&self) {
        self.list.stop();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{first_duplicate_id, PhotoId, PhotoRecord},
    error::{ErrorCode, FetchFailure},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Error)]
pub enum PhotoServiceError {
    #[error("invalid photo endpoint '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("photo request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("photo endpoint returned status {status}")]
    Status { status: u16 },
    #[error("failed to decode photo payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("photo payload contains duplicate id {0}")]
    DuplicateId(PhotoId),
}

impl PhotoServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } => ErrorCode::InvalidRequest,
            Self::Transport(_) => ErrorCode::Transport,
            Self::Status { .. } => ErrorCode::Upstream,
            Self::Decode(_) => ErrorCode::Decode,
            Self::DuplicateId(_) => ErrorCode::Validation,
        }
    }
}

impl From<&PhotoServiceError> for FetchFailure {
    fn from(value: &PhotoServiceError) -> Self {
        FetchFailure::new(value.code(), value.to_string())
    }
}

/// One-shot source of the initial photo list.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn fetch_photos(&self) -> Result<Vec<PhotoRecord>, PhotoServiceError>;
}

pub struct HttpPhotoService {
    http: Client,
    endpoint: Url,
}

impl HttpPhotoService {
    pub fn new(api_base: &str) -> Result<Self, PhotoServiceError> {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: &str) -> Result<Self, PhotoServiceError> {
        Ok(Self {
            http,
            endpoint: photos_endpoint(api_base)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PhotoSource for HttpPhotoService {
    async fn fetch_photos(&self) -> Result<Vec<PhotoRecord>, PhotoServiceError> {
        let res = self.http.get(self.endpoint.clone()).send().await?;
        let status = res.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "photo fetch rejected");
            return Err(PhotoServiceError::Status {
                status: status.as_u16(),
            });
        }

        let body = res.bytes().await?;
        let photos: Vec<PhotoRecord> = serde_json::from_slice(&body)?;
        if let Some(duplicate) = first_duplicate_id(&photos) {
            return Err(PhotoServiceError::DuplicateId(duplicate));
        }

        info!(endpoint = %self.endpoint, count = photos.len(), "fetched photos");
        Ok(photos)
    }
}

fn photos_endpoint(api_base: &str) -> Result<Url, PhotoServiceError> {
    let raw = format!("{}/photos", api_base.trim().trim_end_matches('/'));
    Url::parse(&raw).map_err(|source| PhotoServiceError::InvalidUrl { url: raw, source })
}

#[cfg(test)]
#[path = "tests/photo_service_tests.rs"]
mod tests;

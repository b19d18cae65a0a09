use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{domain::AssetId, error::remote_message, protocol::UploadedAsset};

use crate::{error::UploadError, image::LocalFile};

/// The external media host. `upload` returns the stored asset's retrieval
/// URL and stable identifier; `delete_asset` removes one by identifier.
///
/// Content constraints (image content type, size limit) are the caller's
/// responsibility before `upload` is ever invoked. Every call site treats
/// `delete_asset` as best-effort: an orphaned remote asset beats blocking
/// the user-facing operation.
#[async_trait]
pub trait MediaGateway: Send + Sync {
    async fn upload(&self, file: &LocalFile) -> Result<UploadedAsset, UploadError>;
    async fn delete_asset(&self, public_id: &AssetId) -> Result<(), UploadError>;
}

pub struct HttpMediaGateway {
    http: Client,
    media_url: String,
}

impl HttpMediaGateway {
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            media_url: media_url.into(),
        }
    }
}

async fn check_status(response: Response) -> Result<Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .as_deref()
        .and_then(remote_message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(UploadError::Rejected { status, message })
}

#[async_trait]
impl MediaGateway for HttpMediaGateway {
    async fn upload(&self, file: &LocalFile) -> Result<UploadedAsset, UploadError> {
        let response = self
            .http
            .post(format!("{}/upload", self.media_url))
            .query(&[
                ("filename", file.filename.as_str()),
                ("content_type", file.content_type.as_str()),
            ])
            .body(file.bytes.clone())
            .send()
            .await?;
        let asset = check_status(response).await?.json().await?;
        Ok(asset)
    }

    async fn delete_asset(&self, public_id: &AssetId) -> Result<(), UploadError> {
        let response = self
            .http
            .delete(format!("{}/assets/{public_id}", self.media_url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;

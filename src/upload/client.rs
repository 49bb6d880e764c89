use crate::upload::types::{SelectedFile, UploadError, UploadReceipt};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, info, warn};

/// Multipart field carrying the file bytes.
pub const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    image_url: Option<String>,
    error: Option<String>,
}

/// Sends one selected file somewhere and reports where it ended up.
pub trait UploadBackend: Send + Sync + 'static {
    fn upload(
        &self,
        file: SelectedFile,
    ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl UploadBackend for HttpUploader {
    fn upload(
        &self,
        file: SelectedFile,
    ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        async move {
            let bytes = file.read().await?;
            let size = bytes.len();
            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(file.mime().essence_str())?;
            let form = Form::new().part(UPLOAD_FIELD, part);

            info!(file = %file.name, size, endpoint = %endpoint, "sending upload request");

            let response = client.post(&endpoint).multipart(form).send().await?;
            let status = response.status();
            let body = response.text().await?;
            debug!(%status, body = %body, "upload response received");

            interpret_response(status, &body)
        }
    }
}

/// Classifies a server reply.
///
/// Only a 2xx status together with `"success": true` counts as an upload.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<UploadReceipt, UploadError> {
    let parsed: UploadResponse = serde_json::from_str(body).map_err(|e| {
        warn!(%status, "upload response is not valid JSON: {}", e);
        UploadError::Transport(format!("invalid response body: {}", e))
    })?;

    if !(status.is_success() && parsed.success) {
        let message = parsed.error.unwrap_or_else(|| "Unknown error".to_string());
        warn!(%status, "upload rejected: {}", message);
        return Err(UploadError::Rejected(message));
    }

    if parsed.image_url.is_none() {
        warn!(%status, "upload succeeded without an image URL");
    }
    Ok(UploadReceipt {
        image_url: parsed.image_url.unwrap_or_default(),
    })
}

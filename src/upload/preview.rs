use crate::upload::types::{Preview, SelectedFile, UploadError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use eframe::egui::ColorImage;
use tracing::debug;

/// Longest edge of the decoded preview; larger images are downscaled.
pub const MAX_PREVIEW_EDGE: u32 = 1024;

/// Reads the whole file and derives its preview.
pub async fn build_preview(file: SelectedFile) -> Result<Preview, UploadError> {
    let bytes = file.read().await?;
    let mime = file.mime();

    tokio::task::spawn_blocking(move || Preview::from_bytes(&bytes, mime.essence_str()))
        .await
        .map_err(|e| UploadError::Preview(e.to_string()))
}

impl Preview {
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Self {
        Self {
            data_uri: data_uri(bytes, mime),
            byte_len: bytes.len(),
            image: decode_image(bytes),
        }
    }
}

pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

fn decode_image(bytes: &[u8]) -> Option<ColorImage> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!("payload is not a decodable image: {}", e);
            return None;
        }
    };

    let decoded = if decoded.width().max(decoded.height()) > MAX_PREVIEW_EDGE {
        decoded.thumbnail(MAX_PREVIEW_EDGE, MAX_PREVIEW_EDGE)
    } else {
        decoded
    };

    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

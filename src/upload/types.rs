use derivative::Derivative;
use eframe::egui::ColorImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Prompt shown when an upload is requested before anything was picked.
pub const NO_FILE_PROMPT: &str = "Please select an image first.";

#[derive(Debug, Clone)]
pub enum FileContent {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// The file the user picked or dropped, not yet read.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content: FileContent,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);
        Self {
            name,
            content: FileContent::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::Bytes(bytes.into()),
        }
    }

    /// MIME type guessed from the file name, `application/octet-stream` when unknown.
    pub fn mime(&self) -> mime_guess::Mime {
        mime_guess::from_path(&self.name).first_or_octet_stream()
    }

    pub async fn read(&self) -> Result<Vec<u8>, UploadError> {
        match &self.content {
            FileContent::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| UploadError::Read {
                        name: self.name.clone(),
                        source,
                    })
            }
            FileContent::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Where a selection came from.
///
/// The picker is restricted to image extensions; drops are taken as-is.
#[derive(Debug, Clone)]
pub enum FileSource {
    Picker(PathBuf),
    Dropped {
        name: String,
        path: Option<PathBuf>,
        bytes: Option<Arc<[u8]>>,
    },
}

impl FileSource {
    pub fn into_selected(self) -> Option<SelectedFile> {
        match self {
            FileSource::Picker(path) => Some(SelectedFile::from_path(path)),
            FileSource::Dropped { name, path, bytes } => match (path, bytes) {
                (Some(path), _) => {
                    let mut file = SelectedFile::from_path(path);
                    if !name.is_empty() {
                        file.name = name;
                    }
                    Some(file)
                }
                (None, Some(bytes)) => Some(SelectedFile::from_bytes(name, bytes)),
                (None, None) => None,
            },
        }
    }
}

/// Locally generated rendition of the selected file.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Preview {
    /// `data:<mime>;base64,<payload>` of the full file contents.
    #[derivative(Debug = "ignore")]
    pub data_uri: String,
    pub byte_len: usize,
    /// Decoded pixels, absent when the payload is not a decodable image.
    #[derivative(Debug = "ignore")]
    pub image: Option<ColorImage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub image_url: String,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{}", NO_FILE_PROMPT)]
    NoFileSelected,

    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Transport(String),

    /// The server answered but reported a failure.
    #[error("{0}")]
    Rejected(String),

    #[error("preview generation failed: {0}")]
    Preview(String),
}

impl UploadError {
    /// Text shown to the user next to the error status.
    pub fn status_message(&self) -> String {
        match self {
            UploadError::NoFileSelected => self.to_string(),
            _ => format!("Error: {}", self),
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_file_prefers_path_and_keeps_drop_name() {
        let source = FileSource::Dropped {
            name: "cat.png".to_string(),
            path: Some(PathBuf::from("/tmp/upload/cat.png")),
            bytes: None,
        };
        let file = source.into_selected().expect("path drop is selectable");
        assert_eq!(file.name, "cat.png");
        assert!(matches!(file.content, FileContent::Path(_)));
    }

    #[test]
    fn dropped_file_without_content_is_ignored() {
        let source = FileSource::Dropped {
            name: "ghost.png".to_string(),
            path: None,
            bytes: None,
        };
        assert!(source.into_selected().is_none());
    }

    #[test]
    fn mime_is_guessed_from_name() {
        let file = SelectedFile::from_bytes("photo.JPG", vec![0u8; 4]);
        assert_eq!(file.mime().essence_str(), "image/jpeg");

        let unknown = SelectedFile::from_bytes("blob", vec![0u8; 4]);
        assert_eq!(unknown.mime().essence_str(), "application/octet-stream");
    }

    #[test]
    fn status_messages_match_user_facing_text() {
        assert_eq!(
            UploadError::NoFileSelected.status_message(),
            "Please select an image first."
        );
        let rejected = UploadError::Rejected("bad format".to_string());
        assert_eq!(rejected.status_message(), "Error: bad format");
    }

    #[tokio::test]
    async fn reading_a_missing_file_reports_its_name() {
        let file = SelectedFile::from_path("/definitely/not/here.png");
        let err = file.read().await.expect_err("missing file must fail");
        assert!(err.to_string().contains("here.png"));
    }
}

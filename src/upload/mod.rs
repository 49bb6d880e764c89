mod client;
mod controller;
mod preview;
mod types;

pub use client::HttpUploader;
pub use controller::UploadController;
pub use types::{FileSource, SubmissionStatus};

use crate::upload::client::UploadBackend;
use crate::upload::preview::build_preview;
use crate::upload::types::{
    FileSource, Preview, SelectedFile, SubmissionStatus, UploadError, UploadReceipt,
};
use derivative::Derivative;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Shown in place of the URL when the server reported success without one.
const MISSING_URL: &str = "(none)";

/// Completion of background work, tagged with the token it was started under.
#[derive(Debug)]
pub enum ControllerEvent {
    PreviewReady {
        token: u64,
        result: Result<Preview, UploadError>,
    },
    UploadFinished {
        token: u64,
        result: Result<UploadReceipt, UploadError>,
    },
}

#[derive(Debug, Default)]
pub struct UploadState {
    pub file: Option<SelectedFile>,
    pub preview: Option<Preview>,
    /// Why the preview for the current file could not be produced.
    pub preview_error: Option<String>,
    pub status: SubmissionStatus,
    pub message: Option<String>,
    pub receipt: Option<UploadReceipt>,
}

impl UploadState {
    pub fn clear(&mut self) {
        *self = UploadState::default();
    }

    pub fn is_uploading(&self) -> bool {
        self.status == SubmissionStatus::Uploading
    }
}

/// Owns one upload session: the selection, its preview and a single request.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct UploadController<B> {
    #[derivative(Debug = "ignore")]
    backend: Arc<B>,
    #[derivative(Debug = "ignore")]
    runtime: Handle,
    state: UploadState,
    selection_token: u64,
    request_token: u64,
    #[derivative(Debug = "ignore")]
    events_tx: UnboundedSender<ControllerEvent>,
    #[derivative(Debug = "ignore")]
    events_rx: UnboundedReceiver<ControllerEvent>,
}

impl<B: UploadBackend> UploadController<B> {
    pub fn new(backend: B, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend: Arc::new(backend),
            runtime,
            state: UploadState::default(),
            selection_token: 0,
            request_token: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selection_token(&self) -> u64 {
        self.selection_token
    }

    pub fn can_submit(&self) -> bool {
        self.state.file.is_some() && !self.state.is_uploading()
    }

    /// Replaces the selection and starts reading it into a preview.
    ///
    /// Returns `false` when the source carries neither a path nor bytes.
    pub fn select_file(&mut self, source: FileSource) -> bool {
        let Some(file) = source.into_selected() else {
            warn!("ignoring selection without readable content");
            return false;
        };

        self.selection_token += 1;
        let token = self.selection_token;
        info!(file = %file.name, token, "file selected");

        self.state.file = Some(file.clone());
        self.state.preview = None;
        self.state.preview_error = None;
        self.state.message = None;
        self.state.receipt = None;
        if !self.state.is_uploading() {
            self.state.status = SubmissionStatus::Idle;
        }

        let events = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = build_preview(file).await;
            let _ = events.send(ControllerEvent::PreviewReady { token, result });
        });
        true
    }

    pub fn clear_selection(&mut self) {
        info!("selection cleared");
        // A pending preview read must not resurrect the cleared selection.
        self.selection_token += 1;
        let uploading = self.state.is_uploading();
        self.state.clear();
        if uploading {
            self.state.status = SubmissionStatus::Uploading;
        }
    }

    /// Starts an upload of the current selection.
    ///
    /// Returns `true` only when a request was actually issued.
    pub fn submit(&mut self) -> bool {
        if self.state.is_uploading() {
            debug!("upload already in flight, ignoring submit");
            return false;
        }

        let Some(file) = self.state.file.clone() else {
            let err = UploadError::NoFileSelected;
            warn!("submit without a selected file");
            self.state.status = SubmissionStatus::Error;
            self.state.message = Some(err.status_message());
            return false;
        };

        self.request_token += 1;
        let token = self.request_token;
        info!(file = %file.name, token, "upload started");

        self.state.status = SubmissionStatus::Uploading;
        self.state.message = None;
        self.state.receipt = None;

        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = backend.upload(file).await;
            let _ = events.send(ControllerEvent::UploadFinished { token, result });
        });
        true
    }

    /// Applies every completion that has arrived so far.
    pub fn poll(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    /// Waits for the next completion and applies it.
    pub async fn next_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::PreviewReady { token, result } => {
                if token != self.selection_token {
                    debug!(token, current = self.selection_token, "dropping stale preview");
                    return;
                }
                match result {
                    Ok(preview) => {
                        debug!(token, bytes = preview.byte_len, "preview ready");
                        self.state.preview = Some(preview);
                    }
                    Err(e) => {
                        warn!(token, "preview failed: {}", e);
                        self.state.preview_error = Some(e.to_string());
                    }
                }
            }
            ControllerEvent::UploadFinished { token, result } => {
                if token != self.request_token || !self.state.is_uploading() {
                    debug!(token, current = self.request_token, "dropping stale upload result");
                    return;
                }
                match result {
                    Ok(receipt) => {
                        info!(url = %receipt.image_url, "upload succeeded");
                        let url = if receipt.image_url.is_empty() {
                            MISSING_URL
                        } else {
                            receipt.image_url.as_str()
                        };
                        self.state.status = SubmissionStatus::Success;
                        self.state.message =
                            Some(format!("Image uploaded successfully! URL: {}", url));
                        self.state.receipt = Some(receipt);
                    }
                    Err(e) => {
                        warn!("upload failed: {}", e);
                        self.state.status = SubmissionStatus::Error;
                        self.state.message = Some(e.status_message());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::client::HttpUploader;
    use serde_json::json;
    use std::future::Future;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone)]
    enum Reply {
        Stored(&'static str),
        Rejected(&'static str),
        Unreachable(&'static str),
    }

    struct FakeBackend {
        reply: Reply,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn new(reply: Reply) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = Self {
                reply,
                calls: Arc::clone(&calls),
                gate: None,
            };
            (backend, calls)
        }
    }

    impl UploadBackend for FakeBackend {
        fn upload(
            &self,
            _file: SelectedFile,
        ) -> impl Future<Output = Result<UploadReceipt, UploadError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.reply.clone();
            let gate = self.gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                match reply {
                    Reply::Stored(url) => Ok(UploadReceipt {
                        image_url: url.to_string(),
                    }),
                    Reply::Rejected(message) => Err(UploadError::Rejected(message.to_string())),
                    Reply::Unreachable(text) => Err(UploadError::Transport(text.to_string())),
                }
            }
        }
    }

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }

    fn controller(reply: Reply) -> (UploadController<FakeBackend>, Arc<AtomicUsize>) {
        let (backend, calls) = FakeBackend::new(reply);
        (UploadController::new(backend, Handle::current()), calls)
    }

    #[tokio::test]
    async fn selecting_a_file_produces_a_preview() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_file(dir.path(), "a.png", b"aaaa");
        let (mut ctl, _) = controller(Reply::Stored("https://x/y.png"));

        assert!(ctl.select_file(FileSource::Picker(path)));
        assert!(ctl.state().preview.is_none());
        ctl.next_event().await;

        let preview = ctl.state().preview.as_ref().expect("preview ready");
        assert!(!preview.data_uri.is_empty());
        assert_eq!(ctl.state().status, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn clearing_empties_preview_and_status() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_file(dir.path(), "a.png", b"aaaa");
        let (mut ctl, _) = controller(Reply::Rejected("bad format"));

        ctl.select_file(FileSource::Picker(path));
        ctl.next_event().await;
        ctl.submit();
        ctl.next_event().await;
        assert_eq!(ctl.state().status, SubmissionStatus::Error);

        ctl.clear_selection();
        assert!(ctl.state().file.is_none());
        assert!(ctl.state().preview.is_none());
        assert!(ctl.state().message.is_none());
        assert_eq!(ctl.state().status, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn selecting_after_error_returns_to_idle() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let first = write_file(dir.path(), "a.png", b"aaaa");
        let second = write_file(dir.path(), "b.png", b"bbbb");
        let (mut ctl, _) = controller(Reply::Rejected("bad format"));

        ctl.select_file(FileSource::Picker(first));
        ctl.next_event().await;
        ctl.submit();
        ctl.next_event().await;
        assert_eq!(ctl.state().status, SubmissionStatus::Error);

        ctl.select_file(FileSource::Picker(second));
        assert_eq!(ctl.state().status, SubmissionStatus::Idle);
        assert!(ctl.state().message.is_none());
        assert!(ctl.state().receipt.is_none());
        assert_eq!(ctl.state().file.as_ref().map(|f| f.name.as_str()), Some("b.png"));
    }

    #[tokio::test]
    async fn selecting_after_success_returns_to_idle() {
        let (mut ctl, _) = controller(Reply::Stored("https://x/y.png"));
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.next_event().await;
        ctl.submit();
        ctl.next_event().await;
        assert_eq!(ctl.state().status, SubmissionStatus::Success);
        assert!(ctl.state().receipt.is_some());

        ctl.select_file(FileSource::Dropped {
            name: "z.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        assert_eq!(ctl.state().status, SubmissionStatus::Idle);
        assert!(ctl.state().message.is_none());
        assert!(ctl.state().receipt.is_none());
    }

    #[tokio::test]
    async fn success_without_url_uses_placeholder() {
        let (mut ctl, _) = controller(Reply::Stored(""));
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.next_event().await;
        ctl.submit();
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Success);
        assert_eq!(
            ctl.state().message.as_deref(),
            Some("Image uploaded successfully! URL: (none)")
        );
    }

    #[tokio::test]
    async fn pending_read_is_discarded_after_clear() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = write_file(dir.path(), "a.png", b"aaaa");
        let (mut ctl, _) = controller(Reply::Stored("https://x/y.png"));

        ctl.select_file(FileSource::Picker(path));
        ctl.clear_selection();
        ctl.next_event().await;

        assert!(ctl.state().preview.is_none());
        assert!(ctl.state().file.is_none());
    }

    #[tokio::test]
    async fn submit_without_file_never_calls_backend() {
        let (mut ctl, calls) = controller(Reply::Stored("https://x/y.png"));

        assert!(!ctl.submit());

        assert_eq!(ctl.state().status, SubmissionStatus::Error);
        assert_eq!(
            ctl.state().message.as_deref(),
            Some("Please select an image first.")
        );
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_upload_reports_url() {
        let (mut ctl, calls) = controller(Reply::Stored("https://x/y.png"));
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.next_event().await;

        assert!(ctl.submit());
        assert_eq!(ctl.state().status, SubmissionStatus::Uploading);
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Success);
        let message = ctl.state().message.as_deref().expect("message set");
        assert!(message.contains("https://x/y.png"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(ctl.can_submit());
    }

    #[tokio::test]
    async fn rejected_upload_reports_server_error() {
        let (mut ctl, _) = controller(Reply::Rejected("bad format"));
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.submit();
        // One completion for the preview, one for the upload.
        ctl.next_event().await;
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Error);
        assert!(ctl
            .state()
            .message
            .as_deref()
            .is_some_and(|m| m.contains("bad format")));
    }

    #[tokio::test]
    async fn transport_failure_reports_transport_text() {
        let (mut ctl, _) = controller(Reply::Unreachable("connection refused"));
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.submit();
        ctl.next_event().await;
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Error);
        assert_eq!(
            ctl.state().message.as_deref(),
            Some("Error: connection refused")
        );
    }

    #[tokio::test]
    async fn submit_while_uploading_is_inert() {
        let gate = Arc::new(Notify::new());
        let (mut backend, calls) = FakeBackend::new(Reply::Stored("https://x/y.png"));
        backend.gate = Some(Arc::clone(&gate));
        let mut ctl = UploadController::new(backend, Handle::current());

        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.next_event().await;

        assert!(ctl.submit());
        assert!(!ctl.can_submit());
        assert!(!ctl.submit());
        assert!(!ctl.submit());
        assert_eq!(ctl.state().status, SubmissionStatus::Uploading);

        gate.notify_one();
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn latest_selection_wins_over_pending_read() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let first = write_file(dir.path(), "first.png", b"first");
        let second = write_file(dir.path(), "second.png", b"second");
        let (mut ctl, _) = controller(Reply::Stored("https://x/y.png"));

        ctl.select_file(FileSource::Picker(first));
        ctl.select_file(FileSource::Picker(second));
        ctl.next_event().await;
        ctl.next_event().await;

        let preview = ctl.state().preview.as_ref().expect("preview ready");
        assert_eq!(preview.data_uri, "data:image/png;base64,c2Vjb25k");
        assert_eq!(ctl.state().file.as_ref().map(|f| f.name.as_str()), Some("second.png"));
    }

    #[tokio::test]
    async fn unreadable_file_leaves_preview_empty_with_reason() {
        let (mut ctl, _) = controller(Reply::Stored("https://x/y.png"));

        ctl.select_file(FileSource::Picker(PathBuf::from("/no/such/dir/z.png")));
        ctl.next_event().await;

        assert!(ctl.state().preview.is_none());
        assert!(ctl.state().preview_error.is_some());
        assert_eq!(ctl.state().status, SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn uploads_through_http_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "image_url": "https://x/y.png",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpUploader::new(format!("{}/upload", server.uri()));
        let mut ctl = UploadController::new(backend, Handle::current());
        ctl.select_file(FileSource::Dropped {
            name: "y.png".to_string(),
            path: None,
            bytes: Some(Arc::from(&b"png"[..])),
        });
        ctl.submit();
        ctl.next_event().await;
        ctl.next_event().await;

        assert_eq!(ctl.state().status, SubmissionStatus::Success);
        assert_eq!(
            ctl.state().receipt.as_ref().map(|r| r.image_url.as_str()),
            Some("https://x/y.png")
        );
    }
}

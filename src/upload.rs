//! Upload controller: file selection → parse request → rendered report.
//!
//! The controller owns the selection state and drives a single
//! upload/response exchange per [`UploadController::parse`] call. All
//! presentation goes through an [`UploadView`] handed in at construction, so
//! the same controller works behind a terminal, a GUI, or a test recorder.
//!
//! # Example
//!
//! ```rust,no_run
//! use ot_cards::{ClientConfig, HttpEndpoint, NoopUploadView, UploadController};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let endpoint = HttpEndpoint::new(&ClientConfig::default())?;
//! let mut controller = UploadController::new(endpoint, Arc::new(NoopUploadView));
//! controller.select_file(Some("評估報告.docx".into()));
//! let rendered = controller.parse().await?;
//! println!("{}", rendered.to_text());
//! # Ok(())
//! # }
//! ```

use crate::config::ClientConfig;
use crate::error::ReportError;
use crate::parse::{file_name_of, parse_upload, read_report};
use crate::render::{render, RenderedReport};
use crate::report::{ErrorResponse, ParseResponse};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Label shown when nothing is selected.
pub const NO_FILE_LABEL: &str = "未選擇檔案";
/// Input error: parse requested with nothing selected.
pub const SELECT_FILE_FIRST: &str = "請先選擇檔案";
/// Shown while the request is in flight.
pub const LOADING_TEXT: &str = "正在解析檔案...";
/// Shown after a successful parse.
pub const SUCCESS_TEXT: &str = "✓ 解析成功！";
/// Prefix of every request/parse failure.
pub const FAILURE_TEXT: &str = "解析失敗";
/// How long the success status stays visible.
pub const SUCCESS_HIDE_AFTER: Duration = Duration::from_secs(3);

/// MIME type of the uploaded part.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ── Status area ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

/// One message for the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    /// Hide the message after this long; `None` keeps it until replaced.
    pub auto_hide: Option<Duration>,
}

impl StatusMessage {
    pub fn loading() -> Self {
        Self {
            kind: StatusKind::Loading,
            text: LOADING_TEXT.to_string(),
            auto_hide: None,
        }
    }

    pub fn success() -> Self {
        Self {
            kind: StatusKind::Success,
            text: SUCCESS_TEXT.to_string(),
            auto_hide: Some(SUCCESS_HIDE_AFTER),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            auto_hide: None,
        }
    }

    /// Status for a failed request: the detail when one is known, otherwise
    /// the generic failure text alone.
    pub fn failure(err: &ReportError) -> Self {
        match err.status_detail() {
            Some(detail) => Self::error(format!("{FAILURE_TEXT}: {detail}")),
            None => Self::error(FAILURE_TEXT),
        }
    }
}

// ── View ─────────────────────────────────────────────────────────────────────

/// Everything the controller shows, as events.
///
/// Implementations must be `Send + Sync`. All methods have default no-op
/// implementations so callers only override what they display.
pub trait UploadView: Send + Sync {
    /// The selection changed. `file_name` is `None` when it was cleared;
    /// `parse_enabled` mirrors whether a parse can be started.
    fn on_file_selected(&self, file_name: Option<&str>, parse_enabled: bool) {
        let _ = (file_name, parse_enabled);
    }

    /// The parse action was disabled (`true`) or restored (`false`).
    fn on_busy(&self, busy: bool) {
        let _ = busy;
    }

    /// Replace the status area.
    fn on_status(&self, status: &StatusMessage) {
        let _ = status;
    }

    /// Replace both the block region and the original-text region.
    fn on_rendered(&self, report: &RenderedReport) {
        let _ = report;
    }
}

/// A view that displays nothing.
pub struct NoopUploadView;

impl UploadView for NoopUploadView {}

/// Type stored by [`UploadController`].
pub type ViewHandle = Arc<dyn UploadView>;

// ── Endpoint ─────────────────────────────────────────────────────────────────

/// Where a selected file is sent to be parsed.
pub trait ParseEndpoint: Send + Sync {
    fn parse(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<ParseResponse, ReportError>> + Send;
}

/// `POST` the file as multipart field `file` to a parse server.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl HttpEndpoint {
    pub fn new(config: &ClientConfig) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: reqwest::Error) -> ReportError {
        if e.is_timeout() {
            ReportError::UploadTimeout {
                url: self.url.clone(),
                secs: self.timeout_secs,
            }
        } else {
            ReportError::UploadFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            }
        }
    }
}

impl ParseEndpoint for HttpEndpoint {
    async fn parse(&self, file_name: &str, bytes: Vec<u8>) -> Result<ParseResponse, ReportError> {
        info!("Uploading '{}' to {}", file_name, self.url);

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(DOCX_MIME)
            .map_err(|e| ReportError::Internal(format!("multipart part: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        debug!("Server answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .map(|e| e.error);
            return Err(ReportError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ReportError::MalformedResponse {
            detail: e.to_string(),
        })
    }
}

/// Parse in-process, applying the same validation as the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEndpoint;

impl ParseEndpoint for LocalEndpoint {
    async fn parse(&self, file_name: &str, bytes: Vec<u8>) -> Result<ParseResponse, ReportError> {
        parse_upload(file_name, bytes).await
    }
}

// ── Controller ───────────────────────────────────────────────────────────────

/// Drives one parse per click: select, upload, render.
pub struct UploadController<E: ParseEndpoint> {
    endpoint: E,
    view: ViewHandle,
    selected: Option<PathBuf>,
}

impl<E: ParseEndpoint> UploadController<E> {
    pub fn new(endpoint: E, view: ViewHandle) -> Self {
        Self {
            endpoint,
            view,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<&PathBuf> {
        self.selected.as_ref()
    }

    /// Whether a parse can be started.
    pub fn parse_enabled(&self) -> bool {
        self.selected.is_some()
    }

    /// Replace the selection and update the file-name label.
    pub fn select_file(&mut self, path: Option<PathBuf>) {
        self.selected = path;
        match &self.selected {
            Some(path) => {
                let name = file_name_of(path);
                debug!("Selected {}", name);
                self.view.on_file_selected(Some(&name), true);
            }
            None => self.view.on_file_selected(None, false),
        }
    }

    /// Upload the selected file and render the response.
    ///
    /// With nothing selected, reports the input error without touching the
    /// endpoint. Otherwise the action is disabled for the duration of the
    /// request and restored afterwards whatever the outcome.
    pub async fn parse(&mut self) -> Result<RenderedReport, ReportError> {
        let Some(path) = self.selected.clone() else {
            self.view.on_status(&StatusMessage::error(SELECT_FILE_FIRST));
            return Err(ReportError::NoFileSelected);
        };

        self.view.on_busy(true);
        self.view.on_status(&StatusMessage::loading());

        let result = self.upload(&path).await;

        let outcome = match result {
            Ok(response) => {
                let rendered = render(&response);
                self.view.on_rendered(&rendered);
                self.view.on_status(&StatusMessage::success());
                info!("Rendered {} blocks", rendered.blocks.len());
                Ok(rendered)
            }
            Err(e) => {
                warn!("Parse failed: {}", e);
                self.view.on_status(&StatusMessage::failure(&e));
                Err(e)
            }
        };

        self.view.on_busy(false);
        outcome
    }

    async fn upload(&self, path: &std::path::Path) -> Result<ParseResponse, ReportError> {
        let bytes = read_report(path).await?;
        self.endpoint.parse(&file_name_of(path), bytes).await
    }
}

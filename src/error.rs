//! Error types for the ot-cards library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ReportError`] — **Fatal** for the current operation: the upload or
//!   extraction cannot produce a report (no file selected, not a `.docx`,
//!   server rejected the file, response missing fields). Returned as
//!   `Err(ReportError)` from the parse entry points and the upload controller.
//!
//! * [`ClipboardError`] — **Non-fatal**: one clipboard backend failed. The
//!   [`crate::clipboard::ClipboardHelper`] falls back to its second backend
//!   and only reports an error when both have failed.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ot-cards library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Parse was requested with no file selected.
    #[error("No file selected")]
    NoFileSelected,

    /// Input file was not found at the given path.
    #[error("Report file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload does not carry a `.docx` file name.
    #[error("'{name}' is not a .docx file")]
    NotADocx { name: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// The bytes are not a readable zip archive.
    #[error("Invalid .docx archive: {detail}")]
    InvalidArchive { detail: String },

    /// The archive has no `word/document.xml` part.
    #[error("Archive has no word/document.xml part")]
    MissingDocumentXml,

    /// `word/document.xml` is not well-formed.
    #[error("Malformed document XML at byte {position}: {detail}")]
    MalformedXml { position: u64, detail: String },

    /// `word/document.xml` parsed but contains no `w:body`.
    #[error("Document XML has no w:body element")]
    MissingBody,

    // ── Transport errors ──────────────────────────────────────────────────
    /// The request could not be sent or the body could not be read.
    #[error("Upload to '{url}' failed: {reason}")]
    UploadFailed { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("Upload to '{url}' timed out after {secs}s\nIncrease --timeout.")]
    UploadTimeout { url: String, secs: u64 },

    /// The server answered with a non-success status.
    ///
    /// `message` holds the `error` field of the JSON body when present.
    #[error("Server answered HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ServerRejected {
        status: u16,
        message: Option<String>,
    },

    /// The success body is not a well-formed parse response.
    #[error("Malformed parse response: {detail}")]
    MalformedResponse { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Text suitable for the status area, without the English hints.
    ///
    /// Server rejections show the server-provided message verbatim. `None`
    /// means no detail is available and the caller should show its generic
    /// failure text alone.
    pub fn status_detail(&self) -> Option<String> {
        match self {
            ReportError::ServerRejected { message, .. } => message.clone(),
            ReportError::NoFileSelected => None,
            other => Some(other.to_string()),
        }
    }
}

/// A single clipboard backend failed.
#[derive(Debug, Clone, Error)]
pub enum ClipboardError {
    /// The backend cannot be used on this system (no display, no binary).
    #[error("{backend} clipboard unavailable: {detail}")]
    Unavailable { backend: &'static str, detail: String },

    /// The backend exists but rejected the write.
    #[error("{backend} clipboard rejected the write: {detail}")]
    WriteFailed { backend: &'static str, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_rejected_display_with_message() {
        let e = ReportError::ServerRejected {
            status: 400,
            message: Some("請上傳 .docx 檔案".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("請上傳 .docx 檔案"), "got: {msg}");
    }

    #[test]
    fn server_rejected_display_without_message() {
        let e = ReportError::ServerRejected {
            status: 502,
            message: None,
        };
        assert_eq!(e.to_string(), "Server answered HTTP 502");
    }

    #[test]
    fn status_detail_prefers_server_message() {
        let e = ReportError::ServerRejected {
            status: 500,
            message: Some("解析錯誤: bad zip".into()),
        };
        assert_eq!(e.status_detail().as_deref(), Some("解析錯誤: bad zip"));

        let e = ReportError::ServerRejected {
            status: 500,
            message: None,
        };
        assert_eq!(e.status_detail(), None);
    }

    #[test]
    fn upload_timeout_display() {
        let e = ReportError::UploadTimeout {
            url: "http://127.0.0.1:5001/api/parse".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("/api/parse"));
    }

    #[test]
    fn clipboard_error_names_backend() {
        let e = ClipboardError::Unavailable {
            backend: "xclip",
            detail: "not found".into(),
        };
        assert!(e.to_string().contains("xclip"));
        assert!(e.to_string().contains("not found"));
    }
}

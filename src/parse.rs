//! Report extraction entry points.
//!
//! These run the whole pipeline in-process: the server calls
//! [`parse_upload`] for every request, and the CLI's `--local` mode calls it
//! through [`crate::upload::LocalEndpoint`] without any HTTP hop.

use crate::error::ReportError;
use crate::pipeline::{docx, sections};
use crate::report::ParseResponse;
use std::path::Path;
use tracing::{debug, info};

/// File extension accepted for uploads.
pub const DOCX_EXTENSION: &str = ".docx";

/// Whether an upload name is acceptable as a report.
pub fn is_docx_name(name: &str) -> bool {
    name.ends_with(DOCX_EXTENSION)
}

/// Extract the structured report and original text from `.docx` bytes.
///
/// Synchronous and CPU-bound; use [`parse_upload`] from async code.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParseResponse, ReportError> {
    let text = docx::extract_text(bytes)?;
    let paragraphs = text.paragraphs();
    debug!(
        "{} elements, {} non-blank paragraphs",
        text.elements.len(),
        paragraphs.len()
    );

    Ok(ParseResponse {
        structure: sections::extract_sections(&paragraphs),
        original_text: text.original_text(),
    })
}

/// Validate the upload name, then parse on the blocking pool.
pub async fn parse_upload(file_name: &str, bytes: Vec<u8>) -> Result<ParseResponse, ReportError> {
    if !is_docx_name(file_name) {
        return Err(ReportError::NotADocx {
            name: file_name.to_string(),
        });
    }
    info!("Parsing '{}' ({} bytes)", file_name, bytes.len());

    tokio::task::spawn_blocking(move || parse_bytes(&bytes))
        .await
        .map_err(|e| ReportError::Internal(format!("Parse task panicked: {e}")))?
}

/// Read and parse a `.docx` file from disk.
pub async fn parse_file(path: impl AsRef<Path>) -> Result<ParseResponse, ReportError> {
    let path = path.as_ref();
    let bytes = read_report(path).await?;
    parse_upload(&file_name_of(path), bytes).await
}

/// Synchronous wrapper around [`parse_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn parse_file_sync(path: impl AsRef<Path>) -> Result<ParseResponse, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(parse_file(path))
}

/// Read a report file, mapping I/O failures to input errors.
pub(crate) async fn read_report(path: &Path) -> Result<Vec<u8>, ReportError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ReportError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ReportError::FileNotFound {
            path: path.to_path_buf(),
        },
    })
}

/// Last path component as the upload name.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::sample_report_docx;
    use std::io::Write;

    #[test]
    fn docx_name_check_is_suffix_only() {
        assert!(is_docx_name("評估報告.docx"));
        assert!(!is_docx_name("report.doc"));
        assert!(!is_docx_name("report.docx.pdf"));
        assert!(!is_docx_name(""));
    }

    #[test]
    fn parse_bytes_keeps_blank_lines_in_original_text() {
        let response = parse_bytes(&sample_report_docx()).unwrap();
        let lines: Vec<&str> = response.original_text.lines().collect();
        assert_eq!(lines[0], "兒童職能治療評估報告");
        assert_eq!(lines[1], "");
        assert_eq!(lines[3], "評估日期 | 2024/05/01");
        assert_eq!(response.structure.problem_analysis.len(), 2);
    }

    #[tokio::test]
    async fn parse_upload_rejects_other_extensions() {
        let err = parse_upload("report.pdf", sample_report_docx())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotADocx { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn parse_file_reads_from_disk() {
        let mut tmp = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        tmp.write_all(&sample_report_docx()).unwrap();
        let response = parse_file(tmp.path()).await.unwrap();
        assert_eq!(response.structure.assessment.other, "認知發展符合年齡。");
    }

    #[tokio::test]
    async fn parse_file_missing_path() {
        let err = parse_file("/nonexistent/report.docx").await.unwrap_err();
        assert!(matches!(err, ReportError::FileNotFound { .. }), "got: {err}");
    }
}

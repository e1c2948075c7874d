//! Integration tests: the real server on an ephemeral port, driven over HTTP
//! by the upload controller.
//!
//! Run with:
//!   cargo test --test roundtrip -- --nocapture
#![cfg(feature = "server")]

use ot_cards::{
    ClientConfig, HttpEndpoint, ParseEndpoint, ReportError, ServerConfig, StatusKind,
    StatusMessage, UploadController, UploadView,
};
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// ── Test helpers ─────────────────────────────────────────────────────────────

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn docx(lines: &[&str]) -> Vec<u8> {
    let body: String = lines
        .iter()
        .map(|l| format!("<w:p><w:r><w:t>{l}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(r#"<w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn short_report() -> Vec<u8> {
    docx(&[
        "兒童職能治療評估報告",
        "一、家屬主訴與期待",
        "希望能自己穿衣服。",
        "二、職能評估",
        "穿脫衣：□無異常 ■發展遲緩",
        "行為觀察及綜合結果：",
        "需協助扣釦子。",
        "三、問題分析",
        "雙手協調不足。",
        "四、總結與建議",
        "精細動作部分：",
        "練習扣釦子。",
    ])
}

/// Start the server on an ephemeral port and return the parse URL.
async fn start_server() -> (tempfile::TempDir, String) {
    let static_dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::builder()
        .static_dir(static_dir.path())
        .build()
        .unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    tokio::spawn(async move { ot_cards::server::serve_on(listener, &config).await });

    (static_dir, format!("http://{addr}/api/parse"))
}

fn endpoint(url: &str) -> HttpEndpoint {
    let config = ClientConfig::builder()
        .endpoint(url)
        .timeout_secs(10)
        .build()
        .unwrap();
    HttpEndpoint::new(&config).unwrap()
}

#[derive(Default)]
struct StatusLog(Mutex<Vec<StatusMessage>>);

impl UploadView for StatusLog {
    fn on_status(&self, status: &StatusMessage) {
        self.0.lock().unwrap().push(status.clone());
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn controller_parses_through_server() {
    let (_static, url) = start_server().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.docx");
    std::fs::write(&path, short_report()).unwrap();

    let log = Arc::new(StatusLog::default());
    let mut controller = UploadController::new(endpoint(&url), log.clone());
    controller.select_file(Some(path));

    let rendered = controller.parse().await.unwrap();
    assert_eq!(rendered.blocks.len(), 11);
    assert!(rendered.blocks[0]
        .content
        .starts_with("家屬主訴與期待\n希望能自己穿衣服。\n\n問題分析\n1. 雙手協調不足。"));
    assert_eq!(rendered.blocks[3].content, "- 練習扣釦子。");
    assert_eq!(rendered.blocks[7].content, "需協助扣釦子。");
    assert!(rendered.original_text.starts_with("兒童職能治療評估報告\n"));

    let statuses = log.0.lock().unwrap();
    assert_eq!(statuses.last().unwrap().kind, StatusKind::Success);
}

#[tokio::test]
async fn server_rejection_message_reaches_status() {
    let (_static, url) = start_server().await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, b"%PDF-1.4").unwrap();

    let log = Arc::new(StatusLog::default());
    let mut controller = UploadController::new(endpoint(&url), log.clone());
    controller.select_file(Some(path));

    let err = controller.parse().await.unwrap_err();
    assert!(
        matches!(err, ReportError::ServerRejected { status: 400, .. }),
        "got: {err}"
    );
    let last = log.0.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.kind, StatusKind::Error);
    assert!(last.text.contains("請上傳 .docx 檔案"), "got: {}", last.text);
}

#[tokio::test]
async fn broken_archive_is_server_error() {
    let (_static, url) = start_server().await;

    let err = endpoint(&url)
        .parse("report.docx", b"not a zip".to_vec())
        .await
        .unwrap_err();
    match err {
        ReportError::ServerRejected { status, message } => {
            assert_eq!(status, 500);
            assert!(message.unwrap().starts_with("解析錯誤: "));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_upload_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = endpoint(&format!("http://{addr}/api/parse"))
        .parse("report.docx", short_report())
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::UploadFailed { .. }), "got: {err}");
}

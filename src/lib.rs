//! # ot-cards
//!
//! Turn an occupational-therapy evaluation report (`.docx`) into a fixed set
//! of titled, copyable text cards.
//!
//! A therapist writes the report from a standard template. This crate locates
//! the template's sections in the document text, returns them as a structured
//! [`ParsedReport`] plus the raw text, and renders that into eleven blocks
//! ready to paste into another system one at a time.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .docx
//!  │
//!  ├─ 1. Docx      unzip, stream word/document.xml into ordered text elements
//!  ├─ 2. Sections  match template headings, fill ParsedReport
//!  ├─ 3. Transport POST /api/parse (HttpEndpoint) or in-process (LocalEndpoint)
//!  ├─ 4. Render    11 fixed blocks + original text
//!  └─ 5. Copy      system clipboard, falling back to a copy command
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ot_cards::{parse_file, render};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let response = parse_file("評估報告.docx").await?;
//!     let rendered = render(&response);
//!     for block in &rendered.blocks {
//!         println!("【{}】\n{}\n", block.title, block.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `ot-cards` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server`    | on      | [`server`] module: axum router for `POST /api/parse` and static files |
//! | `clipboard` | on      | [`SystemClipboard`] through arboard |
//!
//! Library-only use without the server or the clipboard:
//! ```toml
//! ot-cards = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clipboard;
pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod report;
#[cfg(feature = "server")]
pub mod server;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

#[cfg(feature = "clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{ClipboardBackend, ClipboardHelper, CommandClipboard, CopyPath, CopyToast, NoClipboard};
pub use config::{ClientConfig, ClientConfigBuilder, ServerConfig, ServerConfigBuilder};
pub use error::{ClipboardError, ReportError};
pub use parse::{parse_bytes, parse_file, parse_file_sync, parse_upload};
pub use render::{render, render_blocks, Block, RenderedReport};
pub use report::{DailyActivity, ErrorResponse, ParseResponse, ParsedReport};
pub use upload::{
    HttpEndpoint, LocalEndpoint, NoopUploadView, ParseEndpoint, StatusKind, StatusMessage,
    UploadController, UploadView,
};

//! Block rendering: structured report → titled, copyable text blocks.
//!
//! The block list is a fixed template. Its order and titles never depend on
//! the content, so a reader always finds a section at the same position, and
//! empty sections still render as (empty) blocks.

use crate::report::{DailyActivity, ParseResponse, ParsedReport};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// One titled, copyable unit of rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub title: String,
    pub content: String,
}

impl Block {
    fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Everything the view shows after a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    /// Formatted blocks, in template order.
    pub blocks: Vec<Block>,
    /// The document's raw text, shown verbatim.
    pub original_text: String,
}

impl RenderedReport {
    /// Plain-text rendition of all blocks followed by the original text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            let _ = writeln!(out, "【{}】{}", i + 1, block.title);
            out.push_str(&block.content);
            out.push_str("\n\n");
        }
        out.push_str("【原始文件】\n");
        out.push_str(&self.original_text);
        out.push('\n');
        out
    }

    /// Write [`to_text`](Self::to_text) to `path` atomically.
    pub fn write_to(&self, path: &Path) -> Result<(), crate::error::ReportError> {
        crate::output::write_atomic(path, self.to_text().as_bytes())
    }
}

/// Title of the comprehensive first block.
pub const COMPREHENSIVE_TITLE: &str = "職能治療評估";

/// Render a parse response into blocks plus the original text.
pub fn render(response: &ParseResponse) -> RenderedReport {
    RenderedReport {
        blocks: render_blocks(&response.structure),
        original_text: response.original_text.clone(),
    }
}

/// Produce the fixed block sequence for a report.
pub fn render_blocks(report: &ParsedReport) -> Vec<Block> {
    let fine = &report.assessment.fine_motor;
    let sensory = &report.assessment.sensory_integration;
    let recs = &report.recommendations;

    let mut blocks = vec![
        Block::new(COMPREHENSIVE_TITLE, comprehensive(report)),
        Block::new("精細動作 - 評估工具", fine.results.join("\n")),
        Block::new("精細動作 - 行為觀察及綜合結果", fine.observations.join("\n")),
        Block::new("精細動作訓練 - 具體建議", bulleted(&recs.fine_motor)),
        Block::new("感覺統合 - 行為觀察及綜合結果", sensory.observations.join("\n")),
        Block::new("感覺統合訓練 - 具體建議", bulleted(&recs.sensory_integration)),
    ];

    blocks.extend(DailyActivity::ALL.iter().map(|&activity| {
        Block::new(
            format!("日常生活自理 - {}", activity.label()),
            report.assessment.daily_living.get(activity).observation.clone(),
        )
    }));

    blocks
}

fn comprehensive(report: &ParsedReport) -> String {
    let recs = &report.recommendations;
    format!(
        "家屬主訴與期待\n{}\n\n\
         問題分析\n{}\n\n\
         總結與建議\n\
         精細動作部分\n{}\n\n\
         認知發展\n{}\n\n\
         感覺統合部分\n{}\n\n\
         人際互動部分\n{}",
        report.family_concerns,
        numbered(&report.problem_analysis),
        bulleted(&recs.fine_motor),
        bulleted(&recs.cognitive),
        bulleted(&recs.sensory_integration),
        bulleted(&recs.social),
    )
}

/// `1. a\n2. b`
pub fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- a\n- b`
pub fn bulleted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Text extraction: `.docx` bytes → ordered body elements.
//!
//! A `.docx` file is a zip archive; the document text lives in
//! `word/document.xml` as WordprocessingML. Only the direct children of
//! `w:body` matter here:
//!
//! * `w:p` becomes one element holding the concatenated `w:t` runs
//!   (an empty paragraph becomes `""`);
//! * `w:tbl` becomes one element per `w:tr`, its `w:tc` cells joined with
//!   `" | "`. Rows of nested tables follow their outer row, and an outer row
//!   also lists the nested cells.
//!
//! Element names are matched in the WordprocessingML namespace only, so text
//! of other vocabularies (`m:t` in equations) never leaks in. Everything else
//! (section properties, bookmarks, drawings) is skipped. The XML is streamed
//! with quick-xml, so memory stays proportional to the text, not to the
//! markup.

use crate::error::ReportError;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Archive member holding the main document.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Separator between table cells in a flattened row.
pub const CELL_SEPARATOR: &str = " | ";

/// WordprocessingML main namespace.
pub const W_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Largest decompressed `word/document.xml` accepted.
pub const MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Body elements of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxText {
    pub elements: Vec<String>,
}

impl DocxText {
    /// Every element joined by `\n`, blank paragraphs included.
    pub fn original_text(&self) -> String {
        self.elements.join("\n")
    }

    /// Elements with visible text, the input of section extraction.
    pub fn paragraphs(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter(|e| !e.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// Read a `.docx` archive from memory and extract its body elements.
pub fn extract_text(bytes: &[u8]) -> Result<DocxText, ReportError> {
    let xml = read_document_xml(bytes, MAX_DOCUMENT_BYTES)?;
    let elements = extract_elements(&xml)?;
    debug!("Extracted {} body elements", elements.len());
    Ok(DocxText { elements })
}

/// Pull `word/document.xml` out of the archive, reading at most `limit` bytes.
///
/// The sizes recorded in the archive are not trusted: the buffer grows with
/// what is actually decompressed.
fn read_document_xml(bytes: &[u8], limit: u64) -> Result<Vec<u8>, ReportError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ReportError::InvalidArchive {
            detail: e.to_string(),
        })?;

    let mut part = match archive.by_name(DOCUMENT_PART) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Err(ReportError::MissingDocumentXml),
        Err(e) => {
            return Err(ReportError::InvalidArchive {
                detail: e.to_string(),
            })
        }
    };

    let mut xml = Vec::new();
    part.by_ref()
        .take(limit.saturating_add(1))
        .read_to_end(&mut xml)
        .map_err(|e| ReportError::InvalidArchive {
            detail: format!("{DOCUMENT_PART}: {e}"),
        })?;
    if xml.len() as u64 > limit {
        return Err(ReportError::InvalidArchive {
            detail: format!("{DOCUMENT_PART} expands beyond {limit} bytes"),
        });
    }
    Ok(xml)
}

/// A `w:tr` being collected. Its slot in the element list is reserved when
/// it opens, so rows come out in document order even when nested.
struct OpenRow {
    slot: usize,
    cells: Vec<String>,
}

/// Rows and cells open inside one body-level table.
///
/// A row's cells are all `w:tc` below it, nested ones included, and a cell's
/// text is all text below it.
#[derive(Default)]
struct TableState {
    rows: Vec<OpenRow>,
    /// For each open `w:tc`: `(row, cell)` positions it writes into.
    cells: Vec<Vec<(usize, usize)>>,
}

impl TableState {
    fn open_row(&mut self, elements: &mut Vec<String>) {
        self.rows.push(OpenRow {
            slot: elements.len(),
            cells: Vec::new(),
        });
        elements.push(String::new());
    }

    fn close_row(&mut self, elements: &mut [String]) {
        if let Some(row) = self.rows.pop() {
            if let Some(slot) = elements.get_mut(row.slot) {
                *slot = row.cells.join(CELL_SEPARATOR);
            }
        }
    }

    fn open_cell(&mut self) {
        let targets = self
            .rows
            .iter_mut()
            .enumerate()
            .map(|(r, row)| {
                row.cells.push(String::new());
                (r, row.cells.len() - 1)
            })
            .collect();
        self.cells.push(targets);
    }

    fn close_cell(&mut self) {
        self.cells.pop();
    }

    fn text(&mut self, s: &str) {
        for targets in &self.cells {
            for &(r, c) in targets {
                if let Some(cell) = self.rows.get_mut(r).and_then(|row| row.cells.get_mut(c)) {
                    cell.push_str(s);
                }
            }
        }
    }
}

/// A body child currently being collected.
enum BodyChild {
    Paragraph { text: String, open_runs: usize },
    Table { table: TableState, open_runs: usize },
}

impl BodyChild {
    fn start(name: &[u8]) -> Option<Self> {
        match name {
            b"p" => Some(BodyChild::Paragraph {
                text: String::new(),
                open_runs: 0,
            }),
            b"tbl" => Some(BodyChild::Table {
                table: TableState::default(),
                open_runs: 0,
            }),
            _ => None,
        }
    }

    fn open(&mut self, name: &[u8], elements: &mut Vec<String>) {
        match self {
            BodyChild::Paragraph { open_runs, .. } => {
                if name == b"t" {
                    *open_runs += 1;
                }
            }
            BodyChild::Table { table, open_runs } => match name {
                b"tr" => table.open_row(elements),
                b"tc" => table.open_cell(),
                b"t" => *open_runs += 1,
                _ => {}
            },
        }
    }

    fn close(&mut self, name: &[u8], elements: &mut [String]) {
        match self {
            BodyChild::Paragraph { open_runs, .. } => {
                if name == b"t" {
                    *open_runs = open_runs.saturating_sub(1);
                }
            }
            BodyChild::Table { table, open_runs } => match name {
                b"t" => *open_runs = open_runs.saturating_sub(1),
                b"tc" => table.close_cell(),
                b"tr" => table.close_row(elements),
                _ => {}
            },
        }
    }

    fn text(&mut self, s: &str) {
        match self {
            BodyChild::Paragraph { text, open_runs } if *open_runs > 0 => text.push_str(s),
            BodyChild::Table { table, open_runs } if *open_runs > 0 => table.text(s),
            _ => {}
        }
    }

    fn finish(self, elements: &mut Vec<String>) {
        // Table rows were written into their slots as each w:tr closed.
        if let BodyChild::Paragraph { text, .. } = self {
            elements.push(text);
        }
    }
}

/// Local name of a WordprocessingML element; empty for any other namespace.
fn w_name<'n>(ns: &ResolveResult<'_>, local: &'n [u8]) -> &'n [u8] {
    match ns {
        ResolveResult::Bound(Namespace(uri)) if *uri == W_NS => local,
        _ => b"",
    }
}

/// Stream `document.xml` and collect the direct children of `w:body`.
fn extract_elements(xml: &[u8]) -> Result<Vec<String>, ReportError> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();
    let mut elements = Vec::new();

    let mut depth = 0usize;
    // Depth of w:body's direct children while inside w:body.
    let mut body_children: Option<usize> = None;
    let mut seen_body = false;
    let mut current: Option<(usize, BodyChild)> = None;

    loop {
        let (ns, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(resolved) => resolved,
            Err(e) => {
                let detail = e.to_string();
                return Err(ReportError::MalformedXml {
                    position: reader.error_position() as u64,
                    detail,
                });
            }
        };

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                let name = w_name(&ns, local.as_ref());
                if let Some((_, child)) = current.as_mut() {
                    child.open(name, &mut elements);
                } else if body_children == Some(depth) {
                    current = BodyChild::start(name).map(|child| (depth, child));
                } else if !seen_body && name == b"body" {
                    body_children = Some(depth + 1);
                    seen_body = true;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                let local = e.local_name();
                let name = w_name(&ns, local.as_ref());
                if let Some((_, child)) = current.as_mut() {
                    child.open(name, &mut elements);
                    child.close(name, &mut elements);
                } else if body_children == Some(depth) && name == b"p" {
                    elements.push(String::new());
                } else if !seen_body && name == b"body" {
                    seen_body = true;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match current.take() {
                    Some((start, child)) if start == depth => child.finish(&mut elements),
                    Some((start, mut child)) => {
                        let local = e.local_name();
                        child.close(w_name(&ns, local.as_ref()), &mut elements);
                        current = Some((start, child));
                    }
                    None => {
                        if body_children == Some(depth + 1) {
                            body_children = None;
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, child)) = current.as_mut() {
                    child.text(&String::from_utf8_lossy(&t));
                }
            }
            Event::CData(t) => {
                if let Some((_, child)) = current.as_mut() {
                    child.text(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, child)) = current.as_mut() {
                    match resolve_entity(&r) {
                        Some(ch) => child.text(ch.encode_utf8(&mut [0u8; 4])),
                        None => {
                            let name = String::from_utf8_lossy(&r);
                            warn!("Unknown entity &{};, kept verbatim", name);
                            child.text(&format!("&{name};"));
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_body {
        return Err(ReportError::MissingBody);
    }
    Ok(elements)
}

/// Resolve a predefined XML entity or a character reference (`#123`, `#x4E2D`).
fn resolve_entity(name: &[u8]) -> Option<char> {
    let name = std::str::from_utf8(name).ok()?;
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

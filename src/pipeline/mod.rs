//! Pipeline stages for report extraction.
//!
//! ## Data Flow
//!
//! ```text
//! docx ──▶ sections
//! (zip/xml)  (headings)
//! ```
//!
//! 1. [`docx`]     — open the archive, stream `word/document.xml`, flatten
//!    paragraphs and table rows into ordered text elements
//! 2. [`sections`] — locate the template headings in the non-blank elements
//!    and fill the structured report
//!
//! Both stages are synchronous and CPU-bound; async callers run them under
//! `spawn_blocking` (see [`crate::parse`]).

pub mod docx;
pub mod sections;

#[cfg(test)]
pub(crate) mod fixtures;

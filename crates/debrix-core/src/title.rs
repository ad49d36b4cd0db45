//! Best-effort parsing of stream titles into display filenames.
//!
//! Stream titles are presentation strings, typically `"<release>\n<file>"`
//! followed by an uploader line starting with `👤`. Nothing here is used to
//! decide which file gets resolved.

use crate::model::{StreamCandidate, StreamEntry};

const UPLOADER_MARKER: &str = "\n👤";

/// Display filename and file-index hint recovered from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    /// Last visible title line, shown as the file name.
    pub filename: String,
    /// Index hint, kept only when the title names a single file.
    pub file_index: Option<u32>,
}

/// Parse `title`; the index hint survives only for two-line titles.
#[must_use]
pub fn parse_stream_title(title: &str, file_index: Option<u32>) -> ParsedTitle {
    let visible = title
        .find(UPLOADER_MARKER)
        .map_or(title, |cut| &title[..cut]);
    let lines: Vec<&str> = visible.split('\n').collect();
    let filename = lines.last().copied().unwrap_or_default().to_string();
    let file_index = if lines.len() == 2 { file_index } else { None };
    ParsedTitle {
        filename,
        file_index,
    }
}

/// Derive the entry recorded for `candidate` in an availability result.
#[must_use]
pub fn stream_entry(candidate: &StreamCandidate) -> StreamEntry {
    let parsed = parse_stream_title(&candidate.title, candidate.file_index);
    let index = parsed
        .file_index
        .map_or_else(|| "null".to_string(), |index| index.to_string());
    let resolve_path = format!(
        "{}/{}/{index}",
        candidate.info_hash,
        urlencoding::encode(&parsed.filename)
    );
    StreamEntry {
        filename: parsed.filename,
        file_index: parsed.file_index,
        resolve_path,
    }
}

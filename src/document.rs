//! Text document with RCU (Read-Copy-Update) for lock-free reads
//!
//! Readers take immutable snapshots; writers buffer edits that are applied
//! in one swap on flush.

use arc_swap::ArcSwap;
use crossbeam::queue::SegQueue;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::coordinates::DocPos;

/// Auto-flush pending edits after this many operations
const FLUSH_THRESHOLD: usize = 16;

/// Edit operations on byte offsets
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert { pos: usize, text: String },
    Delete { range: Range<usize> },
    Replace { range: Range<usize>, text: String },
}

#[derive(Debug)]
pub enum DocumentError {
    /// Source bytes were not valid UTF-8
    InvalidUtf8,
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::InvalidUtf8 => write!(f, "Document is not valid UTF-8"),
        }
    }
}

impl std::error::Error for DocumentError {}

/// The document - readers get immutable snapshots, writers buffer edits
pub struct Document {
    snapshot: ArcSwap<Snapshot>,
    pending: SegQueue<Edit>,
    pending_count: AtomicUsize,
    version: AtomicU64,
    language: String,
}

/// Immutable document text with a line index
#[derive(Debug, Clone)]
pub struct Snapshot {
    text: Arc<str>,
    /// Byte offset of the first byte of every line
    line_starts: Vec<usize>,
    pub version: u64,
}

impl Document {
    pub fn new(language: impl Into<String>) -> Self {
        Self::from_str("", language)
    }

    pub fn from_str(text: &str, language: impl Into<String>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::from_str(text, 0)),
            pending: SegQueue::new(),
            pending_count: AtomicUsize::new(0),
            version: AtomicU64::new(0),
            language: language.into(),
        }
    }

    /// Create a document from raw file contents
    pub fn from_bytes(bytes: &[u8], language: impl Into<String>) -> Result<Self, DocumentError> {
        let text = simdutf8::basic::from_utf8(bytes).map_err(|_| DocumentError::InvalidUtf8)?;
        Ok(Self::from_str(text, language))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get current immutable snapshot (lock-free!)
    pub fn read(&self) -> Arc<Snapshot> {
        self.snapshot.load_full()
    }

    /// Buffer an edit
    pub fn edit(&self, edit: Edit) {
        self.pending.push(edit);
        let count = self.pending_count.fetch_add(1, Ordering::Relaxed) + 1;

        if count >= FLUSH_THRESHOLD {
            self.flush();
        }
    }

    /// Apply all pending edits
    pub fn flush(&self) {
        let mut edits = Vec::new();
        while let Some(edit) = self.pending.pop() {
            edits.push(edit);
        }

        if edits.is_empty() {
            return;
        }

        self.pending_count.store(0, Ordering::Relaxed);

        let current = self.snapshot.load();
        let mut text = current.text.to_string();
        for edit in &edits {
            apply_edit(&mut text, edit);
        }

        let new_version = self.version.fetch_add(1, Ordering::Relaxed) + 1;
        self.snapshot
            .store(Arc::new(Snapshot::from_str(&text, new_version)));
    }

    /// Get current version
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }
}

/// Apply one edit in place, clamping offsets that fall outside the text or
/// inside a UTF-8 sequence
fn apply_edit(text: &mut String, edit: &Edit) {
    match edit {
        Edit::Insert { pos, text: inserted } => {
            let clamped = clamp_to_boundary(text, *pos);
            if clamped != *pos {
                tracing::warn!(
                    "Clamped insert position {} to {} (document is {} bytes)",
                    pos,
                    clamped,
                    text.len()
                );
            }
            text.insert_str(clamped, inserted);
        }
        Edit::Delete { range } => {
            let range = clamp_range(text, range);
            text.replace_range(range, "");
        }
        Edit::Replace { range, text: inserted } => {
            let range = clamp_range(text, range);
            text.replace_range(range, inserted);
        }
    }
}

fn clamp_to_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn clamp_range(text: &str, range: &Range<usize>) -> Range<usize> {
    let start = clamp_to_boundary(text, range.start);
    let end = clamp_to_boundary(text, range.end).max(start);
    if start != range.start || end != range.end {
        tracing::warn!(
            "Clamped edit range {:?} to {:?} (document is {} bytes)",
            range,
            start..end,
            text.len()
        );
    }
    start..end
}

impl Snapshot {
    pub fn from_str(text: &str, version: u64) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = Vec::with_capacity(bytecount::count(bytes, b'\n') + 1);
        line_starts.push(0);
        line_starts.extend(memchr::memchr_iter(b'\n', bytes).map(|i| i + 1));

        Self {
            text: Arc::from(text),
            line_starts,
            version,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn byte_count(&self) -> usize {
        self.text.len()
    }

    /// Number of lines; an empty document still has one (empty) line
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Text of a 1-based line, without its line terminator
    pub fn line(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = match self.line_starts.get(index + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let line_text = &self.text[start..end];
        Some(line_text.strip_suffix('\r').unwrap_or(line_text))
    }

    /// Last valid 1-based column of a line
    pub fn line_max_column(&self, line: u32) -> Option<u32> {
        self.line(line).map(|text| text.chars().count() as u32 + 1)
    }

    /// Byte offset of a 1-based position, if it exists in the document
    pub fn offset_at(&self, pos: DocPos) -> Option<usize> {
        let index = (pos.line as usize).checked_sub(1)?;
        let line_start = *self.line_starts.get(index)?;
        let line_text = self.line(pos.line)?;
        let chars = (pos.column as usize).checked_sub(1)?;
        if chars == 0 {
            return Some(line_start);
        }
        match line_text.char_indices().nth(chars) {
            Some((byte, _)) => Some(line_start + byte),
            None if chars == line_text.chars().count() => Some(line_start + line_text.len()),
            None => None,
        }
    }
}

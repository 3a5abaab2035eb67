//! Page map model, full-text concatenation and page lookup.
//!
//! Offsets are counted in characters (Unicode scalar values), not bytes, so a
//! page map produced from any UTF-8 source addresses the same positions the
//! scanner walks over.

use serde::{Deserialize, Serialize};

use prepdocs_core::{Error, Result};

/// One extracted page: its index in the source document, the character
/// offset where it starts in the concatenated text, and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub page_index: usize,
    pub start_offset: usize,
    pub text: String,
}

/// Ordered, contiguous list of pages. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMap {
    entries: Vec<PageEntry>,
}

impl PageMap {
    /// Wrap entries produced by an extractor, rejecting inconsistent offsets.
    ///
    /// Entries must be ordered by page index, the first must start at offset 0
    /// and each following entry must start exactly where the previous one's
    /// text ends. Pages with empty text are accepted.
    pub fn new(entries: Vec<PageEntry>) -> Result<Self> {
        let mut expected_offset = 0usize;
        let mut previous_page: Option<usize> = None;

        for (position, entry) in entries.iter().enumerate() {
            if let Some(prev) = previous_page {
                if entry.page_index <= prev {
                    return Err(Error::InvalidInput(format!(
                        "page map entry {} has page index {} after page {}",
                        position, entry.page_index, prev
                    )));
                }
            }
            if entry.start_offset != expected_offset {
                return Err(Error::InvalidInput(format!(
                    "page {} starts at offset {}, expected {}",
                    entry.page_index, entry.start_offset, expected_offset
                )));
            }
            expected_offset += entry.text.chars().count();
            previous_page = Some(entry.page_index);
        }

        Ok(Self { entries })
    }

    /// Build a page map from `(page_index, text)` pairs, accumulating offsets.
    pub fn from_pages<I, S>(pages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let mut offset = 0;
        let mut entries = Vec::new();
        for (page_index, text) in pages {
            let text = text.into();
            let len = text.chars().count();
            entries.push(PageEntry {
                page_index,
                start_offset: offset,
                text,
            });
            offset += len;
        }
        Self::new(entries)
    }

    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.text.is_empty())
    }

    /// Total length of the concatenated text, in characters.
    pub fn char_len(&self) -> usize {
        self.entries
            .last()
            .map(|e| e.start_offset + e.text.chars().count())
            .unwrap_or(0)
    }

    /// Join all page texts into one buffer.
    pub fn full_text(&self) -> FullText {
        let capacity = self.entries.iter().map(|e| e.text.len()).sum();
        let mut text = String::with_capacity(capacity);
        for entry in &self.entries {
            text.push_str(&entry.text);
        }
        FullText::new(text)
    }

    /// Page index of the page containing character `offset`.
    ///
    /// Returns the last page whose start offset is `<= offset`; offsets at or
    /// past the final page's start (including the end of the text) map to the
    /// final page. Empty pages sharing a start offset with the next page are
    /// skipped over.
    pub fn find_page(&self, offset: usize) -> usize {
        let count = self.entries.partition_point(|e| e.start_offset <= offset);
        self.entries
            .get(count.saturating_sub(1))
            .map(|e| e.page_index)
            .unwrap_or(0)
    }
}

/// The concatenated document text, addressable by character offset.
#[derive(Debug, Clone)]
pub struct FullText {
    text: String,
    /// Byte offset of every character, plus one trailing entry for `text.len()`.
    byte_offsets: Vec<usize>,
}

impl FullText {
    pub fn new(text: String) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        byte_offsets.push(text.len());
        Self { text, byte_offsets }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The character at `offset`; `offset` must be less than `len()`.
    pub fn char_at(&self, offset: usize) -> char {
        self.text[self.byte_offsets[offset]..]
            .chars()
            .next()
            .unwrap_or_default()
    }

    /// Characters `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.text[self.byte_offsets[start]..self.byte_offsets[end]]
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

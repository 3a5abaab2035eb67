//! Boundary scanner: splits a page map into overlapping sections.
//!
//! Each window is cut close to `max_section_length`, preferring a sentence
//! ending within `sentence_search_limit` characters past the nominal cut, then
//! a word break, then a hard cut. The window start is walked back to the
//! previous sentence ending (or word break) so sections begin on a boundary.
//! Consecutive windows overlap by `section_overlap` characters unless an
//! embedded `<table` is left open at the end of a window, in which case the
//! next window restarts at that table.

use tracing::{debug, trace};

use crate::page_map::{FullText, PageMap};
use prepdocs_core::{Result, SplitConfig};

/// Preferred cut points.
pub const SENTENCE_ENDINGS: [char; 3] = ['.', '!', '?'];

/// Fallback cut points when no sentence ending is in range.
pub const WORD_BREAKS: [char; 12] = [
    ',', ';', ':', ' ', '(', ')', '[', ']', '{', '}', '\t', '\n',
];

const TABLE_OPEN: &str = "<table";
const TABLE_CLOSE: &str = "</table";

fn is_sentence_ending(c: char) -> bool {
    SENTENCE_ENDINGS.contains(&c)
}

fn is_word_break(c: char) -> bool {
    WORD_BREAKS.contains(&c)
}

/// One emitted window of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Page index of the page containing `start`.
    pub page: usize,
    /// Character offset of the first character, inclusive.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Remainder,
    Done,
}

/// Lazy iterator over the chunks of one document.
///
/// Dropping it early is the only cancellation needed; it holds no resources
/// beyond the concatenated text.
pub struct Splitter<'a> {
    pages: &'a PageMap,
    text: FullText,
    config: SplitConfig,
    start: usize,
    end: usize,
    emitted: usize,
    state: ScanState,
}

impl<'a> Splitter<'a> {
    /// Create a splitter over `pages`. Fails if the thresholds could not make progress.
    pub fn new(pages: &'a PageMap, config: SplitConfig) -> Result<Self> {
        config.validate()?;
        let text = pages.full_text();
        let end = text.len();
        Ok(Self {
            pages,
            text,
            config,
            start: 0,
            end,
            emitted: 0,
            state: ScanState::Scanning,
        })
    }

    /// Pick the end of the window that starts at `cursor`.
    fn select_end(&self, cursor: usize) -> usize {
        let SplitConfig {
            max_section_length: max,
            sentence_search_limit: limit,
            ..
        } = self.config;
        let length = self.text.len();

        let mut end = cursor + max;
        if end > length {
            end = length;
        } else {
            let mut last_word: Option<usize> = None;
            while end < length
                && end - cursor - max < limit
                && !is_sentence_ending(self.text.char_at(end))
            {
                if is_word_break(self.text.char_at(end)) {
                    last_word = Some(end);
                }
                end += 1;
            }
            if end < length && !is_sentence_ending(self.text.char_at(end)) {
                if let Some(word) = last_word.filter(|&w| w > 0) {
                    end = word;
                }
            }
        }

        // Keep the boundary character in this window.
        if end < length {
            end += 1;
        }
        end
    }

    /// Walk `cursor` back to the nearest sentence ending (or word break) before `end`.
    fn select_start(&self, cursor: usize, end: usize) -> usize {
        let SplitConfig {
            max_section_length: max,
            sentence_search_limit: limit,
            ..
        } = self.config;

        let mut start = cursor;
        let mut last_word: Option<usize> = None;
        while start > 0
            && start + max + 2 * limit > end
            && !is_sentence_ending(self.text.char_at(start))
        {
            if is_word_break(self.text.char_at(start)) {
                last_word = Some(start);
            }
            start -= 1;
        }
        if !is_sentence_ending(self.text.char_at(start)) {
            if let Some(word) = last_word.filter(|&w| w > 0) {
                start = word;
            }
        }
        if start > 0 {
            start += 1;
        }
        start
    }

    /// Run one scanner iteration from the current cursor.
    fn scan(&mut self) -> Chunk {
        let cursor = self.start;
        let end = self.select_end(cursor);
        let start = self.select_start(cursor, end);
        let chunk = self.chunk(start, end);

        let overlap_start = end - self.config.section_overlap;
        self.start = match unclosed_table_start(&chunk.text, self.config.sentence_search_limit) {
            Some(table_start) => {
                let table_cursor = overlap_start.min(start + table_start);
                if table_cursor > cursor {
                    debug!(
                        "Section ends with unclosed table, starting next section with the table at page {} offset {} table start {}",
                        chunk.page, start, table_start
                    );
                    table_cursor
                } else {
                    // Restarting at the table would not move the cursor forward.
                    overlap_start
                }
            }
            None => overlap_start,
        };
        self.end = end;
        chunk
    }

    fn chunk(&mut self, start: usize, end: usize) -> Chunk {
        self.emitted += 1;
        trace!("Section {} spans [{}, {})", self.emitted, start, end);
        Chunk {
            text: self.text.slice(start, end).to_string(),
            page: self.pages.find_page(start),
            start,
            end,
        }
    }
}

impl Iterator for Splitter<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        loop {
            match self.state {
                ScanState::Scanning => {
                    if self.start + self.config.section_overlap < self.text.len() {
                        return Some(self.scan());
                    }
                    self.state = ScanState::Remainder;
                }
                ScanState::Remainder => {
                    self.state = ScanState::Done;
                    let has_remainder = self.start + self.config.section_overlap < self.end;
                    // A non-empty document no longer than the overlap still yields itself.
                    let too_short = self.emitted == 0 && !self.text.is_empty();
                    if has_remainder || too_short {
                        return Some(self.chunk(self.start, self.end));
                    }
                }
                ScanState::Done => return None,
            }
        }
    }
}

/// Character index of a `<table` left open at the end of `section`.
///
/// Only the last opening tag is considered, and only when it lies more than
/// `2 * sentence_search_limit` characters into the section and after the last
/// `</table` closing tag.
pub fn unclosed_table_start(section: &str, sentence_search_limit: usize) -> Option<usize> {
    let open = section.rfind(TABLE_OPEN)?;
    if section.rfind(TABLE_CLOSE).is_some_and(|close| close > open) {
        return None;
    }
    let open_chars = section[..open].chars().count();
    (open_chars > 2 * sentence_search_limit).then_some(open_chars)
}

/// Split a page map into chunks.
pub fn split_text(pages: &PageMap, config: SplitConfig) -> Result<Splitter<'_>> {
    Splitter::new(pages, config)
}

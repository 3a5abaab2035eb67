//! Page map extraction from source files.
//!
//! Layout analysis, OCR and transcription run outside this crate; their output
//! arrives here as page maps. Locally we only read text files, treating form
//! feeds (as written by `pdftotext` and similar tools) as page breaks.

use std::path::Path;

use tracing::debug;

use crate::page_map::PageMap;
use prepdocs_core::{Error, Result};

const PAGE_BREAK: char = '\x0c';

/// Produces a page map for one source file.
pub trait DocumentExtractor {
    fn extract(&self, path: &Path) -> Result<PageMap>;
}

/// Supported file types for page map extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Pdf,
    Media,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Self::PlainText,
            "md" | "mdx" => Self::Markdown,
            "pdf" => Self::Pdf,
            "wav" | "mp3" | "mp4" | "m4a" => Self::Media,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::PlainText | Self::Markdown)
    }
}

/// Reads UTF-8 text files.
///
/// A file without form feeds is one page with index 1. A file with form feeds
/// is split into pages numbered from 0, the form feeds themselves dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn page_map_from_str(text: &str) -> Result<PageMap> {
        if !text.contains(PAGE_BREAK) {
            return PageMap::from_pages([(1, text)]);
        }
        PageMap::from_pages(text.split(PAGE_BREAK).enumerate())
    }
}

impl DocumentExtractor for TextExtractor {
    fn extract(&self, path: &Path) -> Result<PageMap> {
        let text = std::fs::read_to_string(path)?;
        let pages = Self::page_map_from_str(&text)?;
        debug!(
            "Extracted {} page(s), {} chars from {}",
            pages.entries().len(),
            pages.char_len(),
            path.display()
        );
        Ok(pages)
    }
}

/// Chooses an extractor by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtractor;

impl DocumentExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> Result<PageMap> {
        match FileType::from_path(path) {
            t if t.is_text() => TextExtractor.extract(path),
            FileType::Pdf => Err(Error::Extract(format!(
                "{}: PDF layout extraction is not available locally; convert to text first",
                path.display()
            ))),
            FileType::Media => Err(Error::Extract(format!(
                "{}: audio/video must be transcribed before indexing",
                path.display()
            ))),
            _ => Err(Error::Extract(format!(
                "{}: unsupported file type",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("TXT"), FileType::PlainText);
        assert_eq!(FileType::from_extension("md"), FileType::Markdown);
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension("mp4"), FileType::Media);
        assert_eq!(FileType::from_extension("xyz"), FileType::Unknown);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Unknown);
    }

    #[test]
    fn test_single_page_text() {
        let pages = TextExtractor::page_map_from_str("just one page").unwrap();
        assert_eq!(pages.entries().len(), 1);
        assert_eq!(pages.entries()[0].page_index, 1);
        assert_eq!(pages.entries()[0].start_offset, 0);
    }

    #[test]
    fn test_form_feed_pages() {
        let pages = TextExtractor::page_map_from_str("one\x0ctwo two\x0cthree").unwrap();
        let entries = pages.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].page_index, 0);
        assert_eq!(entries[1].text, "two two");
        assert_eq!(entries[1].start_offset, 3);
        assert_eq!(entries[2].start_offset, 10);
        assert_eq!(pages.full_text().as_str(), "onetwo twothree");
    }

    #[test]
    fn test_file_extractor_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Hello there.").unwrap();

        let pages = FileExtractor.extract(&path).unwrap();
        assert_eq!(pages.full_text().as_str(), "Hello there.");
    }

    #[test]
    fn test_file_extractor_rejects_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        assert!(matches!(
            FileExtractor.extract(&path),
            Err(Error::Extract(_))
        ));
    }
}

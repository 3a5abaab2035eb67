//! Section assembly: turns scanner chunks into index records.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::page_map::PageMap;
use crate::splitter::{split_text, Splitter};
use prepdocs_core::{Result, SplitConfig};

static INVALID_ID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-zA-Z_-]").expect("valid regex"));

/// One indexable record. Field names match the search index schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub content: String,
    pub category: Option<String>,
    /// Page-qualified name of the blob holding the section's first page.
    #[serde(rename = "sourcepage")]
    pub source_page: String,
    #[serde(rename = "sourcefile")]
    pub source_file: String,
}

impl Section {
    pub fn new(
        document_name: &str,
        chunk_index: usize,
        content: String,
        page: usize,
        category: Option<&str>,
    ) -> Self {
        Self {
            id: sanitize_id(&format!("{}-{}", document_name, chunk_index)),
            content,
            category: category.map(str::to_string),
            source_page: blob_name_from_file_page(document_name, page),
            source_file: document_name.to_string(),
        }
    }
}

/// Replace every character outside `[0-9a-zA-Z_-]` with `_`.
pub fn sanitize_id(raw: &str) -> String {
    INVALID_ID_CHARS.replace_all(raw, "_").into_owned()
}

/// Blob name for one page of a source file.
///
/// PDFs are stored one blob per page as `{stem}-{page}.pdf`; every other file
/// type is stored whole under its base name.
pub fn blob_name_from_file_page(file_name: &str, page: usize) -> String {
    let path = Path::new(file_name);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return base.to_string();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(base);
    format!("{}-{}.pdf", stem, page)
}

/// Lazy sequence of sections for one document.
pub struct Sections<'a> {
    chunks: std::iter::Enumerate<Splitter<'a>>,
    document_name: String,
    category: Option<String>,
}

impl Iterator for Sections<'_> {
    type Item = Section;

    fn next(&mut self) -> Option<Section> {
        let (index, chunk) = self.chunks.next()?;
        Some(Section::new(
            &self.document_name,
            index,
            chunk.text,
            chunk.page,
            self.category.as_deref(),
        ))
    }
}

/// Split `pages` and wrap each chunk as a section of `document_name`.
pub fn create_sections<'a>(
    document_name: &str,
    pages: &'a PageMap,
    config: SplitConfig,
    category: Option<&str>,
) -> Result<Sections<'a>> {
    Ok(Sections {
        chunks: split_text(pages, config)?.enumerate(),
        document_name: document_name.to_string(),
        category: category.map(str::to_string),
    })
}

//! Document ingestion pipeline: file → page map → sections → sink.

use std::path::Path;

use tracing::{debug, info};

use crate::extract::{DocumentExtractor, FileExtractor};
use crate::page_map::PageMap;
use crate::section::create_sections;
use crate::sink::{index_sections, SectionSink};
use prepdocs_core::{Error, IngestConfig, Result};

/// Handles document ingestion: extraction, splitting, and delivery to a sink.
pub struct Ingester<'a, S: SectionSink + ?Sized> {
    sink: &'a mut S,
    extractor: Box<dyn DocumentExtractor>,
    config: IngestConfig,
}

impl<'a, S: SectionSink + ?Sized> Ingester<'a, S> {
    /// Create an ingester using the extension-based [`FileExtractor`].
    pub fn new(sink: &'a mut S, config: IngestConfig) -> Result<Self> {
        Self::with_extractor(sink, FileExtractor, config)
    }

    pub fn with_extractor(
        sink: &'a mut S,
        extractor: impl DocumentExtractor + 'static,
        config: IngestConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sink,
            extractor: Box::new(extractor),
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest a file: extract pages, split, and index.
    /// Returns the number of sections indexed.
    pub fn ingest_file(&mut self, path: &Path) -> Result<usize> {
        let document_name = document_name(path)?;
        let pages = self.extractor.extract(path)?;
        self.ingest_pages(&document_name, &pages)
    }

    /// Split an already extracted page map and index its sections under `document_name`.
    pub fn ingest_pages(&mut self, document_name: &str, pages: &PageMap) -> Result<usize> {
        if pages.is_empty() {
            debug!("No text extracted from {}", document_name);
            return Ok(0);
        }

        debug!("Splitting '{}' into sections", document_name);
        let sections = create_sections(
            document_name,
            pages,
            self.config.split,
            self.config.category.as_deref(),
        )?;
        let indexed = index_sections(sections, &mut *self.sink, self.config.batch_size)?;

        info!(
            "Indexed {} sections from '{}' ({} pages)",
            indexed,
            document_name,
            pages.entries().len()
        );
        Ok(indexed)
    }

    /// Remove every section previously indexed from `path`.
    pub fn remove_file(&mut self, path: &Path) -> Result<usize> {
        let document_name = document_name(path)?;
        let removed = self.sink.remove(Some(&document_name))?;
        info!("Removed {} sections from '{}'", removed, document_name);
        Ok(removed)
    }

    /// Remove every section from the sink.
    pub fn remove_all(&mut self) -> Result<usize> {
        let removed = self.sink.remove(None)?;
        info!("Removed {} sections from <all>", removed);
        Ok(removed)
    }
}

/// Base name of `path`, used as the section source file.
pub fn document_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidInput(format!("no file name in {}", path.display())))
}

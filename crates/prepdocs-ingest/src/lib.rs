//! Prepdocs Ingest — page maps, section splitting, and delivery to section sinks.

pub mod extract;
pub mod ingest;
pub mod page_map;
pub mod section;
pub mod sink;
pub mod splitter;
pub mod table;

pub use extract::{DocumentExtractor, FileExtractor, FileType, TextExtractor};
pub use ingest::{document_name, Ingester};
pub use page_map::{FullText, PageEntry, PageMap};
pub use section::{blob_name_from_file_page, create_sections, sanitize_id, Section, Sections};
pub use sink::{index_sections, JsonDirSink, MemorySink, SectionSink};
pub use splitter::{split_text, unclosed_table_start, Chunk, Splitter};
pub use table::{CellKind, Table, TableCell};

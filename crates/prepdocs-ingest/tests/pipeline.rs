//! End-to-end ingestion tests: extractor → splitter → sections → sink.

use std::path::Path;

use prepdocs_core::{IngestConfig, Result, SplitConfig};
use prepdocs_ingest::{
    CellKind, DocumentExtractor, Ingester, JsonDirSink, MemorySink, PageMap, Table, TableCell,
};

/// Stands in for a layout-analysis service: returns fixed pages with a table rendered inline.
struct LayoutStub {
    table: Table,
}

impl LayoutStub {
    fn new() -> Self {
        let header = |col, text| TableCell::new(0, col, text).with_kind(CellKind::ColumnHeader);
        Self {
            table: Table {
                row_count: 3,
                cells: vec![
                    header(0, "Metric"),
                    header(1, "Value"),
                    TableCell::new(1, 0, "Revenue"),
                    TableCell::new(1, 1, "42"),
                    TableCell::new(2, 0, "Margin"),
                    TableCell::new(2, 1, "17%"),
                ],
            },
        }
    }
}

impl DocumentExtractor for LayoutStub {
    fn extract(&self, _path: &Path) -> Result<PageMap> {
        let first = format!(
            "Quarterly results are summarized in the table that follows this introduction. {} Revenue grew strongly. ",
            self.table.to_html()
        );
        PageMap::from_pages(vec![
            (0, first),
            (
                1,
                "Outlook remains positive for the next year. Hiring continues.".to_string(),
            ),
        ])
    }
}

#[test]
fn test_text_file_into_index_dir() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("user guide.txt");
    let page = "Install the package first. Then configure the service, restart it, and check the logs. ";
    let text = [page.repeat(4), page.repeat(3), page.repeat(5)].join("\x0c");
    std::fs::write(&source, text).unwrap();

    let mut sink = JsonDirSink::open(dir.path().join("index")).unwrap();
    let config = IngestConfig {
        split: SplitConfig::new(200, 20, 20).unwrap(),
        category: Some("guides".to_string()),
        batch_size: 3,
    };

    let count = {
        let mut ingester = Ingester::new(&mut sink, config.clone()).unwrap();
        let count = ingester.ingest_file(&source).unwrap();
        // Indexing the same file again replaces its sections.
        assert_eq!(ingester.ingest_file(&source).unwrap(), count);
        count
    };
    assert!(count > 3);

    let stored = sink.read("user guide.txt").unwrap();
    assert_eq!(stored.len(), count);
    for (i, section) in stored.iter().enumerate() {
        assert_eq!(section.id, format!("user_guide_txt-{}", i));
        assert_eq!(section.source_file, "user guide.txt");
        assert_eq!(section.source_page, "user guide.txt");
        assert_eq!(section.category.as_deref(), Some("guides"));
        assert!(section.content.chars().count() <= 200 + 2 * 20);
    }

    let removed = {
        let mut ingester = Ingester::new(&mut sink, config).unwrap();
        ingester.remove_file(&source).unwrap()
    };
    assert_eq!(removed, count);
    assert!(sink.read("user guide.txt").unwrap().is_empty());
}

#[test]
fn test_table_kept_whole_in_one_section() {
    let stub = LayoutStub::new();
    let table_html = stub.table.to_html();
    let mut sink = MemorySink::new();
    let config = IngestConfig {
        split: SplitConfig::new(120, 10, 10).unwrap(),
        ..Default::default()
    };

    {
        let mut ingester = Ingester::with_extractor(&mut sink, stub, config).unwrap();
        ingester.ingest_file(Path::new("reports/q3 report.pdf")).unwrap();
    }

    let sections = sink.sections();
    assert_eq!(sections.len(), 3);
    assert!(!sections[0].content.contains(&table_html));
    assert!(sections[1].content.starts_with(" <table>"));
    assert!(sections[1].content.contains(&table_html));
    assert!(sections
        .iter()
        .all(|s| s.source_page == "q3 report-0.pdf" && s.source_file == "q3 report.pdf"));
    assert_eq!(sections[2].id, "q3_report_pdf-2");
    assert!(sections[2].content.ends_with("Hiring continues."));
}

#[test]
fn test_remove_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonDirSink::open(dir.path()).unwrap();
    for name in ["a.txt", "b.md"] {
        let path = dir.path().join(name);
        std::fs::write(&path, "Short document. ".repeat(100)).unwrap();
        let mut ingester = Ingester::new(&mut sink, IngestConfig::default()).unwrap();
        ingester.ingest_file(&path).unwrap();
    }

    let mut ingester = Ingester::new(&mut sink, IngestConfig::default()).unwrap();
    let removed = ingester.remove_all().unwrap();
    assert!(removed >= 4);
    drop(ingester);
    assert!(sink.read("a.txt").unwrap().is_empty());
    assert!(sink.read("b.md").unwrap().is_empty());
}

#[test]
fn test_unsupported_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talk.mp4");
    std::fs::write(&path, b"\x00\x00").unwrap();

    let mut sink = MemorySink::new();
    let mut ingester = Ingester::new(&mut sink, IngestConfig::default()).unwrap();
    assert!(ingester.ingest_file(&path).is_err());
}

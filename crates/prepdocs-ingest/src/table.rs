//! Inline HTML rendering of extracted tables.
//!
//! Layout extractors replace a table's character span on the page with this
//! markup, which is why the splitter watches for `<table` / `</table`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    Content,
    ColumnHeader,
    RowHeader,
    StubHead,
    Description,
}

impl CellKind {
    fn is_header(self) -> bool {
        matches!(self, Self::ColumnHeader | Self::RowHeader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub row_index: usize,
    pub column_index: usize,
    pub row_span: usize,
    pub column_span: usize,
    pub kind: CellKind,
    pub content: String,
}

impl TableCell {
    /// A plain single-span content cell.
    pub fn new(row_index: usize, column_index: usize, content: impl Into<String>) -> Self {
        Self {
            row_index,
            column_index,
            row_span: 1,
            column_span: 1,
            kind: CellKind::Content,
            content: content.into(),
        }
    }

    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_spans(mut self, row_span: usize, column_span: usize) -> Self {
        self.row_span = row_span;
        self.column_span = column_span;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub row_count: usize,
    pub cells: Vec<TableCell>,
}

impl Table {
    /// Render as a single-line `<table>` fragment, rows in order, cells by column.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table>");
        for row in 0..self.row_count {
            let mut cells: Vec<&TableCell> =
                self.cells.iter().filter(|c| c.row_index == row).collect();
            cells.sort_by_key(|c| c.column_index);

            html.push_str("<tr>");
            for cell in cells {
                let tag = if cell.kind.is_header() { "th" } else { "td" };
                let mut spans = String::new();
                if cell.column_span > 1 {
                    spans.push_str(&format!(" colSpan={}", cell.column_span));
                }
                if cell.row_span > 1 {
                    spans.push_str(&format!(" rowSpan={}", cell.row_span));
                }
                html.push_str(&format!(
                    "<{tag}{spans}>{}</{tag}>",
                    escape_html(&cell.content)
                ));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! # Document Description
//!
//! The output of the engine: a renderer-agnostic tree of content blocks,
//! tables, cells and styled text runs, plus page geometry, the page header
//! configuration, document information and security settings.
//!
//! The tree is plain data. It is `Serialize` so it can be handed to an
//! external renderer, `PartialEq` so two builds can be compared, and nothing
//! in it is shared or mutated after the builder returns it. The one piece of
//! per-page behavior, the header band, is kept as data
//! ([`PageHeader`](crate::builder::PageHeader)) and rendered on demand through
//! [`DocumentDescription::page_header`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::builder::PageHeader;
use crate::layout::TableLayout;
use crate::model::Permissions;
use crate::style::{Edges, Style, StyleName, TextAlign};

/// A complete, fully resolved document ready for a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescription {
    pub page_size: PageSize,
    pub page_orientation: PageOrientation,
    /// Page margins in points. The top margin leaves room for the header band.
    pub page_margins: Edges,
    /// Header band data. `None` suppresses the page header entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<PageHeader>,
    /// One block per section, in section order.
    pub content: Vec<Content>,
    pub styles: BTreeMap<StyleName, Style>,
    pub default_style: Style,
    pub info: DocumentInfo,
    /// Whether to produce a tagged (accessible) document.
    pub tagged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    /// Title for previews and the downloaded file name.
    pub display_title: String,
}

impl DocumentDescription {
    /// The header band for one page, or `None` when the document has no
    /// header. Pure: the same arguments always give the same content.
    pub fn page_header(&self, current_page: u32, page_count: u32) -> Option<Content> {
        self.header
            .as_ref()
            .map(|header| header.render(current_page, page_count))
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    #[default]
    Letter,
    Legal,
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Document information dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub creator: String,
    pub producer: String,
    /// RFC 3339 build time.
    pub creation_date: String,
    pub modification_date: String,
}

/// Encryption and permission settings. Absent means an unrestricted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

/// A block of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    Text(TextBlock),
    Stack(Stack),
    Table(Table),
    Image(ImageBlock),
}

impl Content {
    /// A plain, unstyled text block.
    pub fn text(text: &str) -> Self {
        Content::Text(TextBlock::plain(text))
    }

    /// The empty block, produced by sections with nothing to show.
    pub fn empty() -> Self {
        Content::Stack(Stack::default())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Content::Stack(stack) if stack.items.is_empty())
    }

    pub fn margin(&self) -> Option<Edges> {
        match self {
            Content::Text(t) => t.style.margin,
            Content::Stack(s) => s.style.margin,
            Content::Table(t) => t.margin,
            Content::Image(_) => None,
        }
    }

    /// A copy with the bottom margin replaced. Blocks without a margin are
    /// returned unchanged.
    pub fn with_bottom_margin(self, bottom: f64) -> Self {
        match self {
            Content::Text(mut t) => {
                t.style.margin = t.style.margin.map(|m| m.with_bottom(bottom));
                Content::Text(t)
            }
            Content::Stack(mut s) => {
                s.style.margin = s.style.margin.map(|m| m.with_bottom(bottom));
                Content::Stack(s)
            }
            Content::Table(mut t) => {
                t.margin = t.margin.map(|m| m.with_bottom(bottom));
                Content::Table(t)
            }
            image => image,
        }
    }

    /// All text of this block in reading order, runs concatenated.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Content::Text(t) => {
                for run in &t.runs {
                    out.push_str(&run.content);
                }
            }
            Content::Stack(s) => {
                for item in &s.items {
                    item.collect_text(out);
                }
            }
            Content::Table(t) => {
                for row in &t.body {
                    for cell in row {
                        if let Cell::Filled(cell) = cell {
                            cell.content.collect_text(out);
                        }
                    }
                }
            }
            Content::Image(_) => {}
        }
    }
}

/// Inline text: a sequence of styled runs laid out as one paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub runs: Vec<TextRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<StyleName>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

impl TextBlock {
    pub fn plain(text: &str) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
            ..Default::default()
        }
    }

    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: StyleName) -> Self {
        self.style_name = Some(name);
        self
    }

    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

/// An inline styled run within a text block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub content: String,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    /// Link target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn styled(content: &str, style: Style) -> Self {
        Self {
            content: content.to_string(),
            style,
            href: None,
        }
    }
}

/// Blocks stacked vertically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub items: Vec<Content>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

/// An embedded image scaled to fit a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    /// A `data:image/...;base64,` URI.
    pub src: String,
    /// Box (width, height) in points the image is scaled into.
    pub fit: (f64, f64),
    #[serde(default)]
    pub alignment: TextAlign,
}

/// A table. Every body row has exactly `widths.len()` cells; a cell with
/// `col_span > 1` is followed by `col_span - 1` [`Cell::Spanned`] slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub widths: Vec<ColumnWidth>,
    /// Per-row height policy. Empty means every row sizes to its content.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heights: Vec<RowHeight>,
    pub body: Vec<Vec<Cell>>,
    /// Leading rows repeated at the top of every page the table spans.
    #[serde(default)]
    pub header_rows: u32,
    /// Rows after the header that must stay on the header's page.
    #[serde(default)]
    pub keep_with_header_rows: u32,
    pub layout: TableLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges>,
}

impl Table {
    pub fn new(widths: Vec<ColumnWidth>, layout: TableLayout) -> Self {
        Self {
            widths,
            heights: Vec::new(),
            body: Vec::new(),
            header_rows: 0,
            keep_with_header_rows: 0,
            layout,
            margin: None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    pub fn row_count(&self) -> usize {
        self.body.len()
    }

    /// The first cell of a row, if the row exists and it is filled.
    pub fn first_cell(&self, row: usize) -> Option<&CellBox> {
        match self.body.get(row)?.first()? {
            Cell::Filled(cell) => Some(cell),
            Cell::Spanned => None,
        }
    }
}

/// Column width policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnWidth {
    /// As wide as the widest content.
    Auto,
    /// Shares the remaining width with the other star columns.
    Star,
    /// Fixed width in points.
    Fixed(f64),
}

/// Row height policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowHeight {
    /// Sized to content.
    Auto,
    /// Absorbs leftover height.
    Flex,
}

/// A table slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell", rename_all = "camelCase")]
pub enum Cell {
    Filled(CellBox),
    /// Covered by a column span to its left.
    Spanned,
}

impl Cell {
    /// A single-column cell holding plain text in a named style.
    pub fn text(text: &str, style_name: StyleName) -> Self {
        Cell::Filled(CellBox::new(Content::text(text)).named(style_name))
    }

    pub fn as_filled(&self) -> Option<&CellBox> {
        match self {
            Cell::Filled(cell) => Some(cell),
            Cell::Spanned => None,
        }
    }
}

/// The content of one table cell and how it sits in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBox {
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<StyleName>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    pub col_span: u32,
    /// Holds a nested row group; the parent layout drops its padding for
    /// the row so the nested table sits flush with the borders.
    #[serde(default)]
    pub is_group: bool,
}

impl CellBox {
    pub fn new(content: Content) -> Self {
        Self {
            content,
            style_name: None,
            style: Style::default(),
            col_span: 1,
            is_group: false,
        }
    }

    pub fn named(mut self, name: StyleName) -> Self {
        self.style_name = Some(name);
        self
    }

    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn spanning(mut self, cols: u32) -> Self {
        self.col_span = cols.max(1);
        self
    }
}

/// A row made of one cell spanning `cols` columns plus its spanned slots.
pub fn spanning_row(cell: CellBox, cols: usize) -> Vec<Cell> {
    let cols = cols.max(1);
    let mut row = Vec::with_capacity(cols);
    row.push(Cell::Filled(cell.spanning(cols as u32)));
    row.extend(std::iter::repeat(Cell::Spanned).take(cols - 1));
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanning_row_pads_with_spanned_slots() {
        let row = spanning_row(CellBox::new(Content::text("x")), 3);
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].as_filled().map(|c| c.col_span), Some(3));
        assert_eq!(row[1], Cell::Spanned);
        assert_eq!(row[2], Cell::Spanned);
    }

    #[test]
    fn test_with_bottom_margin_returns_new_value() {
        let mut table = Table::new(vec![ColumnWidth::Star], TableLayout::Main);
        table.margin = Some(Edges::bottom(15.0));
        let original = Content::Table(table);
        let zeroed = original.clone().with_bottom_margin(0.0);
        assert_eq!(original.margin(), Some(Edges::bottom(15.0)));
        assert_eq!(zeroed.margin(), Some(Edges::ZERO));
    }

    #[test]
    fn test_plain_text_walks_tables() {
        let mut table = Table::new(vec![ColumnWidth::Auto, ColumnWidth::Star], TableLayout::Main);
        table.body.push(vec![
            Cell::text("Name", StyleName::Label),
            Cell::text("Ana", StyleName::Answer),
        ]);
        assert_eq!(Content::Table(table).plain_text(), "NameAna");
    }

    #[test]
    fn test_content_serializes_with_type_tag() {
        let json = serde_json::to_value(Content::text("hi")).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["runs"][0]["content"], "hi");
    }
}

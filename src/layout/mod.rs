//! # Table Layouts
//!
//! The downstream table engine asks a layout, line by line and cell by cell,
//! how wide each border is and how much padding each cell gets. Those answers
//! are what make the report look right: nested short-field groups must not
//! get double padding, and cell content must look vertically centered even
//! though the engine itself only top-aligns.
//!
//! Layouts are a closed set of named variants. The per-line and per-cell
//! answers are methods, so the rules are testable here and a renderer only
//! needs the variant name to reproduce them.

use serde::{Deserialize, Serialize};

use crate::description::{Cell, CellBox, ColumnWidth, Content, RowHeight, Table};
use crate::style::{palette, Color};

/// Horizontal cell padding. Group cells cancel it with a negative margin.
pub const CELL_HORIZONTAL_PADDING: f64 = 8.0;
/// Vertical cell padding.
pub const CELL_VERTICAL_PADDING: f64 = 8.0;
/// Padding inside the page header band.
pub const HEADER_BAND_PADDING: f64 = 4.0;
/// Border line width for report tables.
pub const LINE_WIDTH: f64 = 0.5;
/// Space below every section block except the last.
pub const SECTION_BOTTOM_MARGIN: f64 = 15.0;
/// A field is short only if its label and value together stay under this
/// many characters.
pub const SHORT_FIELD_THRESHOLD: usize = 45;
/// Most short fields sharing one row.
pub const MAX_SHORT_GROUP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableLayout {
    /// Thin gray grid, uniform padding.
    Main,
    /// Like `Main`, but rows that start with a group cell get no padding.
    GroupAware,
    /// Inner table of a short-field group: no horizontal lines, vertical
    /// lines only between its own columns.
    Nested,
    /// The vertical-centering shim: no lines, no padding.
    Shim,
    /// The page header band: grid lines with tighter padding.
    HeaderBand,
}

impl TableLayout {
    /// Width of horizontal line `i` (0 is above the first row).
    pub fn h_line_width(&self, _i: usize, _table: &Table) -> f64 {
        match self {
            TableLayout::Main | TableLayout::GroupAware | TableLayout::HeaderBand => LINE_WIDTH,
            TableLayout::Nested | TableLayout::Shim => 0.0,
        }
    }

    /// Width of vertical line `i` (0 is left of the first column).
    pub fn v_line_width(&self, i: usize, table: &Table) -> f64 {
        match self {
            TableLayout::Main | TableLayout::GroupAware | TableLayout::HeaderBand => LINE_WIDTH,
            TableLayout::Nested => {
                if i == 0 || i == table.column_count() {
                    0.0
                } else {
                    LINE_WIDTH
                }
            }
            TableLayout::Shim => 0.0,
        }
    }

    pub fn line_color(&self) -> Color {
        palette::BORDER
    }

    pub fn padding_left(&self, _col: usize, table: &Table, row: usize) -> f64 {
        self.horizontal_padding(table, row)
    }

    pub fn padding_right(&self, _col: usize, table: &Table, row: usize) -> f64 {
        self.horizontal_padding(table, row)
    }

    pub fn padding_top(&self, row: usize, table: &Table) -> f64 {
        self.vertical_padding(table, row)
    }

    pub fn padding_bottom(&self, row: usize, table: &Table) -> f64 {
        self.vertical_padding(table, row)
    }

    fn horizontal_padding(&self, table: &Table, row: usize) -> f64 {
        match self {
            TableLayout::Main | TableLayout::Nested => CELL_HORIZONTAL_PADDING,
            TableLayout::GroupAware if row_is_group(table, row) => 0.0,
            TableLayout::GroupAware => CELL_HORIZONTAL_PADDING,
            TableLayout::HeaderBand => HEADER_BAND_PADDING,
            TableLayout::Shim => 0.0,
        }
    }

    fn vertical_padding(&self, table: &Table, row: usize) -> f64 {
        match self {
            TableLayout::Main | TableLayout::Nested => CELL_VERTICAL_PADDING,
            TableLayout::GroupAware if row_is_group(table, row) => 0.0,
            TableLayout::GroupAware => CELL_VERTICAL_PADDING,
            TableLayout::HeaderBand => HEADER_BAND_PADDING,
            TableLayout::Shim => 0.0,
        }
    }
}

/// A row is a group row when its first cell is a group cell holding a table.
fn row_is_group(table: &Table, row: usize) -> bool {
    table
        .first_cell(row)
        .is_some_and(|cell| cell.is_group && matches!(cell.content, Content::Table(_)))
}

/// Wrap content in the vertical-centering shim: a borderless single-column
/// table of `spacer / content / spacer` where only the spacers stretch. The
/// caller puts any background fill on the outer cell, never on these rows,
/// so no seams show between them.
pub fn center_vertically(content: Content) -> Content {
    let mut shim = Table::new(vec![ColumnWidth::Star], TableLayout::Shim);
    shim.heights = vec![RowHeight::Flex, RowHeight::Auto, RowHeight::Flex];
    shim.body = vec![
        vec![Cell::Filled(CellBox::new(Content::text("")))],
        vec![Cell::Filled(CellBox::new(content))],
        vec![Cell::Filled(CellBox::new(Content::text("")))],
    ];
    Content::Table(shim)
}

/// The content held by a shim, or `None` if `content` is not one.
pub fn shim_content(content: &Content) -> Option<&Content> {
    match content {
        Content::Table(table) if table.layout == TableLayout::Shim => {
            table.body.get(1)?.first()?.as_filled().map(|cell| &cell.content)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Edges, StyleName};

    fn group_table() -> Table {
        let mut nested = Table::new(vec![ColumnWidth::Auto, ColumnWidth::Star], TableLayout::Nested);
        nested.body.push(vec![
            Cell::text("A", StyleName::Label),
            Cell::text("1", StyleName::Answer),
        ]);
        let mut group = CellBox::new(Content::Table(nested)).spanning(2);
        group.is_group = true;
        group.style.margin = Some(Edges::new(0.0, -CELL_HORIZONTAL_PADDING, 0.0, -CELL_HORIZONTAL_PADDING));

        let mut table = Table::new(vec![ColumnWidth::Auto, ColumnWidth::Star], TableLayout::GroupAware);
        table.body.push(vec![
            Cell::text("Name", StyleName::Label),
            Cell::text("Ana", StyleName::Answer),
        ]);
        table.body.push(vec![Cell::Filled(group), Cell::Spanned]);
        table
    }

    #[test]
    fn test_group_aware_drops_padding_for_group_rows_only() {
        let table = group_table();
        let layout = TableLayout::GroupAware;
        assert_eq!(layout.padding_left(0, &table, 0), CELL_HORIZONTAL_PADDING);
        assert_eq!(layout.padding_top(0, &table), CELL_VERTICAL_PADDING);
        assert_eq!(layout.padding_left(0, &table, 1), 0.0);
        assert_eq!(layout.padding_right(1, &table, 1), 0.0);
        assert_eq!(layout.padding_top(1, &table), 0.0);
        assert_eq!(layout.padding_bottom(1, &table), 0.0);
        // Out of range rows fall back to normal padding.
        assert_eq!(layout.padding_top(9, &table), CELL_VERTICAL_PADDING);
    }

    #[test]
    fn test_main_layout_ignores_group_flag() {
        let table = group_table();
        assert_eq!(TableLayout::Main.padding_top(1, &table), CELL_VERTICAL_PADDING);
    }

    #[test]
    fn test_nested_lines_only_between_columns() {
        let table = Table::new(vec![ColumnWidth::Auto; 4], TableLayout::Nested);
        let layout = TableLayout::Nested;
        assert_eq!(layout.v_line_width(0, &table), 0.0);
        assert_eq!(layout.v_line_width(2, &table), LINE_WIDTH);
        assert_eq!(layout.v_line_width(4, &table), 0.0);
        assert_eq!(layout.h_line_width(1, &table), 0.0);
    }

    #[test]
    fn test_shim_structure() {
        let shim = center_vertically(Content::text("middle"));
        let Content::Table(table) = &shim else {
            panic!("shim must be a table");
        };
        assert_eq!(table.layout, TableLayout::Shim);
        assert_eq!(table.heights, vec![RowHeight::Flex, RowHeight::Auto, RowHeight::Flex]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(TableLayout::Shim.padding_left(0, table, 1), 0.0);
        assert_eq!(TableLayout::Shim.h_line_width(0, table), 0.0);
        assert_eq!(shim_content(&shim).map(|c| c.plain_text()), Some("middle".to_string()));
    }
}

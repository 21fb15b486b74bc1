use super::{section_title_row, SectionBuilder};
use crate::cell::{placeholder_block, CellContentBuilder};
use crate::description::{spanning_row, Cell, CellBox, ColumnWidth, Content, Table};
use crate::grouping::Section;
use crate::layout::{center_vertically, TableLayout, SECTION_BOTTOM_MARGIN};
use crate::model::{DataRecord, FieldKind};
use crate::style::{Edges, Style, StyleName, TextAlign};

/// Shown when a repeating table has no rows.
pub const NO_ROWS_ADDED: &str = "(no rows added)";

/// A section holding a single repeating-table field: one column per
/// sub-field, one row per submitted row.
pub struct RepeatingTableSectionBuilder;

impl SectionBuilder for RepeatingTableSectionBuilder {
    fn can_handle(&self, section: &Section<'_>) -> bool {
        matches!(section.fields.as_slice(), [field] if matches!(field.kind, FieldKind::RepeatingTable { .. }))
    }

    fn build(&self, section: &Section<'_>, record: &DataRecord) -> Content {
        let Some(field) = section.fields.first() else {
            return Content::empty();
        };
        let columns = field.columns();
        if columns.is_empty() {
            log::warn!("Repeating table '{}' declares no columns", field.id);
        }
        let cols = columns.len().max(1);
        let rows = record.rows(&field.id);

        let mut table = Table::new(vec![ColumnWidth::Star; cols], TableLayout::Main);
        table.body.push(section_title_row(&section.title, cols));

        if columns.is_empty() {
            table.body.push(vec![Cell::text("", StyleName::TableHeader)]);
        } else {
            table.body.push(
                columns
                    .iter()
                    .map(|col| Cell::text(&col.label, StyleName::TableHeader))
                    .collect(),
            );
        }

        if rows.is_empty() || columns.is_empty() {
            let placeholder = CellBox::new(center_vertically(Content::Text(placeholder_block(NO_ROWS_ADDED))))
                .named(StyleName::Answer)
                .styled(Style {
                    alignment: Some(TextAlign::Center),
                    ..Default::default()
                });
            table.body.push(spanning_row(placeholder, cols));
        } else {
            for row in &rows {
                let cells = CellContentBuilder::new(row);
                table
                    .body
                    .push(columns.iter().map(|col| Cell::Filled(cells.build(col, false))).collect());
            }
        }

        table.header_rows = 2;
        table.margin = Some(Edges::bottom(SECTION_BOTTOM_MARGIN));
        log::debug!("Repeating table '{}': {} columns, {} rows", field.id, cols, rows.len());
        Content::Table(table)
    }
}

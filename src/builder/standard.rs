use super::{section_title_row, SectionBuilder, TableBodyBuilder};
use crate::cell::CellContentBuilder;
use crate::description::{ColumnWidth, Content, Table};
use crate::grouping::{group_rows, Section};
use crate::layout::{TableLayout, SECTION_BOTTOM_MARGIN};
use crate::model::{DataRecord, FieldDefinition};
use crate::style::Edges;

/// The catch-all: a label/value table of every plain field in the section.
pub struct StandardSectionBuilder;

impl SectionBuilder for StandardSectionBuilder {
    fn can_handle(&self, _section: &Section<'_>) -> bool {
        true
    }

    fn build(&self, section: &Section<'_>, record: &DataRecord) -> Content {
        let fields: Vec<&FieldDefinition> = section
            .fields
            .iter()
            .copied()
            .filter(|f| !f.kind.is_structured())
            .collect();
        if fields.is_empty() {
            return Content::empty();
        }
        if fields.len() < section.fields.len() {
            log::warn!(
                "Section '{}' mixes table or choice fields with plain ones; only the plain fields are shown",
                section.title
            );
        }

        let groups = group_rows(&fields, record);
        let rows = TableBodyBuilder::new(CellContentBuilder::new(record)).build(&groups);

        let mut table = Table::new(vec![ColumnWidth::Auto, ColumnWidth::Star], TableLayout::GroupAware);
        let titled = !section.title.trim().is_empty();
        if titled {
            table.body.push(section_title_row(&section.title, 2));
            table.header_rows = 1;
        }
        table.body.extend(rows);
        table.margin = Some(Edges::bottom(SECTION_BOTTOM_MARGIN));

        log::debug!(
            "Section '{}': {} fields in {} groups, {} rows",
            section.title,
            fields.len(),
            groups.len(),
            table.row_count()
        );
        Content::Table(table)
    }
}

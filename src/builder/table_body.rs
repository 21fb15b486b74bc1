//! Rows of a standard section table from its field groups.

use crate::cell::CellContentBuilder;
use crate::description::{spanning_row, Cell, CellBox, ColumnWidth, Content, Table};
use crate::grouping::FieldGroup;
use crate::layout::{TableLayout, CELL_HORIZONTAL_PADDING};
use crate::model::FieldDefinition;
use crate::style::Edges;

/// Columns of the table the rows are built for: label and value.
const COLUMNS: usize = 2;

pub struct TableBodyBuilder<'a> {
    cells: CellContentBuilder<'a>,
}

impl<'a> TableBodyBuilder<'a> {
    pub fn new(cells: CellContentBuilder<'a>) -> Self {
        Self { cells }
    }

    pub fn build(&self, groups: &[FieldGroup<'_>]) -> Vec<Vec<Cell>> {
        let mut body = Vec::new();
        for group in groups {
            match group {
                FieldGroup::Long(field) if field.kind.is_multiline() => {
                    body.extend(self.stacked_rows(field));
                }
                FieldGroup::Long(field) => body.push(self.label_value_row(field)),
                FieldGroup::Short(fields) => match fields.as_slice() {
                    [] => {}
                    [field] => body.push(self.label_value_row(field)),
                    fields => body.push(self.grouped_row(fields)),
                },
            }
        }
        body
    }

    fn label_value_row(&self, field: &FieldDefinition) -> Vec<Cell> {
        vec![
            Cell::Filled(self.cells.build(field, true)),
            Cell::Filled(self.cells.build(field, false)),
        ]
    }

    /// Label row over value row, both full width.
    fn stacked_rows(&self, field: &FieldDefinition) -> [Vec<Cell>; 2] {
        [
            spanning_row(self.cells.build(field, true), COLUMNS),
            spanning_row(self.cells.build(field, false), COLUMNS),
        ]
    }

    /// Short fields side by side in a nested table spanning the row. The
    /// group cell's negative margin cancels the parent's horizontal padding.
    fn grouped_row(&self, fields: &[&FieldDefinition]) -> Vec<Cell> {
        let mut nested = Table::new(
            fields
                .iter()
                .flat_map(|_| [ColumnWidth::Auto, ColumnWidth::Star])
                .collect(),
            TableLayout::Nested,
        );
        nested.body.push(
            fields
                .iter()
                .flat_map(|field| [self.cells.build(field, true), self.cells.build(field, false)])
                .map(Cell::Filled)
                .collect(),
        );

        let mut group = CellBox::new(Content::Table(nested));
        group.is_group = true;
        group.style.margin = Some(Edges::new(
            0.0,
            -CELL_HORIZONTAL_PADDING,
            0.0,
            -CELL_HORIZONTAL_PADDING,
        ));
        spanning_row(group, COLUMNS)
    }
}

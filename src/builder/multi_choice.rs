use super::{section_title_row, SectionBuilder};
use crate::cell::{placeholder_block, rich_text};
use crate::description::{spanning_row, CellBox, ColumnWidth, Content, Stack, Table, TextBlock, TextRun};
use crate::grouping::Section;
use crate::layout::{TableLayout, SECTION_BOTTOM_MARGIN};
use crate::model::{ChoiceOption, DataRecord, FieldKind};
use crate::style::{Edges, Style, StyleName, TextAlign};

/// Shown when no option of a multi-choice field is selected.
pub const NO_OPTION_SELECTED: &str = "(no option selected)";

const COLUMNS: usize = 2;

/// A section holding a single multi-choice field: the field label as stacked
/// header rows, then one row per selected option.
pub struct MultiChoiceSectionBuilder;

impl SectionBuilder for MultiChoiceSectionBuilder {
    fn can_handle(&self, section: &Section<'_>) -> bool {
        matches!(section.fields.as_slice(), [field] if matches!(field.kind, FieldKind::MultiChoice { .. }))
    }

    fn build(&self, section: &Section<'_>, record: &DataRecord) -> Content {
        let Some(field) = section.fields.first() else {
            return Content::empty();
        };

        let mut table = Table::new(vec![ColumnWidth::Auto, ColumnWidth::Star], TableLayout::Main);
        table.body.push(section_title_row(&section.title, COLUMNS));

        let lines = label_lines(&field.label);
        for line in &lines {
            let cell = CellBox::new(Content::text(line))
                .named(StyleName::DetailedChoiceLabel)
                .styled(Style {
                    margin: Some(Edges::symmetric(2.0, 0.0)),
                    ..Default::default()
                });
            table.body.push(spanning_row(cell, COLUMNS));
        }

        let selected: Vec<&ChoiceOption> = field
            .options()
            .iter()
            .filter(|option| record.is_selected(&field.id, &option.id))
            .collect();

        if selected.is_empty() {
            let cell = CellBox::new(Content::Text(placeholder_block(NO_OPTION_SELECTED)))
                .named(StyleName::Answer)
                .styled(Style {
                    alignment: Some(TextAlign::Left),
                    margin: Some(Edges::new(5.0, 0.0, 5.0, 5.0)),
                    ..Default::default()
                });
            table.body.push(spanning_row(cell, COLUMNS));
        } else {
            for option in &selected {
                table.body.push(spanning_row(option_cell(option), COLUMNS));
            }
        }

        table.header_rows = 1 + lines.len() as u32;
        table.keep_with_header_rows = 1;
        table.margin = Some(Edges::bottom(SECTION_BOTTOM_MARGIN));
        log::debug!(
            "Multi-choice '{}': {} of {} options selected",
            field.id,
            selected.len(),
            field.options().len()
        );
        Content::Table(table)
    }
}

/// Split a label on line-break markers, either the two characters `\n` as
/// typed into a template editor or a real newline. Blank lines are dropped.
fn label_lines(label: &str) -> Vec<String> {
    label
        .replace("\\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `label: summary` in one line, the description indented below it.
fn option_cell(option: &ChoiceOption) -> CellBox {
    let mut heading = vec![TextRun::styled(
        &format!("{}: ", option.label),
        Style {
            bold: Some(true),
            ..Default::default()
        },
    )];
    if let Some(summary) = option.summary.as_deref() {
        heading.extend(rich_text(summary));
    }

    let mut items = vec![Content::Text(TextBlock::from_runs(heading))];
    if let Some(description) = option.description.as_deref().filter(|d| !d.trim().is_empty()) {
        items.push(Content::Text(TextBlock::from_runs(rich_text(description)).styled(Style {
            margin: Some(Edges::new(2.0, 0.0, 0.0, 10.0)),
            ..Default::default()
        })));
    }

    CellBox::new(Content::Stack(Stack {
        items,
        style: Style::default(),
    }))
    .named(StyleName::Answer)
    .styled(Style {
        margin: Some(Edges::symmetric(5.0, 0.0)),
        ..Default::default()
    })
}

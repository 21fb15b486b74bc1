//! # Cell Content
//!
//! Builds the content of one table cell for a field: either its label or its
//! value from the record. Values run through the whole text pipeline
//! (unescape, linkify, break long tokens, type formatting, markup parsing)
//! and every cell ends up inside the vertical-centering shim.

use crate::description::{CellBox, Content, TextBlock, TextRun};
use crate::layout::center_vertically;
use crate::model::{DataRecord, FieldDefinition, FieldKind};
use crate::style::{Style, StyleName};
use crate::text;

/// Shown for every unanswered value.
pub const EMPTY_VALUE_PLACEHOLDER: &str = "(not filled in)";

pub struct CellContentBuilder<'a> {
    record: &'a DataRecord,
}

impl<'a> CellContentBuilder<'a> {
    pub fn new(record: &'a DataRecord) -> Self {
        Self { record }
    }

    /// The label cell (`is_label`) or value cell for `field`.
    pub fn build(&self, field: &FieldDefinition, is_label: bool) -> CellBox {
        let style_name = if is_label { StyleName::Label } else { StyleName::Answer };

        let block = if is_label {
            TextBlock::from_runs(label_runs(field))
        } else {
            match self.record.text(&field.id) {
                Some(value) => TextBlock::from_runs(value_runs(field, &value)),
                None => placeholder_block(EMPTY_VALUE_PLACEHOLDER),
            }
        };

        CellBox::new(center_vertically(Content::Text(block))).named(style_name)
    }
}

fn label_runs(field: &FieldDefinition) -> Vec<TextRun> {
    let mut label = field.label.clone();
    if field.kind.is_multiline() {
        label = text::newlines_to_breaks(&label);
    }
    text::parse_markup(&label)
}

fn value_runs(field: &FieldDefinition, value: &str) -> Vec<TextRun> {
    let mut markup = rich_markup(value);
    match field.kind {
        FieldKind::Date => markup = text::format_date(&markup),
        FieldKind::Textarea => markup = text::newlines_to_breaks(&markup),
        _ => {}
    }
    text::parse_markup(&markup)
}

/// Unescape, linkify and break long tokens in a submitted value.
pub(crate) fn rich_markup(value: &str) -> String {
    let unescaped = text::unescape_html(value);
    let linked = text::linkify(&unescaped);
    text::break_long_words(&linked)
}

/// Run free text (option summaries, descriptions) through the value pipeline.
pub fn rich_text(value: &str) -> Vec<TextRun> {
    text::parse_markup(&rich_markup(value))
}

/// Gray italic text for "nothing here" rows and cells.
pub fn placeholder_block(message: &str) -> TextBlock {
    TextBlock::from_runs(vec![TextRun::styled(message, Style::placeholder())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::shim_content;
    use serde_json::json;

    fn inner_text(cell: &CellBox) -> String {
        shim_content(&cell.content)
            .map(|c| c.plain_text())
            .unwrap_or_default()
    }

    fn inner_runs(cell: &CellBox) -> Vec<TextRun> {
        match shim_content(&cell.content) {
            Some(Content::Text(block)) => block.runs.clone(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_label_and_value_cells() {
        let record = DataRecord::new().with("name", json!("Ana"));
        let builder = CellContentBuilder::new(&record);
        let field = FieldDefinition::new("name", "Full name", FieldKind::Text);

        let label = builder.build(&field, true);
        assert_eq!(label.style_name, Some(StyleName::Label));
        assert_eq!(inner_text(&label), "Full name");

        let value = builder.build(&field, false);
        assert_eq!(value.style_name, Some(StyleName::Answer));
        assert_eq!(inner_text(&value), "Ana");
    }

    #[test]
    fn test_unanswered_values_get_placeholder() {
        let record = DataRecord::new()
            .with("null", json!(null))
            .with("blank", json!(""));
        let builder = CellContentBuilder::new(&record);
        for id in ["null", "blank", "missing"] {
            let cell = builder.build(&FieldDefinition::new(id, id, FieldKind::Text), false);
            let runs = inner_runs(&cell);
            assert_eq!(runs.len(), 1);
            assert_eq!(runs[0].content, EMPTY_VALUE_PLACEHOLDER);
            assert_eq!(runs[0].style.italics, Some(true));
        }
    }

    #[test]
    fn test_zero_and_false_are_answers() {
        let record = DataRecord::new().with("n", json!(0)).with("b", json!(false));
        let builder = CellContentBuilder::new(&record);
        let n = builder.build(&FieldDefinition::new("n", "n", FieldKind::Number), false);
        assert_eq!(inner_text(&n), "0");
        let b = builder.build(&FieldDefinition::new("b", "b", FieldKind::Text), false);
        assert_eq!(inner_text(&b), "false");
    }

    #[test]
    fn test_escaped_markup_is_rendered() {
        let record = DataRecord::new().with("v", json!("&lt;b&gt;bold&lt;/b&gt; text"));
        let cell = CellContentBuilder::new(&record).build(&FieldDefinition::new("v", "v", FieldKind::Text), false);
        let runs = inner_runs(&cell);
        assert_eq!(runs[0].content, "bold");
        assert_eq!(runs[0].style.bold, Some(true));
        assert_eq!(runs[1].content, " text");
    }

    #[test]
    fn test_dates_and_textarea_formatting() {
        let record = DataRecord::new()
            .with("d", json!("2024-01-31"))
            .with("t", json!("line one\nline two"));
        let builder = CellContentBuilder::new(&record);
        let date = builder.build(&FieldDefinition::new("d", "d", FieldKind::Date), false);
        assert_eq!(inner_text(&date), "31/01/2024");
        let area = builder.build(&FieldDefinition::new("t", "t", FieldKind::Textarea), false);
        assert_eq!(inner_text(&area), "line one\nline two");

        // A plain text field keeps the date as typed.
        let as_text = builder.build(&FieldDefinition::new("d", "d", FieldKind::Text), false);
        assert_eq!(inner_text(&as_text), "2024-01-31");
    }

    #[test]
    fn test_date_with_non_ascii_digits_is_kept_as_typed() {
        let value = "\u{0662}\u{0660}\u{0662}\u{0664}-\u{0660}\u{0663}-\u{0660}\u{0665}";
        let record = DataRecord::new().with("d", json!(value));
        let cell = CellContentBuilder::new(&record).build(&FieldDefinition::new("d", "d", FieldKind::Date), false);
        assert_eq!(inner_text(&cell), value);
    }

    #[test]
    fn test_values_are_linkified_and_broken() {
        let token = "x".repeat(40);
        let record = DataRecord::new()
            .with("mail", json!("write to ana@example.com"))
            .with("token", json!(token));
        let builder = CellContentBuilder::new(&record);

        let mail = inner_runs(&builder.build(&FieldDefinition::new("mail", "m", FieldKind::Text), false));
        assert_eq!(mail[1].href.as_deref(), Some("mailto:ana@example.com"));

        let broken = inner_text(&builder.build(&FieldDefinition::new("token", "t", FieldKind::Text), false));
        assert!(broken.contains(crate::text::ZWSP));
        assert_eq!(broken.replace(crate::text::ZWSP, ""), "x".repeat(40));
    }

    #[test]
    fn test_labels_are_not_linkified() {
        let record = DataRecord::new();
        let field = FieldDefinition::new("site", "Website (www.example.com)", FieldKind::Text);
        let runs = inner_runs(&CellContentBuilder::new(&record).build(&field, true));
        assert!(runs.iter().all(|r| r.href.is_none()));
    }
}

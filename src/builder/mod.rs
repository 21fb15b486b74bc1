//! # Document Builder
//!
//! Turns field definitions and a record into a [`DocumentDescription`].
//!
//! ```text
//! fields ──sort──▶ group_sections ──▶ SectionBuilderChain ──▶ content blocks
//!                                        │
//!                     ┌──────────────────┼────────────────────┐
//!                     ▼                  ▼                    ▼
//!              RepeatingTable       MultiChoice           Standard
//!                                                    (group_rows + TableBody)
//! ```
//!
//! Each section goes to the first builder in the chain that claims it. The
//! chain ends with the standard builder, which claims everything.
//!
//! [`DocumentDescription`]: crate::description::DocumentDescription

mod document;
mod header;
mod multi_choice;
mod repeating_table;
mod standard;
mod table_body;

pub use document::{BuildOptions, DocumentBuilder};
pub use header::{PageHeader, HEADER_BAND_MARGIN, LOGO_FIT};
pub use multi_choice::{MultiChoiceSectionBuilder, NO_OPTION_SELECTED};
pub use repeating_table::{RepeatingTableSectionBuilder, NO_ROWS_ADDED};
pub use standard::StandardSectionBuilder;
pub use table_body::TableBodyBuilder;

use crate::description::{spanning_row, Cell, CellBox, Content};
use crate::grouping::Section;
use crate::model::DataRecord;
use crate::style::StyleName;

/// Lays out one kind of section.
pub trait SectionBuilder: Send + Sync {
    /// Whether this builder takes the section.
    fn can_handle(&self, section: &Section<'_>) -> bool;

    /// The section's content block. [`Content::empty`] when there is nothing
    /// to show.
    fn build(&self, section: &Section<'_>, record: &DataRecord) -> Content;
}

/// Section builders tried in order, most specific first.
pub struct SectionBuilderChain {
    builders: Vec<Box<dyn SectionBuilder>>,
}

impl SectionBuilderChain {
    pub fn new(builders: Vec<Box<dyn SectionBuilder>>) -> Self {
        Self { builders }
    }

    /// Put a builder in front of the existing ones.
    pub fn prepend(mut self, builder: Box<dyn SectionBuilder>) -> Self {
        self.builders.insert(0, builder);
        self
    }

    pub fn build(&self, section: &Section<'_>, record: &DataRecord) -> Content {
        match self.builders.iter().find(|b| b.can_handle(section)) {
            Some(builder) => builder.build(section, record),
            None => {
                log::warn!("No section builder for section '{}'", section.title);
                Content::empty()
            }
        }
    }
}

impl Default for SectionBuilderChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(RepeatingTableSectionBuilder),
            Box::new(MultiChoiceSectionBuilder),
            Box::new(StandardSectionBuilder),
        ])
    }
}

/// The dark title row every section table starts with.
pub(crate) fn section_title_row(title: &str, cols: usize) -> Vec<Cell> {
    spanning_row(CellBox::new(Content::text(title)).named(StyleName::SectionHeader), cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldKind};

    struct Everything;

    impl SectionBuilder for Everything {
        fn can_handle(&self, _section: &Section<'_>) -> bool {
            true
        }

        fn build(&self, _section: &Section<'_>, _record: &DataRecord) -> Content {
            Content::text("custom")
        }
    }

    #[test]
    fn test_first_matching_builder_wins() {
        let field = FieldDefinition::new("a", "A", FieldKind::Text);
        let section = Section {
            title: "S".to_string(),
            fields: vec![&field],
        };
        let record = DataRecord::new();

        let chain = SectionBuilderChain::default().prepend(Box::new(Everything));
        assert_eq!(chain.build(&section, &record).plain_text(), "custom");

        let standard = SectionBuilderChain::default().build(&section, &record);
        assert!(matches!(standard, Content::Table(_)));
    }

    #[test]
    fn test_empty_chain_yields_empty_block() {
        let section = Section {
            title: "S".to_string(),
            fields: Vec::new(),
        };
        let chain = SectionBuilderChain::new(Vec::new());
        assert!(chain.build(&section, &DataRecord::new()).is_empty());
    }
}

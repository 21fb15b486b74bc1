//! # Field Grouping
//!
//! Two passes turn a flat, order-sorted field list into layout units.
//!
//! [`group_sections`] partitions fields into titled sections. Sections come
//! out in the order their first field appears, fields inside a section keep
//! their incoming order.
//!
//! [`group_rows`] then scans one section left to right and buckets its fields
//! into long fields (a full row each) and runs of up to
//! [`MAX_SHORT_GROUP`] short fields that share a row. A run never spans a
//! long field.

use crate::layout::{MAX_SHORT_GROUP, SHORT_FIELD_THRESHOLD};
use crate::model::{DataRecord, FieldDefinition, FieldKind, TITLE_FIELD_ID};

/// Title of the section collecting fields that name none.
pub const DEFAULT_SECTION_TITLE: &str = "General";

/// A titled group of fields rendered together. Lives for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub title: String,
    pub fields: Vec<&'a FieldDefinition>,
}

/// Which fields a grouping call site lays out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionPolicy {
    /// The generated document: everything except the title pseudo-field.
    #[default]
    Document,
    /// The on-screen form: additionally hides document-only fields.
    Form,
}

impl SectionPolicy {
    fn includes(&self, field: &FieldDefinition) -> bool {
        if field.id == TITLE_FIELD_ID {
            return false;
        }
        match self {
            SectionPolicy::Document => true,
            SectionPolicy::Form => field.show_in_form,
        }
    }
}

/// Partition `fields` into sections.
///
/// Sections are ordered by the `order` of their first field, ties broken by
/// first appearance. For already sorted input that is simply first
/// appearance.
pub fn group_sections<'a>(fields: &[&'a FieldDefinition], policy: SectionPolicy) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();

    for &field in fields.iter().filter(|f| policy.includes(f)) {
        let title = section_title(field);
        match sections.iter_mut().find(|s| s.title == title) {
            Some(section) => section.fields.push(field),
            None => sections.push(Section {
                title: title.to_string(),
                fields: vec![field],
            }),
        }
    }

    sections.sort_by_key(|s| s.fields.first().map_or(0, |f| f.order));
    sections
}

fn section_title(field: &FieldDefinition) -> &str {
    match field.section_title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title,
        _ => DEFAULT_SECTION_TITLE,
    }
}

/// A layout unit within a section.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGroup<'a> {
    /// One field on a row of its own.
    Long(&'a FieldDefinition),
    /// One to [`MAX_SHORT_GROUP`] consecutive short fields. A single-member
    /// group is laid out like a long field.
    Short(Vec<&'a FieldDefinition>),
}

impl<'a> FieldGroup<'a> {
    pub fn fields(&self) -> Vec<&'a FieldDefinition> {
        match self {
            FieldGroup::Long(field) => vec![*field],
            FieldGroup::Short(fields) => fields.clone(),
        }
    }
}

/// Bucket a section's fields into long fields and short runs.
pub fn group_rows<'a>(fields: &[&'a FieldDefinition], record: &DataRecord) -> Vec<FieldGroup<'a>> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < fields.len() {
        if !is_short_field(fields[i], record) {
            groups.push(FieldGroup::Long(fields[i]));
            i += 1;
            continue;
        }

        let mut bucket = Vec::with_capacity(MAX_SHORT_GROUP);
        while i < fields.len() && bucket.len() < MAX_SHORT_GROUP && is_short_field(fields[i], record) {
            bucket.push(fields[i]);
            i += 1;
        }
        groups.push(FieldGroup::Short(bucket));
    }

    groups
}

/// Whether a field may share a row with its neighbours.
///
/// Multi-line and structured kinds never can. Otherwise the label plus the
/// value must stay under [`SHORT_FIELD_THRESHOLD`] characters and neither may
/// contain a `<`, which is taken as a sign of embedded markup.
pub fn is_short_field(field: &FieldDefinition, record: &DataRecord) -> bool {
    if matches!(
        field.kind,
        FieldKind::Textarea | FieldKind::MultiChoice { .. } | FieldKind::RepeatingTable { .. }
    ) {
        return false;
    }

    let value = record.text_or_empty(&field.id);
    if value.contains('<') || field.label.contains('<') {
        return false;
    }

    field.label.chars().count() + value.chars().count() < SHORT_FIELD_THRESHOLD
}

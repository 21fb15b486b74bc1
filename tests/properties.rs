//! Property tests for ordering, grouping, placeholders and links.

use std::collections::HashMap;

use proptest::prelude::*;
use serde_json::Value;

use formpress::cell::{CellContentBuilder, EMPTY_VALUE_PLACEHOLDER};
use formpress::grouping::{group_rows, group_sections, is_short_field, FieldGroup, SectionPolicy};
use formpress::layout::{MAX_SHORT_GROUP, SHORT_FIELD_THRESHOLD};
use formpress::model::sorted_by_order;
use formpress::text::{linkify, strip_links};
use formpress::{DataRecord, FieldDefinition, FieldKind};

fn kind() -> impl Strategy<Value = FieldKind> {
    prop_oneof![
        4 => Just(FieldKind::Text),
        1 => Just(FieldKind::Textarea),
        1 => Just(FieldKind::Number),
        1 => Just(FieldKind::Date),
    ]
}

/// (kind, order, section, label, value) per field.
fn field_specs() -> impl Strategy<Value = Vec<(FieldKind, i64, usize, String, Option<String>)>> {
    prop::collection::vec(
        (
            kind(),
            0i64..5,
            0usize..4,
            "[A-Za-z ]{1,30}",
            prop::option::of("[a-z0-9 <>]{0,30}"),
        ),
        0..24,
    )
}

const SECTIONS: [&str; 4] = ["Basics", "Details", "Extra", ""];

fn build_inputs(specs: &[(FieldKind, i64, usize, String, Option<String>)]) -> (Vec<FieldDefinition>, DataRecord) {
    let mut record = DataRecord::new();
    let fields = specs
        .iter()
        .enumerate()
        .map(|(i, (kind, order, section, label, value))| {
            let id = format!("f{}", i);
            if let Some(value) = value {
                record.insert(&id, Value::String(value.clone()));
            }
            FieldDefinition::new(&id, label, kind.clone())
                .with_order(*order)
                .in_section(SECTIONS[*section])
        })
        .collect();
    (fields, record)
}

proptest! {
    #[test]
    fn sections_and_fields_follow_declared_order(specs in field_specs()) {
        let (fields, _) = build_inputs(&specs);
        let position: HashMap<&str, usize> = fields.iter().enumerate().map(|(i, f)| (f.id.as_str(), i)).collect();
        let sorted = sorted_by_order(&fields);
        let sections = group_sections(&sorted, SectionPolicy::Document);

        let firsts: Vec<i64> = sections.iter().map(|s| s.fields[0].order).collect();
        prop_assert!(firsts.windows(2).all(|w| w[0] <= w[1]));

        for section in &sections {
            let keys: Vec<(i64, usize)> = section
                .fields
                .iter()
                .map(|f| (f.order, position[f.id.as_str()]))
                .collect();
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn every_field_lands_in_exactly_one_group(specs in field_specs()) {
        let (fields, record) = build_inputs(&specs);
        let sorted = sorted_by_order(&fields);

        let mut seen: Vec<String> = group_sections(&sorted, SectionPolicy::Document)
            .iter()
            .flat_map(|section| group_rows(&section.fields, &record))
            .flat_map(|group| group.fields())
            .map(|f| f.id.clone())
            .collect();
        seen.sort();

        let mut expected: Vec<String> = fields.iter().map(|f| f.id.clone()).collect();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn short_groups_stay_small_and_plain(specs in field_specs()) {
        let (fields, record) = build_inputs(&specs);
        let sorted = sorted_by_order(&fields);

        for section in group_sections(&sorted, SectionPolicy::Document) {
            for group in group_rows(&section.fields, &record) {
                if let FieldGroup::Short(members) = group {
                    prop_assert!(!members.is_empty() && members.len() <= MAX_SHORT_GROUP);
                    for field in members {
                        let value = record.text_or_empty(&field.id);
                        prop_assert!(is_short_field(field, &record));
                        prop_assert!(!matches!(field.kind, FieldKind::Textarea | FieldKind::MultiChoice { .. }), "unexpected field kind: {:?}", field.kind);
                        prop_assert!(field.label.chars().count() + value.chars().count() < SHORT_FIELD_THRESHOLD);
                        prop_assert!(!value.contains('<'));
                    }
                }
            }
        }
    }

    #[test]
    fn unanswered_values_render_the_placeholder(
        kind in kind(),
        value in prop_oneof![Just(None), Just(Some(Value::Null)), Just(Some(Value::String(String::new())))],
    ) {
        let field = FieldDefinition::new("q", "Question", kind);
        let record = match value {
            Some(v) => DataRecord::new().with("q", v),
            None => DataRecord::new(),
        };
        let cell = CellContentBuilder::new(&record).build(&field, false);
        prop_assert_eq!(cell.content.plain_text(), EMPTY_VALUE_PLACEHOLDER);
    }

    #[test]
    fn stripping_links_restores_short_urls(
        host in "[a-z]{1,6}",
        tld in prop_oneof![Just("com"), Just("org")],
        path in prop::collection::vec("[a-z]{1,5}", 0..2),
        scheme in prop_oneof![Just("https://"), Just("http://"), Just("www.")],
    ) {
        let mut url = format!("{}{}.{}", scheme, host, tld);
        for segment in &path {
            url.push('/');
            url.push_str(segment);
        }
        prop_assert_eq!(strip_links(&linkify(&url)), url);
    }

    #[test]
    fn stripping_links_restores_emails(user in "[a-z]{1,8}", domain in "[a-z]{1,8}") {
        let email = format!("{}@{}.com", user, domain);
        let text = format!("mail {} today", email);
        prop_assert_eq!(strip_links(&linkify(&text)), text);
    }
}

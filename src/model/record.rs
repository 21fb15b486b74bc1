//! The submitted-values record: a schema-less map from field id to value.
//!
//! Nothing in here fails. A missing key, `null`, and the empty string all
//! read as "unanswered", and every value has a string rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{FieldDefinition, FieldKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord(Map<String, Value>);

impl DataRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap any JSON value. Anything but an object becomes an empty record,
    /// which is how malformed repeating-table rows are read.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self(map.clone()),
            _ => Self::new(),
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: &str, value: Value) {
        self.0.insert(id.to_string(), value);
    }

    pub fn with(mut self, id: &str, value: Value) -> Self {
        self.insert(id, value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// True for missing keys, `null` and `""`.
    pub fn is_unanswered(&self, id: &str) -> bool {
        match self.0.get(id) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    /// The value as display text, or `None` when unanswered.
    pub fn text(&self, id: &str) -> Option<String> {
        if self.is_unanswered(id) {
            return None;
        }
        self.0.get(id).map(value_to_text)
    }

    /// The value as display text, `""` when unanswered.
    pub fn text_or_empty(&self, id: &str) -> String {
        self.text(id).unwrap_or_default()
    }

    /// Rows of a repeating-table value. Non-list values read as no rows.
    pub fn rows(&self, id: &str) -> Vec<DataRecord> {
        match self.0.get(id) {
            Some(Value::Array(rows)) => rows.iter().map(DataRecord::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a multi-choice option is selected. Only a literal `true` counts.
    pub fn is_selected(&self, id: &str, option_id: &str) -> bool {
        matches!(
            self.0.get(id).and_then(|v| v.get(option_id)),
            Some(Value::Bool(true))
        )
    }

    /// An initial record for a template, the way a fresh form starts out.
    pub fn with_defaults(fields: &[FieldDefinition]) -> Self {
        let mut record = Self::new();
        for field in fields {
            record.insert(&field.id, default_value(field));
        }
        record
    }

    /// A copy keeping only declared fields, with empty strings stored as
    /// `null`. Repeating-table rows are normalized against their columns.
    pub fn normalized(&self, fields: &[FieldDefinition]) -> Self {
        let mut clean = Self::new();
        for field in fields {
            let value = self.0.get(&field.id).cloned().unwrap_or(Value::Null);
            let value = match (&field.kind, value) {
                (FieldKind::RepeatingTable { sub_fields }, Value::Array(rows)) => Value::Array(
                    rows.iter()
                        .map(|row| Value::Object(DataRecord::from_value(row).normalized(sub_fields).0))
                        .collect(),
                ),
                (_, Value::String(s)) if s.is_empty() => Value::Null,
                (_, other) => other,
            };
            clean.insert(&field.id, value);
        }
        clean
    }
}

impl From<Map<String, Value>> for DataRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn default_value(field: &FieldDefinition) -> Value {
    match &field.kind {
        FieldKind::RepeatingTable { sub_fields } => {
            let row = DataRecord::with_defaults(sub_fields);
            Value::Array(vec![Value::Object(row.0)])
        }
        FieldKind::MultiChoice { options } => {
            let mut selections = Map::new();
            for option in options {
                let selected = field
                    .default_value
                    .as_ref()
                    .and_then(|d| d.get(&option.id))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                selections.insert(option.id.clone(), Value::Bool(selected));
            }
            Value::Object(selections)
        }
        _ => match &field.default_value {
            Some(Value::Null) | None => Value::String(String::new()),
            Some(v) => v.clone(),
        },
    }
}

/// Render any JSON value as text.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => crate::text::format_number(n),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

//! # Input Model
//!
//! What the engine consumes: an ordered list of field definitions (the
//! template), a flat record of submitted values, and optional header and
//! metadata configuration. All of it is plain serde-deserialized JSON, so a
//! template stored anywhere (a database document, a file, an HTTP body) can be
//! handed to the builder unchanged.
//!
//! Field definitions are recursive: a repeating table owns a nested list of
//! column definitions of the same shape. That recursion lives in
//! [`FieldKind`], so leaf kinds cannot carry sub-fields by construction.

mod record;

pub use record::DataRecord;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{FormpressError, Result};

/// Title used whenever neither the template nor the header names the document.
pub const DEFAULT_REPORT_TITLE: &str = "Form Report";

/// Id of the pseudo-field holding the record's own title. It is never laid
/// out as a regular field.
pub const TITLE_FIELD_ID: &str = "title";

/// One answerable unit in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Unique within the enclosing field list. Keys the record value.
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// The field type and any structure that belongs to it.
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Sort key. Ties keep declaration order. Negative or non-numeric
    /// values are read as 0.
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: i64,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Fields without a section title join the default section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,

    /// Label for the "add row" control of repeating tables (form side only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_row_label: Option<String>,

    /// `false` marks a document-only field (e.g. an auto-computed date).
    #[serde(default = "default_true")]
    pub show_in_form: bool,
}

/// The field types. Serialized as the `type` tag of the field object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Date,
    Number,
    /// A table whose value is a list of row records, one column per sub-field.
    #[serde(alias = "dynamic_table")]
    RepeatingTable {
        #[serde(default, rename = "subFields", alias = "fields")]
        sub_fields: Vec<FieldDefinition>,
    },
    /// A set of boolean selections over a fixed option list.
    #[serde(alias = "detailed_multiple_choice")]
    MultiChoice {
        #[serde(default)]
        options: Vec<ChoiceOption>,
    },
}

impl FieldKind {
    /// Multi-line kinds get the stacked label/value layout.
    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::Textarea)
    }

    /// Kinds that own a whole section instead of a table row.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            FieldKind::RepeatingTable { .. } | FieldKind::MultiChoice { .. }
        )
    }
}

/// An option of a multi-choice field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(id: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            order: 0,
            required: false,
            default_value: None,
            section_title: None,
            add_row_label: None,
            show_in_form: true,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order.max(0);
        self
    }

    pub fn in_section(mut self, title: &str) -> Self {
        self.section_title = Some(title.to_string());
        self
    }

    /// Columns of a repeating table, stable-sorted by order. Empty for
    /// every other kind.
    pub fn columns(&self) -> Vec<&FieldDefinition> {
        match &self.kind {
            FieldKind::RepeatingTable { sub_fields } => sorted_by_order(sub_fields),
            _ => Vec::new(),
        }
    }

    /// Options of a multi-choice field. Empty for every other kind.
    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            FieldKind::MultiChoice { options } => options,
            _ => &[],
        }
    }
}

/// Stable sort by `order`. Ties keep input position, never id or label.
pub fn sorted_by_order(fields: &[FieldDefinition]) -> Vec<&FieldDefinition> {
    let mut sorted: Vec<&FieldDefinition> = fields.iter().collect();
    sorted.sort_by_key(|f| f.order);
    sorted
}

fn default_true() -> bool {
    true
}

fn lenient_order<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let order = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    };
    Ok(order.max(0))
}

/// Page header band configuration. Absent config means no header at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    /// Overrides the document title in the center of the band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Base64 image data or a `data:image/...` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_base64: Option<String>,
}

/// Document information and security settings supplied with a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Produce a tagged (accessible) document. Defaults to true.
    pub tagged: Option<bool>,
    pub user_password: Option<String>,
    pub owner_password: Option<String>,
    pub permissions: Option<Permissions>,
}

/// Permission flags, passed through to the renderer verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printing: Option<Printing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copying: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifying: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotating: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filling_forms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_accessibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_assembly: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Printing {
    HighResolution,
    LowResolution,
}

/// A stored template: the field list plus its document configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub header_config: Option<HeaderConfig>,
    #[serde(default)]
    pub pdf_metadata: Option<PdfMetadata>,
}

impl Template {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The field list, or `MissingTemplate` when there is nothing to lay out.
    pub fn require_fields(&self) -> Result<&[FieldDefinition]> {
        if self.fields.is_empty() {
            let name = self
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());
            return Err(FormpressError::MissingTemplate(name));
        }
        Ok(&self.fields)
    }

    /// Title shown in previews and used for downloaded file names.
    pub fn display_title(&self) -> String {
        display_title(self.header_config.as_ref(), self.title.as_deref())
    }
}

/// `"{code} - {title}"` when the header names both, else the fallback title.
pub fn display_title(header: Option<&HeaderConfig>, fallback: Option<&str>) -> String {
    if let Some(header) = header {
        if let (Some(code), Some(title)) = (
            non_blank(header.document_code.as_deref()),
            non_blank(header.document_title.as_deref()),
        ) {
            return format!("{} - {}", code, title);
        }
    }
    non_blank(fallback)
        .unwrap_or(DEFAULT_REPORT_TITLE)
        .to_string()
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

//! # Formpress
//!
//! A form-to-document assembly engine.
//!
//! A template is a flat list of field definitions. A record is the set of
//! answers submitted against it. Formpress turns the pair into a document
//! description: a renderer-agnostic tree of titled tables, one per section,
//! with a running page header, metadata and optional security settings. A
//! render backend then turns the description into bytes.
//!
//! Building is pure. The same template, record and build options always give
//! the same description, and missing answers are never an error: they render
//! as a placeholder. Only the render adapter touches the outside world.
//!
//! ## Architecture
//!
//! ```text
//! Template + Record (JSON)
//!       ↓
//!   [model]     — Field definitions, records, header/metadata config
//!       ↓
//!   [grouping]  — Sections by title, long/short row groups
//!       ↓
//!   [cell]      — One styled cell per label or answer, via [text]
//!       ↓
//!   [builder]   — Section builders, page header, document assembly
//!       ↓
//!   [description] — The document description
//!       ↓
//!   [render]    — Lazy backend, previews, downloads
//! ```

pub mod builder;
pub mod cell;
pub mod description;
pub mod error;
pub mod grouping;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod render;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use builder::{BuildOptions, DocumentBuilder};
pub use description::DocumentDescription;
pub use error::{FormpressError, Result};
pub use model::{DataRecord, FieldDefinition, FieldKind, HeaderConfig, PdfMetadata, Template};
pub use render::{shared_renderer, PreviewResource, Renderer};

/// Build a document description with default options.
///
/// This is the primary entry point. Fields may arrive in any order; the
/// record may be missing any answer.
pub fn build_description(
    record: &DataRecord,
    fields: &[FieldDefinition],
    header: Option<&HeaderConfig>,
    metadata: Option<&PdfMetadata>,
) -> DocumentDescription {
    DocumentBuilder::default().build(record, fields, header, metadata)
}

/// Build a document description from a template and a record given as JSON.
///
/// Fails when either input does not parse or the template has no fields.
pub fn build_description_json(template_json: &str, record_json: &str) -> Result<DocumentDescription> {
    let template = Template::from_json(template_json)?;
    template.require_fields()?;
    let record = DataRecord::from_json(record_json)?;
    Ok(DocumentBuilder::default().build_template(&template, &record))
}

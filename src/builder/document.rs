use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::{PageHeader, SectionBuilderChain};
use crate::description::{Content, DocumentDescription, DocumentInfo, PageOrientation, PageSize, Security};
use crate::grouping::{group_sections, SectionPolicy};
use crate::image_loader::load_logo;
use crate::model::{
    display_title, non_blank, sorted_by_order, DataRecord, FieldDefinition, HeaderConfig, PdfMetadata, Template,
    DEFAULT_REPORT_TITLE, TITLE_FIELD_ID,
};
use crate::style::{default_style, default_styles, Edges};

/// Record key the build date is stamped under.
pub const GENERATION_DATE_KEY: &str = "generationDate";

const MARGINS: Edges = Edges::new(60.0, 40.0, 60.0, 40.0);
const MARGINS_WITH_HEADER: Edges = Edges::new(120.0, 40.0, 60.0, 40.0);

const DEFAULT_AUTHOR: &str = "formpress";
const DEFAULT_SUBJECT: &str = "Form report";
const DEFAULT_KEYWORDS: &str = "report, form";
const DEFAULT_CREATOR: &str = "formpress";

/// Knobs that are not part of the template.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Build time. `None` means now; fix it for reproducible output.
    pub timestamp: Option<DateTime<Utc>>,
    /// A logo shipped with the application. Wins over the configured one.
    pub bundled_logo: Option<String>,
    /// Write the build date into the record as `generationDate`.
    pub stamp_generation_date: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            timestamp: None,
            bundled_logo: None,
            stamp_generation_date: true,
        }
    }
}

/// Builds the complete document description.
#[derive(Default)]
pub struct DocumentBuilder {
    chain: SectionBuilderChain,
    options: BuildOptions,
}

impl DocumentBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            chain: SectionBuilderChain::default(),
            options,
        }
    }

    pub fn with_chain(mut self, chain: SectionBuilderChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build from a loaded template. The display title follows the
    /// template's naming rules.
    pub fn build_template(&self, template: &Template, record: &DataRecord) -> DocumentDescription {
        let mut doc = self.build(
            record,
            &template.fields,
            template.header_config.as_ref(),
            template.pdf_metadata.as_ref(),
        );
        doc.display_title = template.display_title();
        doc
    }

    pub fn build(
        &self,
        record: &DataRecord,
        fields: &[FieldDefinition],
        header: Option<&HeaderConfig>,
        metadata: Option<&PdfMetadata>,
    ) -> DocumentDescription {
        let started = std::time::Instant::now();
        let now = self.options.timestamp.unwrap_or_else(Utc::now);

        let mut record = record.clone();
        if self.options.stamp_generation_date {
            record.insert(GENERATION_DATE_KEY, Value::String(now.format("%d/%m/%Y").to_string()));
        }

        let sorted = sorted_by_order(fields);
        let sections = group_sections(&sorted, SectionPolicy::Document);

        let mut content: Vec<_> = sections
            .iter()
            .map(|section| self.chain.build(section, &record))
            .collect();

        // The final block must not push a blank page.
        if let Some(last) = content.iter().rposition(|block| !block.is_empty()) {
            let block = std::mem::replace(&mut content[last], Content::empty());
            content[last] = block.with_bottom_margin(0.0);
        }

        let page_header = header.map(|config| PageHeader::new(config.clone(), self.resolve_logo(config)));
        let info = document_info(metadata, header, &record, now);
        let display = display_title(header, Some(info.title.as_str()));

        log::info!(
            "Built document '{}': {} fields, {} sections in {:.1}ms",
            display,
            fields.len(),
            sections.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        DocumentDescription {
            page_size: PageSize::Letter,
            page_orientation: PageOrientation::Portrait,
            page_margins: if page_header.is_some() {
                MARGINS_WITH_HEADER
            } else {
                MARGINS
            },
            header: page_header,
            content,
            styles: default_styles(),
            default_style: default_style(),
            tagged: metadata.and_then(|m| m.tagged).unwrap_or(true),
            security: security(metadata),
            info,
            display_title: display,
        }
    }

    /// Bundled logo first, then the configured one. The first that loads
    /// wins; when none loads the header has no logo.
    fn resolve_logo(&self, config: &HeaderConfig) -> Option<String> {
        let sources = [
            ("bundled", self.options.bundled_logo.as_deref()),
            ("configured", config.logo_base64.as_deref()),
        ];
        sources
            .into_iter()
            .filter_map(|(origin, src)| non_blank(src).map(|src| (origin, src)))
            .find_map(|(origin, src)| match load_logo(src) {
                Ok(logo) => Some(logo.data_uri()),
                Err(e) => {
                    log::warn!("Skipping {} header logo: {}", origin, e);
                    None
                }
            })
    }
}

fn document_info(
    metadata: Option<&PdfMetadata>,
    header: Option<&HeaderConfig>,
    record: &DataRecord,
    now: DateTime<Utc>,
) -> DocumentInfo {
    let title = pick(metadata, |m| m.title.as_deref())
        .or_else(|| header.and_then(|h| non_blank(h.document_title.as_deref())).map(str::to_string))
        .or_else(|| record.text(TITLE_FIELD_ID).filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());

    let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    DocumentInfo {
        title,
        author: pick(metadata, |m| m.author.as_deref()).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        subject: pick(metadata, |m| m.subject.as_deref()).unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        keywords: pick(metadata, |m| m.keywords.as_deref()).unwrap_or_else(|| DEFAULT_KEYWORDS.to_string()),
        creator: pick(metadata, |m| m.creator.as_deref()).unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
        producer: pick(metadata, |m| m.producer.as_deref())
            .unwrap_or_else(|| format!("formpress {}", env!("CARGO_PKG_VERSION"))),
        creation_date: timestamp.clone(),
        modification_date: timestamp,
    }
}

fn pick(metadata: Option<&PdfMetadata>, get: fn(&PdfMetadata) -> Option<&str>) -> Option<String> {
    metadata.and_then(|m| non_blank(get(m))).map(str::to_string)
}

/// Passwords and permissions as given. No security settings at all means an
/// unrestricted document.
fn security(metadata: Option<&PdfMetadata>) -> Option<Security> {
    let m = metadata?;
    if m.user_password.is_none() && m.owner_password.is_none() && m.permissions.is_none() {
        return None;
    }
    Some(Security {
        user_password: m.user_password.clone(),
        owner_password: m.owner_password.clone(),
        permissions: m.permissions.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldKind, Permissions, Printing};
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_options() -> BuildOptions {
        BuildOptions {
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()),
            ..Default::default()
        }
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("notes", "Notes", FieldKind::Textarea)
                .with_order(2)
                .in_section("Details"),
            FieldDefinition::new("name", "Name", FieldKind::Text)
                .with_order(1)
                .in_section("Basics"),
            FieldDefinition::new(TITLE_FIELD_ID, "Title", FieldKind::Text),
        ]
    }

    #[test]
    fn test_sections_in_order_and_last_margin_zeroed() {
        let record = DataRecord::new().with("name", json!("Ana"));
        let doc = DocumentBuilder::new(fixed_options()).build(&record, &fields(), None, None);

        assert_eq!(doc.content.len(), 2);
        assert!(doc.content[0].plain_text().starts_with("Basics"));
        assert!(doc.content[1].plain_text().starts_with("Details"));
        assert_eq!(doc.content[0].margin(), Some(Edges::bottom(15.0)));
        assert_eq!(doc.content[1].margin(), Some(Edges::ZERO));
        assert!(doc.header.is_none());
        assert_eq!(doc.page_margins, MARGINS);
    }

    #[test]
    fn test_trailing_empty_block_is_skipped_for_margin() {
        // Two structured fields in one section leave the standard builder
        // nothing to show.
        let mut fields = fields();
        fields.push(
            FieldDefinition::new("grid", "Grid", FieldKind::RepeatingTable { sub_fields: Vec::new() })
                .with_order(3)
                .in_section("Extra"),
        );
        fields.push(
            FieldDefinition::new("pick", "Pick", FieldKind::MultiChoice { options: Vec::new() })
                .with_order(4)
                .in_section("Extra"),
        );
        let doc = DocumentBuilder::new(fixed_options()).build(&DataRecord::new(), &fields, None, None);
        assert_eq!(doc.content.len(), 3);
        assert!(doc.content[2].is_empty());
        assert_eq!(doc.content[1].margin(), Some(Edges::ZERO));
        assert_eq!(doc.content[0].margin(), Some(Edges::bottom(15.0)));
    }

    #[test]
    fn test_metadata_defaults_and_title_priority() {
        let record = DataRecord::new().with(TITLE_FIELD_ID, json!("Record title"));
        let builder = DocumentBuilder::new(fixed_options());

        let doc = builder.build(&record, &fields(), None, None);
        assert_eq!(doc.info.title, "Record title");
        assert_eq!(doc.info.author, DEFAULT_AUTHOR);
        assert_eq!(doc.info.keywords, DEFAULT_KEYWORDS);
        assert!(doc.info.producer.starts_with("formpress "));
        assert_eq!(doc.info.creation_date, "2024-05-17T09:30:00Z");
        assert!(doc.tagged);
        assert!(doc.security.is_none());

        let header = HeaderConfig {
            document_title: Some("Header title".to_string()),
            ..Default::default()
        };
        assert_eq!(builder.build(&record, &fields(), Some(&header), None).info.title, "Header title");

        let metadata = PdfMetadata {
            title: Some("Meta title".to_string()),
            tagged: Some(false),
            ..Default::default()
        };
        let doc = builder.build(&record, &fields(), Some(&header), Some(&metadata));
        assert_eq!(doc.info.title, "Meta title");
        assert!(!doc.tagged);

        let untitled = builder.build(&DataRecord::new(), &fields(), None, None);
        assert_eq!(untitled.info.title, DEFAULT_REPORT_TITLE);
    }

    #[test]
    fn test_security_passthrough() {
        let metadata = PdfMetadata {
            owner_password: Some("owner".to_string()),
            permissions: Some(Permissions {
                printing: Some(Printing::LowResolution),
                copying: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let doc = DocumentBuilder::new(fixed_options()).build(&DataRecord::new(), &fields(), None, Some(&metadata));
        let security = doc.security.expect("security settings");
        assert_eq!(security.owner_password.as_deref(), Some("owner"));
        assert!(security.user_password.is_none());
        assert_eq!(security.permissions, metadata.permissions);
    }

    #[test]
    fn test_header_margins_and_bad_logo() {
        let header = HeaderConfig {
            document_code: Some("F-1".to_string()),
            logo_base64: Some("definitely not an image".to_string()),
            ..Default::default()
        };
        let doc = DocumentBuilder::new(fixed_options()).build(&DataRecord::new(), &fields(), Some(&header), None);
        assert_eq!(doc.page_margins, MARGINS_WITH_HEADER);
        let page_header = doc.header.as_ref().expect("header");
        assert!(page_header.logo.is_none());
        assert!(doc.page_header(1, 2).is_some());
    }

    /// A solid-color PNG data URI; distinct sizes give distinct URIs.
    fn png_uri(width: u32) -> String {
        use base64::Engine;
        let img = image::RgbImage::from_pixel(width, 1, image::Rgb([0, 128, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(out.into_inner())
        )
    }

    fn logo_of(options: BuildOptions, configured: Option<String>) -> Option<String> {
        let header = HeaderConfig {
            document_code: Some("F-1".to_string()),
            logo_base64: configured,
            ..Default::default()
        };
        DocumentBuilder::new(options)
            .build(&DataRecord::new(), &fields(), Some(&header), None)
            .header
            .and_then(|h| h.logo)
    }

    #[test]
    fn test_configured_logo_reaches_header() {
        let configured = png_uri(2);
        assert_eq!(logo_of(fixed_options(), Some(configured.clone())), Some(configured));
    }

    #[test]
    fn test_bundled_logo_wins_over_configured() {
        let bundled = png_uri(3);
        let options = BuildOptions {
            bundled_logo: Some(bundled.clone()),
            ..fixed_options()
        };
        assert_eq!(logo_of(options, Some(png_uri(2))), Some(bundled));
    }

    #[test]
    fn test_broken_bundled_logo_falls_back_to_configured() {
        let configured = png_uri(2);
        let options = BuildOptions {
            bundled_logo: Some("not an image".to_string()),
            ..fixed_options()
        };
        assert_eq!(logo_of(options, Some(configured.clone())), Some(configured));

        let options = BuildOptions {
            bundled_logo: Some("not an image".to_string()),
            ..fixed_options()
        };
        assert_eq!(logo_of(options, None), None);
    }

    #[test]
    fn test_generation_date_is_stamped() {
        let fields = vec![FieldDefinition::new(GENERATION_DATE_KEY, "Generated", FieldKind::Text)];
        let doc = DocumentBuilder::new(fixed_options()).build(&DataRecord::new(), &fields, None, None);
        assert!(doc.content[0].plain_text().contains("17/05/2024"));

        let unstamped = DocumentBuilder::new(BuildOptions {
            stamp_generation_date: false,
            ..fixed_options()
        })
        .build(&DataRecord::new(), &fields, None, None);
        assert!(!unstamped.content[0].plain_text().contains("17/05/2024"));
    }

    #[test]
    fn test_build_is_repeatable_with_fixed_time() {
        let record = DataRecord::new().with("name", json!("Ana")).with("notes", json!("a\nb"));
        let builder = DocumentBuilder::new(fixed_options());
        assert_eq!(
            builder.build(&record, &fields(), None, None),
            builder.build(&record, &fields(), None, None)
        );
    }
}

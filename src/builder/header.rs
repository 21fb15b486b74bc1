//! The running page header band.
//!
//! ```text
//! ┌────────────────────┬──────────────────────────┬──────────┐
//! │ DOC-CODE           │                          │          │
//! ├──────────┬─────────┤     DOCUMENT TITLE       │   logo   │
//! │ Version  │ Page i  │                          │          │
//! └──────────┴─────────┴──────────────────────────┴──────────┘
//! ```
//!
//! The band depends on the page number, so it is stored as data and rendered
//! per page by [`PageHeader::render`].

use serde::{Deserialize, Serialize};

use crate::description::{spanning_row, Cell, CellBox, ColumnWidth, Content, ImageBlock, Table};
use crate::layout::{center_vertically, TableLayout};
use crate::model::{non_blank, HeaderConfig};
use crate::style::{Edges, StyleName, TextAlign};

/// Where the band sits on the page, inside the top page margin.
pub const HEADER_BAND_MARGIN: Edges = Edges::new(20.0, 40.0, 0.0, 40.0);
/// Box (width, height) the logo is scaled into.
pub const LOGO_FIT: (f64, f64) = (100.0, 60.0);

const LEFT_COLUMN_WIDTH: f64 = 130.0;
const RIGHT_COLUMN_WIDTH: f64 = 110.0;

/// Header band data: the configuration plus the resolved logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageHeader {
    pub config: HeaderConfig,
    /// Logo as a data URI, already validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl PageHeader {
    pub fn new(config: HeaderConfig, logo: Option<String>) -> Self {
        Self { config, logo }
    }

    /// The band for page `current_page` of `page_count`.
    pub fn render(&self, current_page: u32, page_count: u32) -> Content {
        let mut band = Table::new(
            vec![
                ColumnWidth::Fixed(LEFT_COLUMN_WIDTH),
                ColumnWidth::Star,
                ColumnWidth::Fixed(RIGHT_COLUMN_WIDTH),
            ],
            TableLayout::HeaderBand,
        );
        band.body.push(vec![
            Cell::Filled(CellBox::new(center_vertically(self.info_box(current_page, page_count)))),
            Cell::Filled(
                CellBox::new(center_vertically(Content::text(&self.title())))
                    .named(StyleName::PageHeaderTitle),
            ),
            Cell::Filled(CellBox::new(center_vertically(self.logo_content()))),
        ]);
        band.margin = Some(HEADER_BAND_MARGIN);
        Content::Table(band)
    }

    /// The centered title: explicit center text, else the document title,
    /// uppercased.
    pub fn title(&self) -> String {
        non_blank(self.config.center_text.as_deref())
            .or_else(|| non_blank(self.config.document_title.as_deref()))
            .unwrap_or_default()
            .to_uppercase()
    }

    fn info_box(&self, current_page: u32, page_count: u32) -> Content {
        let code = non_blank(self.config.document_code.as_deref()).unwrap_or_default();
        let version = non_blank(self.config.version.as_deref()).unwrap_or("-");

        let mut info = Table::new(vec![ColumnWidth::Star, ColumnWidth::Star], TableLayout::HeaderBand);
        info.body.push(spanning_row(
            CellBox::new(Content::text(code)).named(StyleName::PageHeaderTitle),
            2,
        ));
        info.body.push(vec![
            Cell::text(&format!("Version: {}", version), StyleName::PageHeaderMeta),
            Cell::text(
                &format!("Page {} of {}", current_page, page_count),
                StyleName::PageHeaderMeta,
            ),
        ]);
        Content::Table(info)
    }

    fn logo_content(&self) -> Content {
        match &self.logo {
            Some(src) => Content::Image(ImageBlock {
                src: src.clone(),
                fit: LOGO_FIT,
                alignment: TextAlign::Center,
            }),
            None => Content::text(""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::shim_content;

    fn header() -> PageHeader {
        PageHeader::new(
            HeaderConfig {
                document_code: Some("QA-001".to_string()),
                document_title: Some("Inspection report".to_string()),
                version: Some("3".to_string()),
                ..Default::default()
            },
            Some("data:image/png;base64,AAAA".to_string()),
        )
    }

    fn band_cells(content: &Content) -> Vec<&CellBox> {
        let Content::Table(band) = content else {
            panic!("band must be a table");
        };
        band.body[0].iter().filter_map(Cell::as_filled).collect()
    }

    #[test]
    fn test_band_layout() {
        let band = header().render(2, 5);
        let Content::Table(table) = &band else {
            panic!("band must be a table");
        };
        assert_eq!(
            table.widths,
            vec![ColumnWidth::Fixed(130.0), ColumnWidth::Star, ColumnWidth::Fixed(110.0)]
        );
        assert_eq!(table.layout, TableLayout::HeaderBand);
        assert_eq!(table.margin, Some(HEADER_BAND_MARGIN));
    }

    #[test]
    fn test_band_content_per_page() {
        let band = header().render(2, 5);
        let cells = band_cells(&band);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].content.plain_text(), "QA-001Version: 3Page 2 of 5");
        assert_eq!(cells[1].content.plain_text(), "INSPECTION REPORT");
        assert!(matches!(shim_content(&cells[2].content), Some(Content::Image(img)) if img.fit == LOGO_FIT));

        // Pure: same page, same band.
        assert_eq!(header().render(2, 5), band);
        assert_ne!(header().render(3, 5), band);
    }

    #[test]
    fn test_center_text_overrides_title() {
        let mut h = header();
        h.config.center_text = Some("Confidential".to_string());
        h.logo = None;
        assert_eq!(h.title(), "CONFIDENTIAL");
        let band = h.render(1, 1);
        assert_eq!(band_cells(&band)[2].content.plain_text(), "");
    }
}

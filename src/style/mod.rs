//! # Style System
//!
//! A small, CSS-like style model for the document description. Named styles
//! live once in the document's style table and cells refer to them by
//! [`StyleName`]; inline overrides use the same [`Style`] struct with only the
//! relevant properties set.
//!
//! Every property is optional. A renderer resolves a cell's style by layering
//! the named style under the inline overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Font family registered with the renderer for all text.
pub const DEFAULT_FONT: &str = "Arial";

/// Style properties for a cell, text block or inline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    // ── Typography ─────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<TextDecoration>,
    /// Subscript/superscript shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<VerticalShift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlign>,

    // ── Color & Background ─────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,

    // ── Box Model ──────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    /// Style of the gray italic "no answer" text.
    pub fn placeholder() -> Self {
        Style {
            italics: Some(true),
            color: Some(palette::PLACEHOLDER_TEXT),
            ..Default::default()
        }
    }
}

/// Names of the shared styles in a document's style table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleName {
    Header,
    Label,
    Answer,
    TableHeader,
    SectionHeader,
    DetailedChoiceLabel,
    FieldValue,
    PageHeaderTitle,
    PageHeaderMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDecoration {
    #[default]
    None,
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalShift {
    Sub,
    Sup,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb8(0, 0, 0);
    pub const WHITE: Color = Color::rgb8(255, 255, 255);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: 1.0,
        }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Self::BLACK;
        }
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).unwrap_or(0);
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                (r, g, b)
            }
            _ => (0, 0, 0),
        };
        Self::rgb8(r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Report palette.
pub mod palette {
    use super::Color;

    pub const BORDER: Color = Color::rgb8(0xbf, 0xbf, 0xbf);
    pub const HEADER_BACKGROUND: Color = Color::rgb8(0x59, 0x59, 0x5c);
    pub const HEADER_TEXT: Color = Color::WHITE;
    pub const LABEL_BACKGROUND: Color = Color::rgb8(0xee, 0xee, 0xee);
    pub const LABEL_TEXT: Color = Color::rgb8(0x59, 0x5a, 0x5c);
    pub const PLACEHOLDER_TEXT: Color = Color::rgb8(0x80, 0x80, 0x80);
    pub const LINK: Color = Color::rgb8(0x1a, 0x0d, 0xab);
}

/// Edge values (top, right, bottom, left) in points. Negative values are
/// legal and used to cancel a parent's padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub const ZERO: Edges = Edges::new(0.0, 0.0, 0.0, 0.0);

    /// CSS order: top, right, bottom, left.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn bottom(v: f64) -> Self {
        Self::new(0.0, 0.0, v, 0.0)
    }

    pub fn with_bottom(self, bottom: f64) -> Self {
        Self { bottom, ..self }
    }
}

/// The shared style table every document carries.
pub fn default_styles() -> BTreeMap<StyleName, Style> {
    let label = Style {
        bold: Some(true),
        fill_color: Some(palette::LABEL_BACKGROUND),
        font_size: Some(10.0),
        alignment: Some(TextAlign::Left),
        color: Some(palette::LABEL_TEXT),
        margin: Some(Edges::ZERO),
        ..Default::default()
    };

    let mut styles = BTreeMap::new();
    styles.insert(
        StyleName::Header,
        Style {
            font_size: Some(14.0),
            bold: Some(true),
            alignment: Some(TextAlign::Center),
            margin: Some(Edges::bottom(20.0)),
            ..Default::default()
        },
    );
    styles.insert(
        StyleName::Answer,
        Style {
            font_size: Some(10.0),
            alignment: Some(TextAlign::Justify),
            margin: Some(Edges::ZERO),
            ..Default::default()
        },
    );
    styles.insert(
        StyleName::TableHeader,
        Style {
            alignment: Some(TextAlign::Center),
            ..label.clone()
        },
    );
    styles.insert(
        StyleName::SectionHeader,
        Style {
            bold: Some(true),
            font_size: Some(12.0),
            color: Some(palette::HEADER_TEXT),
            fill_color: Some(palette::HEADER_BACKGROUND),
            alignment: Some(TextAlign::Center),
            margin: Some(Edges::symmetric(4.0, 0.0)),
            ..Default::default()
        },
    );
    styles.insert(
        StyleName::DetailedChoiceLabel,
        Style {
            alignment: Some(TextAlign::Center),
            ..label.clone()
        },
    );
    styles.insert(
        StyleName::FieldValue,
        Style {
            font_size: Some(10.0),
            margin: Some(Edges::bottom(10.0)),
            ..Default::default()
        },
    );
    styles.insert(
        StyleName::PageHeaderTitle,
        Style {
            font_size: Some(11.0),
            bold: Some(true),
            alignment: Some(TextAlign::Center),
            color: Some(palette::LABEL_TEXT),
            ..Default::default()
        },
    );
    styles.insert(
        StyleName::PageHeaderMeta,
        Style {
            font_size: Some(8.0),
            alignment: Some(TextAlign::Center),
            color: Some(palette::LABEL_TEXT),
            ..Default::default()
        },
    );
    styles.insert(StyleName::Label, label);
    styles
}

/// Document-wide defaults every style inherits from.
pub fn default_style() -> Style {
    Style {
        font: Some(DEFAULT_FONT.to_string()),
        ..Default::default()
    }
}

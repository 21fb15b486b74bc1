//! # Font Bundle
//!
//! The fonts a renderer needs, packed into a virtual file system: file name
//! to base64 file contents. Every file is parsed with `ttf-parser` when it is
//! added, so a truncated or mislabeled file fails at startup instead of in
//! the middle of a render.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{FormpressError, Result};
use crate::style::DEFAULT_FONT;

/// The four faces of a font family, by file name in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFamily {
    pub name: String,
    pub normal: String,
    pub bold: String,
    pub italics: String,
    pub bolditalics: String,
}

impl FontFamily {
    /// A family whose files follow the `name.ttf`, `namebd.ttf`,
    /// `namei.ttf`, `namebi.ttf` convention.
    pub fn named(name: &str) -> Self {
        let stem = name.trim().to_lowercase().replace(' ', "");
        Self {
            name: name.trim().to_string(),
            normal: format!("{}.ttf", stem),
            bold: format!("{}bd.ttf", stem),
            italics: format!("{}i.ttf", stem),
            bolditalics: format!("{}bi.ttf", stem),
        }
    }

    pub fn files(&self) -> [&str; 4] {
        [&self.normal, &self.bold, &self.italics, &self.bolditalics]
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        Self::named(DEFAULT_FONT)
    }
}

/// Validated font files keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontBundle {
    vfs: BTreeMap<String, String>,
}

impl FontBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.ttf` and `.otf` file in `dir`. Other files are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut bundle = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            FormpressError::Font(format!("Failed to read font directory '{}': {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry?.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"));
            if !is_font || !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let data = std::fs::read(&path)?;
            bundle.insert(name, &data)?;
            log::debug!("Bundled font {} ({} bytes)", name, data.len());
        }

        log::info!("Loaded {} font files from {}", bundle.len(), dir.display());
        Ok(bundle)
    }

    /// Add one font file after checking that it parses.
    pub fn insert(&mut self, name: &str, data: &[u8]) -> Result<()> {
        ttf_parser::Face::parse(data, 0)
            .map_err(|e| FormpressError::Font(format!("'{}' is not a usable font: {}", name, e)))?;
        self.vfs.insert(
            name.to_string(),
            base64::engine::general_purpose::STANDARD.encode(data),
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vfs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vfs.is_empty()
    }

    pub fn vfs(&self) -> &BTreeMap<String, String> {
        &self.vfs
    }

    /// Fail unless every face of `family` is in the bundle.
    pub fn require_family(&self, family: &FontFamily) -> Result<()> {
        let missing: Vec<&str> = family.files().into_iter().filter(|f| !self.contains(f)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormpressError::Font(format!(
                "Font family '{}' is missing {}",
                family.name,
                missing.join(", ")
            )))
        }
    }
}

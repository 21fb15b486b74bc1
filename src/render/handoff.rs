//! The bundled backend: hands the document to an external PDF renderer.
//!
//! The job is one JSON object holding the document description, the font
//! family table and the font virtual file system.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::fonts::{FontBundle, FontFamily};
use super::{BackendLoader, RenderBackend, RenderConfig};
use crate::description::DocumentDescription;
use crate::error::{FormpressError, Result};

#[derive(Serialize)]
struct RenderJob<'a> {
    document: &'a DocumentDescription,
    fonts: BTreeMap<&'a str, &'a FontFamily>,
    vfs: &'a FontBundle,
}

pub struct HandoffBackend {
    family: FontFamily,
    fonts: FontBundle,
}

impl HandoffBackend {
    pub fn new(family: FontFamily, fonts: FontBundle) -> Self {
        Self { family, fonts }
    }

    pub fn fonts(&self) -> &FontBundle {
        &self.fonts
    }
}

impl RenderBackend for HandoffBackend {
    fn render(&self, doc: &DocumentDescription) -> Result<Vec<u8>> {
        let mut fonts = BTreeMap::new();
        fonts.insert(self.family.name.as_str(), &self.family);
        let job = RenderJob {
            document: doc,
            fonts,
            vfs: &self.fonts,
        };
        serde_json::to_vec(&job).map_err(|e| FormpressError::Render(format!("Failed to serialize render job: {}", e)))
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

/// Loads the font bundle named by a [`RenderConfig`].
pub struct HandoffLoader {
    config: RenderConfig,
}

impl HandoffLoader {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl BackendLoader for HandoffLoader {
    fn load(&self) -> Result<Arc<dyn RenderBackend>> {
        let family = self.config.font_family.clone();
        let fonts = match &self.config.font_dir {
            Some(dir) => {
                let bundle = FontBundle::from_dir(dir).map_err(|e| FormpressError::BackendInit(e.to_string()))?;
                bundle
                    .require_family(&family)
                    .map_err(|e| FormpressError::BackendInit(e.to_string()))?;
                bundle
            }
            None => {
                log::warn!("No font directory configured; the renderer will fall back to its own fonts");
                FontBundle::new()
            }
        };
        Ok(Arc::new(HandoffBackend::new(family, fonts)))
    }
}

//! # Render Adapter
//!
//! Bridges a finished [`DocumentDescription`] to a rendering backend.
//!
//! The backend and its fonts are expensive to set up, so a [`Renderer`]
//! loads them on first use and keeps them for its lifetime. Loading happens
//! under a lock: concurrent first calls wait for one load instead of racing.
//! A failed load leaves nothing cached, so the next call tries again.
//!
//! Previews are tracked until the caller releases them.

pub mod fonts;
mod handoff;

pub use fonts::{FontBundle, FontFamily};
pub use handoff::{HandoffBackend, HandoffLoader};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Instant;

use base64::Engine;

use crate::description::DocumentDescription;
use crate::error::Result;

/// File name used when a title sanitizes to nothing.
pub const DEFAULT_FILENAME: &str = "report";

/// Environment variable naming the font directory.
pub const FONT_DIR_ENV: &str = "FORMPRESS_FONT_DIR";
/// Environment variable naming the font family.
pub const FONT_FAMILY_ENV: &str = "FORMPRESS_FONT_FAMILY";

/// Turns document descriptions into output bytes.
pub trait RenderBackend: Send + Sync {
    fn render(&self, doc: &DocumentDescription) -> Result<Vec<u8>>;

    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &str;

    /// Extension for downloaded files, without the dot.
    fn file_extension(&self) -> &str;
}

/// Creates the backend. Called at most once per successful initialization.
pub trait BackendLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn RenderBackend>>;
}

/// Where the bundled backend finds its fonts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderConfig {
    pub font_dir: Option<PathBuf>,
    pub font_family: FontFamily,
}

impl RenderConfig {
    /// Read `FORMPRESS_FONT_DIR` and `FORMPRESS_FONT_FAMILY`.
    pub fn from_env() -> Self {
        let font_dir = std::env::var_os(FONT_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let font_family = std::env::var(FONT_FAMILY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|name| FontFamily::named(&name))
            .unwrap_or_default();
        Self { font_dir, font_family }
    }
}

/// A rendered document held for display. Hand it back to
/// [`Renderer::release`] when done.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewResource {
    id: u64,
    data_url: String,
    title: String,
}

impl PreviewResource {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `data:<mime>;base64,...`
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

pub struct Renderer<L: BackendLoader> {
    loader: L,
    backend: Mutex<Option<Arc<dyn RenderBackend>>>,
    previews: Mutex<HashSet<u64>>,
    next_preview: AtomicU64,
}

impl<L: BackendLoader> Renderer<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            backend: Mutex::new(None),
            previews: Mutex::new(HashSet::new()),
            next_preview: AtomicU64::new(1),
        }
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.backend).is_some()
    }

    /// The backend, loading it on first use.
    pub fn backend(&self) -> Result<Arc<dyn RenderBackend>> {
        let mut slot = lock(&self.backend);
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }

        let started = Instant::now();
        match self.loader.load() {
            Ok(backend) => {
                log::info!(
                    "Render backend ready in {:.1}ms",
                    started.elapsed().as_secs_f64() * 1000.0
                );
                *slot = Some(Arc::clone(&backend));
                Ok(backend)
            }
            Err(e) => {
                log::error!("Render backend failed to initialize: {}", e);
                Err(e)
            }
        }
    }

    pub fn render(&self, doc: &DocumentDescription) -> Result<Vec<u8>> {
        let backend = self.backend()?;
        let started = Instant::now();
        let bytes = backend.render(doc)?;
        log::info!(
            "Rendered '{}': {} bytes in {:.1}ms",
            doc.display_title,
            bytes.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(bytes)
    }

    /// Render to a data URL for in-app display.
    pub fn preview(&self, doc: &DocumentDescription) -> Result<PreviewResource> {
        let backend = self.backend()?;
        let bytes = self.render(doc)?;
        let data_url = format!(
            "data:{};base64,{}",
            backend.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );

        let id = self.next_preview.fetch_add(1, Ordering::Relaxed);
        lock(&self.previews).insert(id);
        Ok(PreviewResource {
            id,
            data_url,
            title: doc.display_title.clone(),
        })
    }

    /// Release a preview. Returns `false` if it was already released.
    pub fn release(&self, resource: PreviewResource) -> bool {
        lock(&self.previews).remove(&resource.id)
    }

    /// Previews created and not yet released.
    pub fn live_previews(&self) -> usize {
        lock(&self.previews).len()
    }

    /// Render and write `<sanitized title>.<ext>` into `dir`.
    pub fn download(&self, doc: &DocumentDescription, title: &str, dir: &Path) -> Result<PathBuf> {
        let backend = self.backend()?;
        let bytes = self.render(doc)?;
        let path = dir.join(format!("{}.{}", sanitize_filename(title), backend.file_extension()));
        std::fs::write(&path, &bytes)?;
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace characters that are not allowed in file names with `_`. A blank
/// title gives [`DEFAULT_FILENAME`].
pub fn sanitize_filename(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return DEFAULT_FILENAME.to_string();
    }
    title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '"' | '<' | '>' | '|' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// The process-wide renderer, configured from the environment on first use.
pub fn shared_renderer() -> &'static Renderer<HandoffLoader> {
    static SHARED: OnceLock<Renderer<HandoffLoader>> = OnceLock::new();
    SHARED.get_or_init(|| Renderer::new(HandoffLoader::new(RenderConfig::from_env())))
}

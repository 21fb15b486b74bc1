//! # Logo Loading
//!
//! Loads the header logo from a data URI, a file path, or raw base64 and
//! normalizes it to a `data:image/...;base64,` URI the renderer can embed.
//! The image is probed for its format and pixel size without decoding the
//! pixels, so a corrupt logo is rejected here instead of inside the renderer.

use std::io::Cursor;

use base64::Engine;

use crate::error::{FormpressError, Result};

/// A validated logo image.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoImage {
    pub mime_type: &'static str,
    pub width_px: u32,
    pub height_px: u32,
    bytes: Vec<u8>,
}

impl LogoImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Load a logo from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...`
/// - a file path starting with `/`, `./` or `../` (not on wasm)
/// - raw base64 image data
pub fn load_logo(src: &str) -> Result<LogoImage> {
    let bytes = read_source_bytes(src.trim())?;
    decode_logo_bytes(bytes)
}

fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| FormpressError::Image("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma + 1..]);
    }

    // Base64 contains '/', so only explicit path prefixes count as paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src)
                .map_err(|e| FormpressError::Image(format!("Failed to read image file '{}': {}", src, e)));
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(FormpressError::Image(format!(
                "File path images not supported in WASM: '{}'. Use data URIs or base64.",
                src
            )));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| FormpressError::Image(format!("Base64 decode error: {}", e)))
}

fn decode_logo_bytes(bytes: Vec<u8>) -> Result<LogoImage> {
    if bytes.len() < 4 {
        return Err(FormpressError::Image("Image data too short".to_string()));
    }

    let mime_type = if is_jpeg(&bytes) {
        "image/jpeg"
    } else if is_png(&bytes) {
        "image/png"
    } else if is_webp(&bytes) {
        "image/webp"
    } else {
        return Err(FormpressError::Image(
            "Unsupported image format (expected JPEG, PNG or WebP)".to_string(),
        ));
    };

    let (width_px, height_px) = image::io::Reader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| FormpressError::Image(format!("Image format detection error: {}", e)))?
        .into_dimensions()
        .map_err(|e| FormpressError::Image(format!("Failed to read image dimensions: {}", e)))?;

    Ok(LogoImage {
        mime_type,
        width_px,
        height_px,
        bytes,
    })
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

// filepath: src/font.rs
//! Font loading and measurement on top of fontdue.

use std::{fs, path::Path};
use thiserror::Error;

/// Well-known font locations tried when the config names no font.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse font: {0}")]
    Parse(&'static str),
    #[error("no usable font found; set font.path in the config")]
    NoUsableFont,
}

/// A font at a fixed pixel size.
pub struct Font {
    inner: fontdue::Font,
    size: f32,
}

impl Font {
    pub fn from_bytes(data: &[u8], size: f32) -> Result<Self, FontError> {
        let inner = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(FontError::Parse)?;
        Ok(Self { inner, size })
    }

    pub fn load(path: &Path, size: f32) -> Result<Self, FontError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data, size)
    }

    /// Loads the configured font, or the first fallback that exists.
    pub fn load_or_fallback(path: Option<&Path>, size: f32) -> Result<Self, FontError> {
        if let Some(path) = path {
            return Self::load(path, size);
        }
        for candidate in FALLBACK_FONTS {
            let candidate = Path::new(candidate);
            if candidate.exists() {
                return Self::load(candidate, size);
            }
        }
        Err(FontError::NoUsableFont)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Distance from the top of a text cell down to the baseline.
    pub fn ascent(&self) -> i32 {
        self.inner
            .horizontal_line_metrics(self.size)
            .map(|m| m.ascent.ceil() as i32)
            .unwrap_or(self.size as i32)
    }

    /// Height of a text cell.
    pub fn height(&self) -> u32 {
        self.inner
            .horizontal_line_metrics(self.size)
            .map(|m| m.new_line_size.ceil() as u32)
            .unwrap_or(self.size as u32)
    }

    /// Advance width of a whole string, in pixels.
    pub fn measure(&self, text: &str) -> u32 {
        let mut width = 0.0f32;
        for c in text.chars() {
            width += self.inner.metrics(c, self.size).advance_width;
        }
        width.ceil() as u32
    }

    pub(crate) fn rasterize(&self, c: char) -> (fontdue::Metrics, Vec<u8>) {
        self.inner.rasterize(c, self.size)
    }
}

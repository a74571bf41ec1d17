//! Point-true text measurement over a TTF font.
//!
//! Advances come from the font's unscaled design units scaled to the
//! requested point size, so what the layout engine measures is exactly
//! what the PDF backend embeds and draws.

use std::fs;
use std::path::Path;

use ab_glyph::{Font, FontArc};

use crate::error::EtiquetaError;
use crate::layout::TextMetrics;

/// Text measurement backed by a real TTF font.
///
/// Keeps the raw font bytes around so the document sink can embed the
/// same face it was measured with.
pub struct FontMetrics {
    font: FontArc,
    data: Vec<u8>,
}

impl FontMetrics {
    /// Load a TTF font from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EtiquetaError> {
        let path = path.as_ref();
        let data = fs::read(path)
            .map_err(|e| EtiquetaError::Font(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, EtiquetaError> {
        let font = FontArc::try_from_vec(data.clone())
            .map_err(|e| EtiquetaError::Font(format!("invalid font data: {}", e)))?;
        Ok(Self { font, data })
    }

    /// Raw font bytes, for embedding into a document.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn scale(&self, font_size: f64) -> f64 {
        font_size / self.font.units_per_em().unwrap_or(1000.0) as f64
    }
}

impl TextMetrics for FontMetrics {
    fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let glyph = self.font.glyph_id(ch);
        self.font.h_advance_unscaled(glyph) as f64 * self.scale(font_size)
    }

    fn ascent(&self, font_size: f64) -> f64 {
        self.font.ascent_unscaled() as f64 * self.scale(font_size)
    }
}

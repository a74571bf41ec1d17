//! # Label Style Configuration
//!
//! This module defines the geometry and typography of the 58mm × 40mm label.
//!
//! All lengths are in PDF points (1pt = 1/72 inch). Millimetre-denominated
//! constants are converted through [`MM`].
//!
//! ## Layout Regions
//!
//! ```text
//! ┌────────────────────────────┐ ← page top − margin (cursor start)
//! │   ║█║║█║█║║█║║█║█║║█║║█║   │   Code128 symbol
//! │         4600123456789      │   digits caption
//! │                            │   (fixed after-barcode budget)
//! │      COMPANY NAME LLC      │   company line(s)
//! │   Product name, wrapped    │   product line(s), side-padded
//! │      Article: AB-123       │
//! │         Size: M            │   only when non-empty
//! │        Color: red          │   only when non-empty
//! └────────────────────────────┘
//! ```

/// Points per millimetre.
pub const MM: f64 = 72.0 / 25.4;

/// How many physical copies a single counted row produces in bulk mode.
pub const BULK_COPIES_PER_ROW: u32 = 2;

/// Hard cap on the product-name part of a template filename, in characters.
pub const TEMPLATE_NAME_MAX_CHARS: usize = 60;

/// Typography for one text element on the label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub font_size: f64,
    /// Line height (baseline-to-baseline) in points.
    pub leading: f64,
    /// Vertical gap added below the element, in points.
    pub space_after: f64,
    /// Horizontal padding on each side, subtracted from the wrap width.
    pub side_padding: f64,
    /// Hard-split tokens wider than a full line instead of overflowing.
    pub split_long_words: bool,
}

impl TextStyle {
    const fn new(font_size: f64, leading_factor: f64) -> Self {
        Self {
            font_size,
            leading: font_size * leading_factor,
            space_after: 0.0,
            side_padding: 0.0,
            split_long_words: false,
        }
    }
}

/// # Label Style Configuration
///
/// The complete constant set consumed by the layout engine. One built-in
/// profile exists ([`StyleConfig::COMPACT_58X40`]); the label size is not
/// configurable beyond it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleConfig {
    /// Page width in points (58mm).
    pub page_width: f64,
    /// Page height in points (40mm).
    pub page_height: f64,
    /// Distance from the page edge to the start of content.
    pub margin: f64,

    /// Height of the barcode bars.
    pub barcode_height: f64,
    /// Width of a single barcode module (narrow bar).
    pub barcode_bar_width: f64,
    /// Font size of the digits caption under the barcode.
    pub barcode_text_size: f64,
    /// Distance from the cursor down to the bottom edge of the bars.
    pub barcode_top_margin: f64,
    /// Distance from the bars down to the caption baseline.
    pub barcode_text_offset: f64,
    /// Fixed cursor drop charged for the whole barcode block.
    ///
    /// This is a budget, not a measurement: the cursor moves by this
    /// constant whether or not the caption actually fills it.
    pub after_barcode_space: f64,

    /// Company (issuer) line.
    pub company: TextStyle,
    /// Product name paragraph.
    pub product: TextStyle,
    /// Article line.
    pub article: TextStyle,
    /// Size / color lines.
    pub extra: TextStyle,
}

impl StyleConfig {
    /// The 58mm × 40mm thermal label used for product stickers.
    pub const COMPACT_58X40: Self = Self {
        page_width: 58.0 * MM,
        page_height: 40.0 * MM,
        margin: 0.2 * MM,

        barcode_height: 8.3 * MM,
        barcode_bar_width: 0.75,
        barcode_text_size: 9.0,
        barcode_top_margin: 12.0 * MM,
        barcode_text_offset: 4.0 * MM,
        after_barcode_space: 17.0 * MM,

        company: TextStyle {
            space_after: 1.0,
            ..TextStyle::new(8.2, 1.2)
        },
        product: TextStyle {
            side_padding: 5.0 * MM,
            split_long_words: true,
            ..TextStyle::new(7.4, 1.3)
        },
        article: TextStyle {
            space_after: 0.5 * MM,
            ..TextStyle::new(7.5, 1.1)
        },
        extra: TextStyle::new(8.0, 1.1),
    };
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::COMPACT_58X40
    }
}

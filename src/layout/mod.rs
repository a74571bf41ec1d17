//! # Label Layout Engine
//!
//! Turns one [`LabelGroup`] into an ordered sequence of positioned
//! [`DrawOp`]s on the fixed 58mm × 40mm canvas.
//!
//! Layout is a single forward pass over a descending vertical cursor:
//! first the barcode block (bars plus digits caption, charged at a fixed
//! vertical budget), then the text elements (issuer, product name,
//! article, optional size and color), each wrapped against the page
//! width, measured, horizontally centered and placed at the cursor.
//!
//! Text advances are measured; the barcode advance is the
//! `after_barcode_space` constant regardless of what the block actually
//! occupies. Elements past the page bottom draw off-canvas; the page
//! clips them silently.
//!
//! The engine is pure: identical `(group, issuer, style)` inputs produce
//! identical ops, which the golden-style tests rely on.

pub mod paragraph;
pub mod symbol;

pub use paragraph::{wrap_text, TextMetrics, WrappedText};

use serde::Serialize;

use crate::aggregate::LabelGroup;
use crate::error::EtiquetaError;
use crate::style::StyleConfig;

/// Barcode value that stands for "no barcode"; such groups get no symbol.
pub const BARCODE_PLACEHOLDER: &str = "N/A";

/// One positioned line of text. `x` is the left edge of the line,
/// `baseline` the y coordinate text is drawn at (page origin bottom-left).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: f64,
    pub baseline: f64,
}

/// A centered Code128 symbol with its digits caption.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeOp {
    /// Module pattern, `true` = bar.
    pub modules: Vec<bool>,
    /// Left edge of the symbol.
    pub x: f64,
    /// Bottom edge of the bars.
    pub y: f64,
    /// Width of one module.
    pub bar_width: f64,
    /// Height of the bars.
    pub height: f64,
    /// The literal barcode digits drawn under the bars.
    pub caption: PlacedLine,
    /// Font size of the caption.
    pub caption_size: f64,
}

/// A wrapped, centered text element.
///
/// `x`/`width` describe the element box (widest line); every line inside
/// is centered on the page individually.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlockOp {
    pub x: f64,
    /// Top edge of the element, the cursor position at placement.
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub lines: Vec<PlacedLine>,
}

/// An abstract positioned drawing instruction, consumed by a rendering
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Barcode(BarcodeOp),
    TextBlock(TextBlockOp),
}

/// Lay out one label instance.
///
/// The cursor starts at `page_height − margin`. The barcode stage is
/// skipped when the trimmed barcode is empty or the [`BARCODE_PLACEHOLDER`];
/// an element that wraps to zero lines emits no op but still spends its
/// `space_after`.
pub fn layout_label(
    group: &LabelGroup,
    issuer: &str,
    style: &StyleConfig,
    metrics: &dyn TextMetrics,
) -> Result<Vec<DrawOp>, EtiquetaError> {
    let mut ops = Vec::new();
    let mut cursor = style.page_height - style.margin;

    let barcode = group.barcode.trim();
    if !barcode.is_empty() && barcode != BARCODE_PLACEHOLDER {
        let modules = symbol::code128_modules(barcode)?;
        let symbol_width = modules.len() as f64 * style.barcode_bar_width;
        let caption_width = metrics.text_width(barcode, style.barcode_text_size);

        ops.push(DrawOp::Barcode(BarcodeOp {
            x: (style.page_width - symbol_width) / 2.0,
            y: cursor - style.barcode_top_margin,
            bar_width: style.barcode_bar_width,
            height: style.barcode_height,
            caption: PlacedLine {
                text: barcode.to_string(),
                x: (style.page_width - caption_width) / 2.0,
                baseline: cursor - style.barcode_top_margin - style.barcode_text_offset,
            },
            caption_size: style.barcode_text_size,
            modules,
        }));

        // Fixed budget for the whole block, not a measurement.
        cursor -= style.after_barcode_space;
    }

    let mut elements = vec![
        (issuer.to_string(), style.company),
        (group.name.clone(), style.product),
        (format!("Article: {}", group.article), style.article),
    ];
    if !group.size.is_empty() {
        elements.push((format!("Size: {}", group.size), style.extra));
    }
    if !group.color.is_empty() {
        elements.push((format!("Color: {}", group.color), style.extra));
    }

    for (text, text_style) in elements {
        let wrap_width = style.page_width - 2.0 * text_style.side_padding;
        let wrapped = wrap_text(&text, &text_style, wrap_width, metrics);

        if !wrapped.lines.is_empty() {
            let ascent = metrics.ascent(text_style.font_size);
            let lines = wrapped
                .lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    let line_width = metrics.text_width(line, text_style.font_size);
                    PlacedLine {
                        text: line.clone(),
                        x: (style.page_width - line_width) / 2.0,
                        baseline: cursor - ascent - i as f64 * text_style.leading,
                    }
                })
                .collect();

            ops.push(DrawOp::TextBlock(TextBlockOp {
                x: (style.page_width - wrapped.width) / 2.0,
                top: cursor,
                width: wrapped.width,
                height: wrapped.height,
                font_size: text_style.font_size,
                lines,
            }));
        }

        cursor -= wrapped.height + text_style.space_after;
    }

    Ok(ops)
}

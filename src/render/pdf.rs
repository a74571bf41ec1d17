//! PDF document sink.
//!
//! Realizes [`DrawOp`] sequences as fixed-size PDF pages via printpdf.
//! Bars are filled rectangles (adjacent modules merged into one rect per
//! run); text goes through `use_text` with the embedded measuring font.

use std::io::{BufWriter, Cursor};

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb,
};

use crate::error::EtiquetaError;
use crate::layout::{BarcodeOp, DrawOp, TextBlockOp};
use crate::style::{StyleConfig, MM};

use super::font::FontMetrics;

/// Points to millimetres, the unit printpdf positions in.
const PT_TO_MM: f64 = 1.0 / MM;

/// Layout coordinates are f64 points; printpdf positions in f32 mm.
fn mm(pt: f64) -> Mm {
    Mm((pt * PT_TO_MM) as f32)
}

/// A document sink: one sequence of draw ops per page, finished document
/// bytes out.
///
/// The production implementation is [`PdfWriter`]; tests substitute
/// byte-counting stubs.
pub trait PageWriter {
    fn write_document(&self, pages: &[Vec<DrawOp>]) -> Result<Vec<u8>, EtiquetaError>;
}

/// The printpdf-backed [`PageWriter`].
pub struct PdfWriter<'a> {
    font: &'a FontMetrics,
    page_width: f64,
    page_height: f64,
}

impl<'a> PdfWriter<'a> {
    pub fn new(font: &'a FontMetrics, style: &StyleConfig) -> Self {
        Self {
            font,
            page_width: style.page_width,
            page_height: style.page_height,
        }
    }
}

impl PageWriter for PdfWriter<'_> {
    fn write_document(&self, pages: &[Vec<DrawOp>]) -> Result<Vec<u8>, EtiquetaError> {
        let width = mm(self.page_width);
        let height = mm(self.page_height);
        let (doc, first_page, first_layer) =
            PdfDocument::new("labels", width, height, "Layer 1");

        let font = doc
            .add_external_font(Cursor::new(self.font.data()))
            .map_err(|e| EtiquetaError::Pdf(format!("cannot embed font: {}", e)))?;

        for (i, ops) in pages.iter().enumerate() {
            let layer = if i == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(width, height, "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
            for op in ops {
                match op {
                    DrawOp::Barcode(bar) => draw_barcode(&layer, &font, bar),
                    DrawOp::TextBlock(block) => draw_text_block(&layer, &font, block),
                }
            }
        }

        let mut buf = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut buf));
            doc.save(&mut writer)
                .map_err(|e| EtiquetaError::Pdf(format!("cannot save document: {}", e)))?;
        }
        Ok(buf)
    }
}

/// Merge a module pattern into `(start, len)` runs of consecutive bars.
fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &bar) in modules.iter().enumerate() {
        match (bar, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}

fn filled_rect(x: f64, y: f64, w: f64, h: f64) -> Polygon {
    let points = vec![
        (Point::new(mm(x), mm(y)), false),
        (Point::new(mm(x + w), mm(y)), false),
        (Point::new(mm(x + w), mm(y + h)), false),
        (Point::new(mm(x), mm(y + h)), false),
    ];

    Polygon {
        rings: vec![points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

fn draw_barcode(layer: &PdfLayerReference, font: &IndirectFontRef, op: &BarcodeOp) {
    for (start, len) in bar_runs(&op.modules) {
        let x = op.x + start as f64 * op.bar_width;
        let w = len as f64 * op.bar_width;
        layer.add_polygon(filled_rect(x, op.y, w, op.height));
    }

    layer.use_text(
        op.caption.text.as_str(),
        op.caption_size as f32,
        mm(op.caption.x),
        mm(op.caption.baseline),
        font,
    );
}

fn draw_text_block(layer: &PdfLayerReference, font: &IndirectFontRef, op: &TextBlockOp) {
    for line in &op.lines {
        layer.use_text(
            line.text.as_str(),
            op.font_size as f32,
            mm(line.x),
            mm(line.baseline),
            font,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bar_runs_merge_adjacent_modules() {
        let modules = [true, true, false, true, false, false, true, true, true];
        assert_eq!(bar_runs(&modules), vec![(0, 2), (3, 1), (6, 3)]);
    }

    #[test]
    fn test_bar_runs_empty_and_all_spaces() {
        assert!(bar_runs(&[]).is_empty());
        assert!(bar_runs(&[false, false]).is_empty());
    }

    #[test]
    fn test_bar_runs_single_run() {
        assert_eq!(bar_runs(&[true, true, true]), vec![(0, 3)]);
    }

    #[test]
    fn test_runs_cover_exactly_the_bars() {
        let modules = [true, false, true, true, false, true];
        let total: usize = bar_runs(&modules).iter().map(|&(_, len)| len).sum();
        assert_eq!(total, modules.iter().filter(|&&m| m).count());
    }
}

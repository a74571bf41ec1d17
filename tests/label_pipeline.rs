//! End-to-end pipeline tests: raw records through aggregation, layout and
//! output assembly, with a fixed-advance metrics stub standing in for a
//! real font.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use etiqueta::aggregate::{aggregate, apply_edits, finalize, GroupEdit, PrintMode, RoleMapping};
use etiqueta::layout::{layout_label, DrawOp, TextMetrics};
use etiqueta::output::{render_bulk, render_templates, template_filename};
use etiqueta::render::PageWriter;
use etiqueta::style::StyleConfig;
use etiqueta::tabular::RawRecord;
use etiqueta::EtiquetaError;

/// Every character advances by half the font size.
struct HalfEmMetrics;

impl TextMetrics for HalfEmMetrics {
    fn char_width(&self, _ch: char, font_size: f64) -> f64 {
        font_size * 0.5
    }

    fn ascent(&self, font_size: f64) -> f64 {
        font_size * 0.8
    }
}

/// Emits one byte per page so tests can count pages in the result.
struct CountingWriter;

impl PageWriter for CountingWriter {
    fn write_document(&self, pages: &[Vec<DrawOp>]) -> Result<Vec<u8>, EtiquetaError> {
        Ok(vec![0x2a; pages.len()])
    }
}

fn record(article: &str, barcode: &str, color: &str, size: &str) -> RawRecord {
    [
        ("Article", article),
        ("Barcode", barcode),
        ("Color", color),
        ("Size", size),
        ("Name", "Cotton shirt"),
    ]
    .into_iter()
    .collect()
}

/// Four rows: three sharing one key (one of them a case variant), one other.
fn sample_records() -> Vec<RawRecord> {
    vec![
        record("A1", "111", "red", ""),
        record("A1", "111", "red", ""),
        record("A2", "222", "blue", "M"),
        record("A1", "111", "RED", ""),
    ]
}

fn roles() -> RoleMapping {
    RoleMapping {
        barcode: "Barcode".to_string(),
        product_name: "Name".to_string(),
        article: "Article".to_string(),
        size: Some("Size".to_string()),
        color: None,
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "etiqueta-pipeline-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn bulk_pipeline_doubles_counts_and_emits_a_page_per_copy() {
    let groups = finalize(
        aggregate(&sample_records(), &roles(), PrintMode::Bulk),
        PrintMode::Bulk,
    );

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].barcode, "111");
    assert_eq!(groups[0].quantity, 6);
    assert_eq!(groups[1].barcode, "222");
    assert_eq!(groups[1].quantity, 2);

    let style = StyleConfig::default();
    let bytes = render_bulk(&groups, "Issuer", &style, &HalfEmMetrics, &CountingWriter).unwrap();
    assert_eq!(bytes.len(), 8);
}

#[test]
fn quantity_override_and_zero_drop_apply_in_bulk_only() {
    let mut grouped = aggregate(&sample_records(), &roles(), PrintMode::Bulk);
    apply_edits(
        &mut grouped,
        &[GroupEdit {
            quantity: Some(0),
            ..Default::default()
        }],
    );
    let bulk = finalize(grouped, PrintMode::Bulk);
    assert_eq!(bulk.len(), 1);
    assert_eq!(bulk[0].barcode, "222");

    let mut grouped = aggregate(&sample_records(), &roles(), PrintMode::Template);
    apply_edits(
        &mut grouped,
        &[GroupEdit {
            quantity: Some(0),
            ..Default::default()
        }],
    );
    let template = finalize(grouped, PrintMode::Template);
    assert_eq!(template.len(), 2);
    assert!(template.iter().all(|g| g.quantity == 1));
}

#[test]
fn template_pipeline_is_idempotent_across_runs() {
    let dir = temp_dir("idempotent");
    let groups = finalize(
        aggregate(&sample_records(), &roles(), PrintMode::Template),
        PrintMode::Template,
    );
    assert!(groups.iter().all(|g| g.quantity == 1));

    let style = StyleConfig::default();
    let first = render_templates(
        &groups,
        "Issuer",
        &style,
        &HalfEmMetrics,
        &CountingWriter,
        &dir,
    )
    .unwrap();
    assert_eq!((first.created, first.skipped), (2, 0));

    let before: Vec<Vec<u8>> = groups
        .iter()
        .map(|g| fs::read(dir.join(template_filename(g))).unwrap())
        .collect();

    let second = render_templates(
        &groups,
        "Issuer",
        &style,
        &HalfEmMetrics,
        &CountingWriter,
        &dir,
    )
    .unwrap();
    assert_eq!((second.created, second.skipped), (0, 2));

    for (group, old) in groups.iter().zip(&before) {
        assert_eq!(&fs::read(dir.join(template_filename(group))).unwrap(), old);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn laid_out_labels_are_centered_and_flow_downward() {
    let style = StyleConfig::default();
    let groups = finalize(
        aggregate(&sample_records(), &roles(), PrintMode::Bulk),
        PrintMode::Bulk,
    );

    for group in &groups {
        let ops = layout_label(group, "MEDICAL SUPPLIES LLC", &style, &HalfEmMetrics).unwrap();

        let mut last_top = f64::INFINITY;
        for op in &ops {
            if let DrawOp::TextBlock(block) = op {
                let center = block.x + block.width / 2.0;
                assert!((center - style.page_width / 2.0).abs() < 1e-9);
                assert!(block.top < last_top);
                last_top = block.top;
            }
        }
    }
}

#[test]
fn layout_is_reproducible_for_identical_inputs() {
    let style = StyleConfig::default();
    let groups = finalize(
        aggregate(&sample_records(), &roles(), PrintMode::Bulk),
        PrintMode::Bulk,
    );

    let first = layout_label(&groups[0], "Issuer", &style, &HalfEmMetrics).unwrap();
    let second = layout_label(&groups[0], "Issuer", &style, &HalfEmMetrics).unwrap();
    assert_eq!(first, second);
}

//! # Output Assembly
//!
//! Drives the layout engine once per label instance and realizes the
//! result through a [`PageWriter`].
//!
//! Two modes share the engine:
//!
//! - [`render_bulk`] emits one consolidated document, one page per label
//!   copy, in aggregation order. All pages share one output stream, so
//!   any failure aborts the whole document.
//! - [`render_templates`] writes one standalone file per group. Existing
//!   files are never overwritten; a group that fails to render or write
//!   is logged and counted in neither counter, and the loop moves on.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::LabelGroup;
use crate::error::EtiquetaError;
use crate::layout::{layout_label, TextMetrics, BARCODE_PLACEHOLDER};
use crate::render::PageWriter;
use crate::style::{StyleConfig, TEMPLATE_NAME_MAX_CHARS};

/// Result summary of a template generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateReport {
    pub created: usize,
    pub skipped: usize,
    pub output_dir: PathBuf,
}

/// Lay out and assemble the consolidated bulk document.
///
/// Each of a group's `quantity` pages is laid out independently from the
/// same group data; quantity is a repetition count, not a batching
/// optimization.
pub fn render_bulk(
    groups: &[LabelGroup],
    issuer: &str,
    style: &StyleConfig,
    metrics: &dyn TextMetrics,
    writer: &dyn PageWriter,
) -> Result<Vec<u8>, EtiquetaError> {
    let mut pages = Vec::new();
    for group in groups {
        for _ in 0..group.quantity {
            pages.push(layout_label(group, issuer, style, metrics)?);
        }
    }
    writer.write_document(&pages)
}

/// Filename of a group's template: `"{barcode} {name}.pdf"`.
///
/// The name part is cut to [`TEMPLATE_NAME_MAX_CHARS`] characters with
/// path separators replaced by dashes; a group without a barcode files
/// under the placeholder, and one without a name under `unnamed`.
pub fn template_filename(group: &LabelGroup) -> String {
    let barcode = group.barcode.trim();
    let barcode = if barcode.is_empty() {
        BARCODE_PLACEHOLDER
    } else {
        barcode
    };

    let name: String = group.name.chars().take(TEMPLATE_NAME_MAX_CHARS).collect();
    let name = name.replace(['/', '\\'], "-");
    let name = name.trim();
    let name = if name.is_empty() { "unnamed" } else { name };

    format!("{} {}.pdf", barcode, name)
}

/// Write one standalone document per group into `out_dir`.
///
/// Re-running over the same input never overwrites prior output: files
/// that already exist are skipped, and the actual write is
/// create-exclusive so a lost race to a concurrent writer also counts as
/// skipped rather than clobbering.
pub fn render_templates(
    groups: &[LabelGroup],
    issuer: &str,
    style: &StyleConfig,
    metrics: &dyn TextMetrics,
    writer: &dyn PageWriter,
    out_dir: &Path,
) -> Result<TemplateReport, EtiquetaError> {
    fs::create_dir_all(out_dir)?;

    let mut created = 0;
    let mut skipped = 0;

    for group in groups {
        let filename = template_filename(group);
        let path = out_dir.join(&filename);

        if path.exists() {
            skipped += 1;
            continue;
        }

        let document = match layout_label(group, issuer, style, metrics)
            .and_then(|page| writer.write_document(&[page]))
        {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("[templates] failed to render {}: {}", filename, e);
                continue;
            }
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => match file.write_all(&document) {
                Ok(()) => created += 1,
                Err(e) => eprintln!("[templates] failed to write {}: {}", filename, e),
            },
            Err(e) if e.kind() == ErrorKind::AlreadyExists => skipped += 1,
            Err(e) => eprintln!("[templates] failed to create {}: {}", filename, e),
        }
    }

    Ok(TemplateReport {
        created,
        skipped,
        output_dir: out_dir.to_path_buf(),
    })
}

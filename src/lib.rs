//! # Etiqueta - Product Label Generator
//!
//! Etiqueta turns tabular product records (barcode, name, article, color,
//! size) into printable 58mm × 40mm label PDFs. It provides:
//!
//! - **Aggregation**: deduplication of raw rows into unique label groups
//!   with per-group copy counts
//! - **Layout**: barcode plus wrapped, measured text blocks flowed down a
//!   fixed-size canvas
//! - **Output**: one consolidated multi-page document for bulk printing,
//!   or one no-clobber file per variant for template archiving
//! - **Server**: an HTTP wizard that walks a spreadsheet upload through
//!   column mapping to generation
//!
//! ## Quick Start
//!
//! ```no_run
//! use etiqueta::aggregate::{aggregate, finalize, PrintMode, RoleMapping};
//! use etiqueta::output::render_bulk;
//! use etiqueta::render::{FontMetrics, PdfWriter};
//! use etiqueta::style::StyleConfig;
//! use etiqueta::tabular::RawRecord;
//!
//! # fn main() -> Result<(), etiqueta::EtiquetaError> {
//! let records: Vec<RawRecord> = vec![
//!     [
//!         ("Barcode", "4600123456789"),
//!         ("Name", "Cotton shirt"),
//!         ("Article", "AB-123"),
//!     ]
//!     .into_iter()
//!     .collect(),
//! ];
//!
//! let roles = RoleMapping {
//!     barcode: "Barcode".to_string(),
//!     product_name: "Name".to_string(),
//!     article: "Article".to_string(),
//!     size: None,
//!     color: None,
//! };
//!
//! // Two labels per counted row in bulk mode
//! let groups = finalize(aggregate(&records, &roles, PrintMode::Bulk), PrintMode::Bulk);
//!
//! let style = StyleConfig::default();
//! let font = FontMetrics::from_file("arial.ttf")?;
//! let writer = PdfWriter::new(&font, &style);
//! let pdf = render_bulk(&groups, "MEDICAL SUPPLIES LLC", &style, &font, &writer)?;
//! std::fs::write("labels.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tabular`] | Row records from an uploaded cell grid |
//! | [`aggregate`] | Grouping, quantity policy, user edits |
//! | [`layout`] | The label composition engine |
//! | [`render`] | Font metrics and the PDF sink |
//! | [`output`] | Bulk and template assembly |
//! | [`issuer`] | The persisted legal-entity store |
//! | [`session`] | Wizard session state |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod aggregate;
pub mod error;
pub mod issuer;
pub mod layout;
pub mod output;
pub mod render;
pub mod server;
pub mod session;
pub mod style;
pub mod tabular;

// Re-exports for convenience
pub use error::EtiquetaError;
pub use style::StyleConfig;

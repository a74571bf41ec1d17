//! # Etiqueta CLI
//!
//! Command-line interface for product label generation.
//!
//! ## Usage
//!
//! ```bash
//! # One consolidated multi-page PDF, two labels per row
//! etiqueta generate --input records.json --mode bulk --out labels.pdf
//!
//! # One PDF per unique variant, never overwriting existing files
//! etiqueta generate --input records.json --mode template --out-dir patterns
//!
//! # Custom column mapping and issuer
//! etiqueta generate --input records.json \
//!     --barcode-column "Баркод" --name-column "Наименование" \
//!     --article-column "Артикул" --size-column "Размер" \
//!     --issuer "ACME Ltd"
//!
//! # Run the wizard server
//! etiqueta serve --listen 0.0.0.0:8080 --font arial.ttf
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use etiqueta::{
    aggregate::{aggregate, finalize, PrintMode, RoleMapping},
    issuer::IssuerStore,
    output::{render_bulk, render_templates},
    render::{FontMetrics, PdfWriter},
    server::{serve, ServerConfig},
    style::StyleConfig,
    tabular::{cell_to_string, RawRecord},
    EtiquetaError,
};

/// Etiqueta - Product label PDF generator
#[derive(Parser, Debug)]
#[command(name = "etiqueta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// One multi-page document, two labels per counted row
    Bulk,
    /// One file per unique variant
    Template,
}

impl From<ModeArg> for PrintMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Bulk => PrintMode::Bulk,
            ModeArg::Template => PrintMode::Template,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate label PDFs from a JSON records file
    Generate {
        /// JSON file holding an array of records (objects of column → value)
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Print mode
        #[arg(long, value_enum, default_value = "bulk")]
        mode: ModeArg,

        /// Column holding the barcode
        #[arg(long, default_value = "Barcode")]
        barcode_column: String,

        /// Column holding the product name
        #[arg(long, default_value = "Name")]
        name_column: String,

        /// Column holding the article
        #[arg(long, default_value = "Article")]
        article_column: String,

        /// Column holding the size (omit to skip the size line)
        #[arg(long)]
        size_column: Option<String>,

        /// Column holding the color (defaults to a column named "Color")
        #[arg(long)]
        color_column: Option<String>,

        /// TTF font used for measurement and embedding
        #[arg(long, default_value = "arial.ttf")]
        font: PathBuf,

        /// Issuer name printed as the company line (defaults to the store's
        /// current entity)
        #[arg(long)]
        issuer: Option<String>,

        /// Directory holding the issuer store
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Output file for bulk mode
        #[arg(long, default_value = "labels.pdf")]
        out: PathBuf,

        /// Output directory for template mode (defaults to
        /// <data-dir>/patterns)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Run the label wizard HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// TTF font used for measurement and embedding
        #[arg(long, default_value = "arial.ttf")]
        font: PathBuf,

        /// Directory holding the issuer store and template output
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), EtiquetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            mode,
            barcode_column,
            name_column,
            article_column,
            size_column,
            color_column,
            font,
            issuer,
            data_dir,
            out,
            out_dir,
        } => {
            let records = read_records(&input)?;
            let roles = RoleMapping {
                barcode: barcode_column,
                product_name: name_column,
                article: article_column,
                size: size_column,
                color: color_column,
            };

            let mode = PrintMode::from(mode);
            let groups = finalize(aggregate(&records, &roles, mode), mode);
            if groups.is_empty() {
                return Err(EtiquetaError::Validation(
                    "no printable groups in the input".to_string(),
                ));
            }

            let issuer = match issuer {
                Some(name) => name,
                None => IssuerStore::load(&data_dir).current,
            };

            let style = StyleConfig::default();
            let font = FontMetrics::from_file(&font)?;
            let writer = PdfWriter::new(&font, &style);

            match mode {
                PrintMode::Bulk => {
                    let total: u32 = groups.iter().map(|g| g.quantity).sum();
                    println!(
                        "[bulk] {} labels across {} unique products ({} orders)",
                        total,
                        groups.len(),
                        total / 2
                    );

                    let bytes = render_bulk(&groups, &issuer, &style, &font, &writer)?;
                    std::fs::write(&out, bytes)?;
                    println!("Saved to {}", out.display());
                }
                PrintMode::Template => {
                    let out_dir = out_dir.unwrap_or_else(|| data_dir.join("patterns"));
                    let report =
                        render_templates(&groups, &issuer, &style, &font, &writer, &out_dir)?;
                    println!(
                        "[templates] created {}, skipped {} ({})",
                        report.created,
                        report.skipped,
                        report.output_dir.display()
                    );
                }
            }

            Ok(())
        }

        Commands::Serve {
            listen,
            font,
            data_dir,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                font_path: font,
                data_dir,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(config))
        }
    }
}

/// Read an array of records from a JSON file, flattening scalar cell
/// values to strings the same way the upload path does.
fn read_records(path: &PathBuf) -> Result<Vec<RawRecord>, EtiquetaError> {
    let text = std::fs::read_to_string(path)?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&text)
        .map_err(|e| {
            EtiquetaError::Validation(format!("cannot parse {}: {}", path.display(), e))
        })?;

    Ok(rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(column, value)| (column.clone(), cell_to_string(value)))
                .collect()
        })
        .collect())
}

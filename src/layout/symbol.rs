//! Code128 symbol geometry.
//!
//! Uses the barcoders crate to turn a barcode string into the module
//! pattern the renderer draws as bars.

use barcoders::sym::code128::Code128;

use crate::error::EtiquetaError;

/// Encode data as a Code128 module pattern.
/// Returns a Vec<bool> where true = bar (black), false = space (white).
///
/// Code128 requires a character set prefix; we use Set B as it supports
/// the widest range of printable characters, which covers the article
/// numbers and EAN digit strings product barcodes carry.
pub fn code128_modules(data: &str) -> Result<Vec<bool>, EtiquetaError> {
    let prefixed = format!("\u{0181}{}", data);

    let symbol = Code128::new(&prefixed)
        .map_err(|e| EtiquetaError::Barcode(format!("cannot encode {:?}: {}", data, e)))?;

    Ok(symbol.encode().iter().map(|&module| module == 1).collect())
}

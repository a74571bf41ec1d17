//! Paragraph wrapping and measurement.
//!
//! The layout engine never talks to a font directly; it measures text
//! through the [`TextMetrics`] seam and wraps it here. Wrapping is greedy
//! word wrap with two extensions the product-name element needs:
//!
//! - CJK characters are breakable on their own, so ideographic names wrap
//!   without spaces.
//! - Tokens wider than a whole line are hard-split by character when the
//!   style asks for it; otherwise they overflow their line.

use crate::style::TextStyle;

/// Horizontal text measurement for a single font.
///
/// Implemented by the renderer's real font metrics and by fixed-advance
/// stubs in tests. Advances are in points for the given point size.
pub trait TextMetrics {
    /// Horizontal advance of one character.
    fn char_width(&self, ch: char, font_size: f64) -> f64;

    /// Distance from the baseline up to the top of the line box.
    fn ascent(&self, font_size: f64) -> f64;

    /// Width of a whole string (no kerning).
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}

/// A measured, wrapped paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    /// Width of the widest line, in points.
    pub width: f64,
    /// `lines × leading`, in points.
    pub height: f64,
}

/// Does this character wrap on its own, CJK-style?
fn is_cjk(ch: char) -> bool {
    matches!(ch,
        '\u{3000}'..='\u{303F}'   // CJK punctuation
        | '\u{3040}'..='\u{30FF}' // kana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified
        | '\u{F900}'..='\u{FAFF}' // compatibility ideographs
        | '\u{FF00}'..='\u{FFEF}' // full-width forms
    )
}

/// Break text into wrap units: whitespace-separated words, with each CJK
/// character standing alone. Whitespace runs collapse to single breaks.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
        } else if is_cjk(ch) {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(ch.to_string());
        } else {
            word.push(ch);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

/// Split one over-wide token into chunks that each fit `max_width`.
fn split_token(
    token: &str,
    font_size: f64,
    max_width: f64,
    metrics: &dyn TextMetrics,
) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0.0;

    for ch in token.chars() {
        let advance = metrics.char_width(ch, font_size);
        if !chunk.is_empty() && chunk_width + advance > max_width {
            chunks.push(std::mem::take(&mut chunk));
            chunk_width = 0.0;
        }
        chunk.push(ch);
        chunk_width += advance;
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

/// Wrap `text` against `max_width` under `style` and measure the result.
///
/// Empty input produces zero lines and zero height, so optional elements
/// cost no vertical space. Lines never carry trailing spaces; a joining
/// space between two CJK tokens is omitted.
pub fn wrap_text(
    text: &str,
    style: &TextStyle,
    max_width: f64,
    metrics: &dyn TextMetrics,
) -> WrappedText {
    let size = style.font_size;
    let space = metrics.char_width(' ', size);

    let mut tokens = tokenize(text);
    if style.split_long_words {
        tokens = tokens
            .into_iter()
            .flat_map(|t| {
                if metrics.text_width(&t, size) > max_width {
                    split_token(&t, size, max_width, metrics)
                } else {
                    vec![t]
                }
            })
            .collect();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;
    let mut line_ends_cjk = false;

    for token in tokens {
        let token_width = metrics.text_width(&token, size);
        let token_is_cjk = token.chars().next().is_some_and(is_cjk);
        let joiner = if line.is_empty() || (line_ends_cjk && token_is_cjk) {
            0.0
        } else {
            space
        };

        if !line.is_empty() && line_width + joiner + token_width > max_width {
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if !line.is_empty() && joiner > 0.0 {
            line.push(' ');
            line_width += space;
        }
        line_width += token_width;
        line_ends_cjk = token.chars().last().is_some_and(is_cjk);
        line.push_str(&token);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    let width = lines
        .iter()
        .map(|l| metrics.text_width(l, size))
        .fold(0.0, f64::max);
    let height = lines.len() as f64 * style.leading;

    WrappedText {
        lines,
        width,
        height,
    }
}

#[cfg(test)]
pub(crate) mod test_metrics {
    use super::TextMetrics;

    /// Every character advances by half the font size. Deterministic and
    /// font-free; close enough to real proportions for layout tests.
    pub struct FixedMetrics;

    impl TextMetrics for FixedMetrics {
        fn char_width(&self, _ch: char, font_size: f64) -> f64 {
            font_size * 0.5
        }

        fn ascent(&self, font_size: f64) -> f64 {
            font_size * 0.8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_metrics::FixedMetrics;
    use super::*;
    use pretty_assertions::assert_eq;

    fn style(font_size: f64) -> TextStyle {
        TextStyle {
            font_size,
            leading: font_size * 1.2,
            space_after: 0.0,
            side_padding: 0.0,
            split_long_words: false,
        }
    }

    #[test]
    fn test_short_text_single_line() {
        let wrapped = wrap_text("hello world", &style(10.0), 200.0, &FixedMetrics);
        assert_eq!(wrapped.lines, vec!["hello world"]);
        // 11 chars × 5pt
        assert_eq!(wrapped.width, 55.0);
        assert_eq!(wrapped.height, 12.0);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // Each char is 5pt; "aaaa bbbb" is 45pt, limit 30pt.
        let wrapped = wrap_text("aaaa bbbb", &style(10.0), 30.0, &FixedMetrics);
        assert_eq!(wrapped.lines, vec!["aaaa", "bbbb"]);
        assert_eq!(wrapped.height, 24.0);
    }

    #[test]
    fn test_empty_text_costs_nothing() {
        let wrapped = wrap_text("", &style(10.0), 100.0, &FixedMetrics);
        assert!(wrapped.lines.is_empty());
        assert_eq!(wrapped.width, 0.0);
        assert_eq!(wrapped.height, 0.0);
    }

    #[test]
    fn test_whitespace_collapses() {
        let wrapped = wrap_text("  a   b  ", &style(10.0), 100.0, &FixedMetrics);
        assert_eq!(wrapped.lines, vec!["a b"]);
    }

    #[test]
    fn test_long_word_overflows_without_split() {
        let wrapped = wrap_text("abcdefghij", &style(10.0), 30.0, &FixedMetrics);
        assert_eq!(wrapped.lines.len(), 1);
        // Overflow is reported honestly: 50pt against a 30pt limit.
        assert_eq!(wrapped.width, 50.0);
    }

    #[test]
    fn test_long_word_splits_when_asked() {
        let mut st = style(10.0);
        st.split_long_words = true;
        let wrapped = wrap_text("abcdefghij", &st, 30.0, &FixedMetrics);
        // 6 chars fit per 30pt line.
        assert_eq!(wrapped.lines, vec!["abcdef", "ghij"]);
        assert!(wrapped.width <= 30.0);
    }

    #[test]
    fn test_cjk_breaks_without_spaces() {
        // Five ideographs at 5pt each against a 12pt limit: two per line.
        let wrapped = wrap_text("棉质短袖衫", &style(10.0), 12.0, &FixedMetrics);
        assert_eq!(wrapped.lines, vec!["棉质", "短袖", "衫"]);
    }

    #[test]
    fn test_mixed_latin_cjk() {
        let wrapped = wrap_text("shirt 棉质", &style(10.0), 100.0, &FixedMetrics);
        // One space joins the scripts; the ideographs rejoin seamlessly.
        assert_eq!(wrapped.lines, vec!["shirt 棉质"]);
    }

    #[test]
    fn test_more_lines_for_smaller_width() {
        // The coupling the layout engine depends on: narrower wrap width
        // (side padding) means more lines means more height.
        let wide = wrap_text("aa bb cc dd", &style(10.0), 100.0, &FixedMetrics);
        let narrow = wrap_text("aa bb cc dd", &style(10.0), 12.0, &FixedMetrics);
        assert!(narrow.lines.len() > wide.lines.len());
        assert!(narrow.height > wide.height);
    }
}

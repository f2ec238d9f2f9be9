//! Hex digits rendered into the project ID text block layout.
//!
//! Digit lines are `use` lines of glyph cells named `alpha_<D>`, tagged with
//! an `alphaX_` instance marker. The first digit line receives the least
//! significant nibble of the value.

use std::collections::HashSet;

use regex::Regex;

use crate::error::PatchError;
use crate::value::IdValue;

/// Marker identifying a digit line.
pub const DIGIT_MARKER: &str = "alphaX_";

/// Library path token that must follow the first use of each glyph.
pub const GLYPH_LIBRARY: &str = "hexdigits";

/// Output of [`render_digits`].
#[derive(Debug, Clone)]
pub struct TextBlockPatch {
    pub content: String,
    /// Digit lines rewritten, at most the width in hex digits.
    pub digits: usize,
    /// Digit lines found in total.
    pub found: usize,
}

impl TextBlockPatch {
    pub fn is_complete(&self, value: &IdValue) -> bool {
        self.digits == value.width().hex_digits() && self.found == self.digits
    }
}

/// Write the hex digits of `value` into the glyph lines of the text block.
///
/// Only the case of no digit line at all is an error; callers decide what
/// to do with a partial result.
pub fn render_digits(content: &str, value: &IdValue) -> Result<TextBlockPatch, PatchError> {
    let glyph = Regex::new(r"alpha_[0-9A-F]")?;
    let hex: Vec<char> = value.to_hex().chars().collect();
    let expected = hex.len();

    let mut seen = HashSet::new();
    let mut digits = 0usize;
    let mut found = 0usize;
    let mut out = String::with_capacity(content.len() + 64);

    for line in content.lines() {
        if line.contains(DIGIT_MARKER) {
            found += 1;
            if digits < expected {
                let dchar = hex[expected - 1 - digits];
                let mut new_line = glyph
                    .replace_all(line, format!("alpha_{dchar}").as_str())
                    .into_owned();
                if seen.insert(dchar) && !new_line.contains(GLYPH_LIBRARY) {
                    new_line.push(' ');
                    new_line.push_str(GLYPH_LIBRARY);
                }
                out.push_str(&new_line);
                digits += 1;
            } else {
                log::warn!("extra digit line passed through: {line}");
                out.push_str(line);
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    if digits == 0 {
        return Err(PatchError::NoDigits);
    }
    Ok(TextBlockPatch {
        content: out,
        digits,
        found,
    })
}

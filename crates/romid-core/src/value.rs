use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Width of an ID ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BitWidth {
    Bits8,
    Bits32,
}

impl BitWidth {
    pub fn bits(self) -> usize {
        match self {
            BitWidth::Bits8 => 8,
            BitWidth::Bits32 => 32,
        }
    }

    /// Number of hex digits in the canonical rendering.
    pub fn hex_digits(self) -> usize {
        self.bits() / 4
    }

    pub fn max_value(self) -> u32 {
        match self {
            BitWidth::Bits8 => u8::MAX as u32,
            BitWidth::Bits32 => u32::MAX,
        }
    }

    /// Verilog sized-literal prefix, e.g. `8'h`.
    pub fn verilog_prefix(self) -> String {
        format!("{}'h", self.bits())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValueError {
    #[error("Cannot parse \"{text}\" as a {digits}-digit hex number")]
    NotHex { text: String, digits: usize },

    #[error("Value {text} does not fit in {bits} bits")]
    TooWide { text: String, bits: usize },
}

/// An identifier value of fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdValue {
    value: u32,
    width: BitWidth,
}

impl IdValue {
    pub fn new(value: u32, width: BitWidth) -> Result<Self, ValueError> {
        if value > width.max_value() {
            return Err(ValueError::TooWide {
                text: format!("{value:X}"),
                bits: width.bits(),
            });
        }
        Ok(Self { value, width })
    }

    pub fn zero(width: BitWidth) -> Self {
        Self { value: 0, width }
    }

    /// Parse a hex string, with or without a `0x` prefix.
    pub fn parse_hex(text: &str, width: BitWidth) -> Result<Self, ValueError> {
        let not_hex = || ValueError::NotHex {
            text: text.to_string(),
            digits: width.hex_digits(),
        };
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(not_hex());
        }
        // Leading zeros beyond the width are harmless.
        let significant = digits.trim_start_matches('0');
        if significant.len() > width.hex_digits() {
            return Err(ValueError::TooWide {
                text: digits.to_string(),
                bits: width.bits(),
            });
        }
        let value = if significant.is_empty() {
            0
        } else {
            u32::from_str_radix(significant, 16).map_err(|_| not_hex())?
        };
        Self::new(value, width)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn width(&self) -> BitWidth {
        self.width
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn bit(&self, index: usize) -> bool {
        index < self.width.bits() && (self.value >> index) & 1 == 1
    }

    /// Indices of the set bits, LSB first.
    pub fn set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.width.bits()).filter(move |&i| self.bit(i))
    }

    /// Zero-padded uppercase hex, MSB first.
    pub fn to_hex(&self) -> String {
        format!("{:0width$X}", self.value, width = self.width.hex_digits())
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

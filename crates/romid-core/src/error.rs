use thiserror::Error;

/// A text rewrite that could not find what it was looking for.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatchError {
    #[error("via not found for bit position(s) {}", join_bits(.bits))]
    ViasNotFound { bits: Vec<usize> },

    #[error("No substitutions done on {0}")]
    NoSubstitutions(String),

    #[error("No digits were replaced in the layout")]
    NoDigits,

    #[error("Invalid match pattern: {0}")]
    InvalidPattern(String),
}

impl From<regex::Error> for PatchError {
    fn from(e: regex::Error) -> Self {
        PatchError::InvalidPattern(e.to_string())
    }
}

fn join_bits(bits: &[usize]) -> String {
    bits.iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

//! Polarity flips in the gate-level netlist of an ID ROM.
//!
//! Each ROM bit is driven by a tie cell with `high[i]` and `low[i]`
//! outputs. Programming a bit swaps the two nets and turns the
//! `LO(<signal>[i]` pin connection into `HI(<signal>[i]`.

use regex::{Captures, Regex};

use crate::error::PatchError;
use crate::rom::RomSpec;
use crate::value::IdValue;

/// Output of [`flip_polarity`].
#[derive(Debug, Clone)]
pub struct NetlistPatch {
    pub content: String,
    /// Number of tokens rewritten by the per-bit pass.
    pub tokens: usize,
}

fn token_regex(rom: &RomSpec) -> Result<Regex, PatchError> {
    let pattern = format!(
        r"(?P<net>high|low)\[(?P<net_bit>\d+)\]|LO\({}\[(?P<pin_bit>\d+)\]",
        regex::escape(rom.signal)
    );
    Ok(Regex::new(&pattern)?)
}

/// Rewrite the netlist for every set bit of `value` in a single pass,
/// then flip the shared low-tie marker.
pub fn flip_polarity(content: &str, rom: &RomSpec, value: &IdValue) -> Result<NetlistPatch, PatchError> {
    if value.set_bits().next().is_none() {
        return Err(PatchError::NoSubstitutions(format!(
            "{} gate-level netlist",
            rom.cell
        )));
    }

    let re = token_regex(rom)?;
    let programmed = |digits: &str| digits.parse::<usize>().map(|b| value.bit(b)).unwrap_or(false);
    let mut tokens = 0usize;

    let swapped = re.replace_all(content, |caps: &Captures| {
        if let Some(net) = caps.name("net") {
            let bit = &caps["net_bit"];
            if programmed(bit) {
                tokens += 1;
                let other = if net.as_str() == "high" { "low" } else { "high" };
                return format!("{other}[{bit}]");
            }
        } else if let Some(bit) = caps.name("pin_bit") {
            if programmed(bit.as_str()) {
                tokens += 1;
                return format!("HI({}[{}]", rom.signal, bit.as_str());
            }
        }
        caps[0].to_string()
    });

    let from = format!("HI({}", rom.low_marker);
    let to = format!("LO({}", rom.low_marker);
    let content = swapped.replace(&from, &to);

    log::info!("{}: {} netlist token(s) rewritten", rom.cell, tokens);
    Ok(NetlistPatch { content, tokens })
}

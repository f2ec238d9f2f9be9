//! Via programming on the `.mag` text of an ID ROM cell.
//!
//! The layout is never parsed: each programmed bit is a literal
//! `rect x1 y1 x2 y2` line that is swapped for its shifted counterpart.

use crate::error::PatchError;
use crate::geometry::ViaPlacement;
use crate::rom::RomSpec;
use crate::value::IdValue;

/// One via that was moved to its one-position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViaMove {
    pub bit: usize,
    pub placement: ViaPlacement,
}

/// Result of programming the vias of a layout.
#[derive(Debug, Clone)]
pub struct LayoutPatch {
    pub content: String,
    pub moves: Vec<ViaMove>,
}

/// Move the via of every set bit in `value` from its zero- to its
/// one-position.
///
/// Every set bit is checked even after a failure so the error names all
/// missing vias; on error nothing is returned to write.
pub fn program_vias(content: &str, rom: &RomSpec, value: &IdValue) -> Result<LayoutPatch, PatchError> {
    let mut patched = content.to_string();
    let mut moves = Vec::new();
    let mut missing = Vec::new();

    for bit in value.set_bits() {
        let Some(placement) = rom.placement(bit) else {
            missing.push(bit);
            continue;
        };
        let old = placement.zero.to_string();
        let new = placement.one.to_string();
        if patched.contains(&old) {
            patched = patched.replacen(&old, &new, 1);
            moves.push(ViaMove { bit, placement });
        } else {
            log::debug!("bit {bit}: \"{old}\" not present in {}", rom.cell);
            missing.push(bit);
        }
    }

    if !missing.is_empty() {
        return Err(PatchError::ViasNotFound { bits: missing });
    }

    log::info!("{}: moved {} via(s)", rom.cell, moves.len());
    Ok(LayoutPatch {
        content: patched,
        moves,
    })
}

/// Read the programmed value back out of a layout: a bit is one when its
/// via sits at the one-position.
pub fn decode_vias(content: &str, rom: &RomSpec) -> IdValue {
    let value = rom
        .placements()
        .filter(|(_, p)| content.contains(&p.one.to_string()))
        .fold(0u32, |acc, (bit, _)| acc | (1 << bit));
    // A RomSpec table never has more entries than its width.
    IdValue::new(value, rom.width).unwrap_or_else(|_| IdValue::zero(rom.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom::{PRODUCT_ID_ROM, PROJECT_ID_ROM};
    use crate::value::BitWidth;

    /// A zero-state `.mag` body with one via per bit.
    fn zero_layout(rom: &RomSpec) -> String {
        let mut mag = String::from("magic\ntech sky130A\nmagscale 1 2\n<< viali >>\n");
        for (_, p) in rom.placements() {
            mag.push_str(&p.zero.to_string());
            mag.push('\n');
        }
        mag.push_str("<< end >>\n");
        mag
    }

    #[test]
    fn test_program_product_id_three() {
        let mag = zero_layout(&PRODUCT_ID_ROM);
        let value = IdValue::parse_hex("3", BitWidth::Bits8).unwrap();
        let patch = program_vias(&mag, &PRODUCT_ID_ROM, &value).unwrap();

        assert_eq!(patch.moves.len(), 2);
        assert!(patch.content.contains("rect 419 765 453 799\n"));
        assert!(!patch.content.contains("rect 557 765 591 799\n"));
        // Bit 2 untouched.
        assert!(patch.content.contains("rect 1109 765 1143 799\n"));
    }

    #[test]
    fn test_missing_vias_are_all_reported() {
        let mag = zero_layout(&PRODUCT_ID_ROM)
            .replace("rect 557 765 591 799\n", "")
            .replace("rect 2673 765 2707 799\n", "");
        let value = IdValue::parse_hex("81", BitWidth::Bits8).unwrap();
        let err = program_vias(&mag, &PRODUCT_ID_ROM, &value).unwrap_err();
        assert_eq!(err, PatchError::ViasNotFound { bits: vec![0, 7] });
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let mag = "rect 557 765 591 799\nrect 557 765 591 799\n";
        let value = IdValue::parse_hex("01", BitWidth::Bits8).unwrap();
        let patch = program_vias(mag, &PRODUCT_ID_ROM, &value).unwrap();
        assert_eq!(patch.content, "rect 419 765 453 799\nrect 557 765 591 799\n");
    }

    #[test]
    fn test_decode_recovers_programmed_value() {
        for (rom, text) in [
            (PRODUCT_ID_ROM, "A5"),
            (PRODUCT_ID_ROM, "FF"),
            (PROJECT_ID_ROM, "DEADBEEF"),
            (PROJECT_ID_ROM, "00000001"),
        ] {
            let value = IdValue::parse_hex(text, rom.width).unwrap();
            let patch = program_vias(&zero_layout(&rom), &rom, &value).unwrap();
            assert_eq!(decode_vias(&patch.content, &rom), value);
        }
        assert!(decode_vias(&zero_layout(&PROJECT_ID_ROM), &PROJECT_ID_ROM).is_zero());
    }
}

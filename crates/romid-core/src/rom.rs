use serde::Serialize;

use crate::geometry::{Point, Via, ViaPlacement};
use crate::value::BitWidth;

/// Static description of one mask-programmed ID ROM cell and the
/// project files that carry its value.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RomSpec {
    /// Layout / gate-level cell name, e.g. `product_id_rom_8bit`.
    pub cell: &'static str,
    /// Output bus name in the gate-level netlist and `info.yaml` key.
    pub signal: &'static str,
    /// Human-readable name used in messages ("product ID").
    pub label: &'static str,
    /// RTL parameter carrying the value in the top-level verilog.
    pub parameter: &'static str,
    pub width: BitWidth,
    /// Zero-position via center for each bit, LSB first.
    pub bit_coords: &'static [Point],
    /// Escaped netlist name of the tie cell feeding the unprogrammed bits.
    pub low_marker: &'static str,
    /// Layout cell holding the rendered hex digits, if the ROM has one.
    pub text_block: Option<&'static str>,
}

impl RomSpec {
    pub fn bit_count(&self) -> usize {
        self.bit_coords.len()
    }

    /// Via placements of one bit, or `None` past the end of the table.
    pub fn placement(&self, bit: usize) -> Option<ViaPlacement> {
        self.bit_coords.get(bit).map(|p| Via::new(*p).placements())
    }

    /// Placements for every bit of the ROM, LSB first.
    pub fn placements(&self) -> impl Iterator<Item = (usize, ViaPlacement)> + '_ {
        self.bit_coords
            .iter()
            .enumerate()
            .map(|(bit, p)| (bit, Via::new(*p).placements()))
    }
}

const ROW_LOW: f64 = 3.910;
const ROW_HIGH: f64 = 9.430;

const PRODUCT_ID_COORDS: [Point; 8] = [
    Point::new(2.870, ROW_LOW),
    Point::new(4.250, ROW_LOW),
    Point::new(5.630, ROW_LOW),
    Point::new(7.010, ROW_LOW),
    Point::new(8.390, ROW_LOW),
    Point::new(9.770, ROW_LOW),
    Point::new(12.070, ROW_LOW),
    Point::new(13.450, ROW_LOW),
];

// Even bits sit on the lower row, odd bits directly above them.
const PROJECT_ID_COORDS: [Point; 32] = [
    Point::new(2.870, ROW_LOW),
    Point::new(2.870, ROW_HIGH),
    Point::new(4.250, ROW_LOW),
    Point::new(4.250, ROW_HIGH),
    Point::new(5.630, ROW_LOW),
    Point::new(5.630, ROW_HIGH),
    Point::new(7.010, ROW_LOW),
    Point::new(7.010, ROW_HIGH),
    Point::new(8.390, ROW_LOW),
    Point::new(8.390, ROW_HIGH),
    Point::new(9.770, ROW_LOW),
    Point::new(9.770, ROW_HIGH),
    Point::new(12.070, ROW_LOW),
    Point::new(12.070, ROW_HIGH),
    Point::new(13.450, ROW_LOW),
    Point::new(13.450, ROW_HIGH),
    Point::new(14.830, ROW_LOW),
    Point::new(14.830, ROW_HIGH),
    Point::new(16.670, ROW_LOW),
    Point::new(16.670, ROW_HIGH),
    Point::new(18.050, ROW_LOW),
    Point::new(18.050, ROW_HIGH),
    Point::new(19.430, ROW_LOW),
    Point::new(19.430, ROW_HIGH),
    Point::new(20.810, ROW_LOW),
    Point::new(20.810, ROW_HIGH),
    Point::new(22.190, ROW_LOW),
    Point::new(22.190, ROW_HIGH),
    Point::new(24.030, ROW_LOW),
    Point::new(24.030, ROW_HIGH),
    Point::new(25.410, ROW_LOW),
    Point::new(25.410, ROW_HIGH),
];

/// The 8-bit product ID ROM.
pub const PRODUCT_ID_ROM: RomSpec = RomSpec {
    cell: "product_id_rom_8bit",
    signal: "product_id",
    label: "product ID",
    parameter: "PRODUCT_ID",
    width: BitWidth::Bits8,
    bit_coords: &PRODUCT_ID_COORDS,
    low_marker: "\\prod_id_low",
    text_block: None,
};

/// The 32-bit project ID ROM.
pub const PROJECT_ID_ROM: RomSpec = RomSpec {
    cell: "project_id_rom_32bit",
    signal: "project_id",
    label: "project ID",
    parameter: "PROJECT_ID",
    width: BitWidth::Bits32,
    bit_coords: &PROJECT_ID_COORDS,
    low_marker: "\\proj_id_low",
    text_block: Some("project_id_textblock"),
};

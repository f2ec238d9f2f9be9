use std::fmt;

use serde::{Deserialize, Serialize};

/// Magic internal units per micron for the sky130 ID ROM cells.
pub const INTERNAL_UNITS_PER_UM: f64 = 200.0;

/// Side length of a via contact (microns).
pub const VIA_SIZE_UM: f64 = 0.17;

/// Distance a via moves to the left when its bit is programmed to one.
pub const ONE_SHIFT_UM: f64 = 0.69;

/// A 2D point in layout coordinates (microns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// An axis-aligned bounding box in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            min: self.min.translate(dx, dy),
            max: self.max.translate(dx, dy),
        }
    }

    /// Snap the corners onto the internal unit grid.
    pub fn to_internal(&self) -> MagRect {
        MagRect {
            x1: to_internal_units(self.min.x),
            y1: to_internal_units(self.min.y),
            x2: to_internal_units(self.max.x),
            y2: to_internal_units(self.max.y),
        }
    }
}

/// Convert microns to integer internal units, rounding half to even.
pub fn to_internal_units(um: f64) -> i64 {
    (um * INTERNAL_UNITS_PER_UM).round_ties_even() as i64
}

/// A rectangle in Magic internal units, as written in a `.mag` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MagRect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl MagRect {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl fmt::Display for MagRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rect {} {} {} {}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// A square via contact centered on a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub position: Point,
    pub size: f64,
}

impl Via {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            size: VIA_SIZE_UM,
        }
    }

    pub fn bbox(&self) -> BBox {
        let half = self.size / 2.0;
        BBox::new(
            Point::new(self.position.x - half, self.position.y - half),
            Point::new(self.position.x + half, self.position.y + half),
        )
    }

    /// Both placements of this via: where it sits for a zero bit, and where
    /// it sits once the bit is programmed to one.
    pub fn placements(&self) -> ViaPlacement {
        let zero = self.bbox();
        let one = zero.translate(-ONE_SHIFT_UM, 0.0);
        ViaPlacement {
            zero_um: zero,
            zero: zero.to_internal(),
            one: one.to_internal(),
        }
    }
}

/// Zero- and one-position rectangles of a single ROM bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViaPlacement {
    /// Zero-position corners before grid snapping, for diagnostics.
    pub zero_um: BBox,
    pub zero: MagRect,
    pub one: MagRect,
}

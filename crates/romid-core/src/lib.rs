//! # romid core
//!
//! Model of the mask-programmed ID ROMs of the Panamax padframe: via
//! geometry in microns and Magic internal units, the per-bit coordinate
//! tables of the 8-bit product ID and 32-bit project ID cells, identifier
//! values, and the text rewrites that program a value into the layout,
//! RTL, gate-level netlist and text block.
//!
//! Nothing in this crate touches the filesystem.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod netlist;
pub mod rom;
pub mod rtl;
pub mod textblock;
pub mod value;

pub use error::PatchError;
pub use geometry::{MagRect, Point, Via, ViaPlacement};
pub use rom::{RomSpec, PRODUCT_ID_ROM, PROJECT_ID_ROM};
pub use value::{BitWidth, IdValue, ValueError};

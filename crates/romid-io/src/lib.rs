//! # romid I/O
//!
//! Filesystem side of ID ROM programming: the fixed layout of a Panamax
//! project directory, the `info.yaml` scan, identifier resolution, the
//! zero-state layout backup, and the ordered patch steps that rewrite the
//! layout, RTL, netlist and text block files.

pub mod backup;
pub mod error;
pub mod project;
pub mod resolve;
pub mod steps;

pub use backup::LayoutFiles;
pub use error::RomIdError;
pub use project::ProjectPaths;
pub use resolve::{resolve_value, IdSource, Resolved, Target};
pub use steps::{PatchContext, PatchPlan, PatchStep, StepEvent, StepOutcome};

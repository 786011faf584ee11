//! Region catalog module
//!
//! Static region definitions, the label containment hierarchy and
//! mask colorization.

pub mod catalog;
pub mod colorize;
pub mod hierarchy;
pub mod types;

pub use catalog::RegionCatalog;
pub use colorize::{LabelRaster, colorize};
pub use hierarchy::is_subregion;
pub use types::{Color, Label, RegionDefinition, RegionError};

//! Layout calculation modules
//!
//! This module handles all the geometric and ordering calculations:
//! - Cell sequence (which source page goes into which cell, copies included)
//! - Grid geometry (sheet size, cell bounds, padding)
//! - Content placement (uniform scaling, centring, rotation)

mod grid;
mod placement;
mod sequence;
mod types;

pub use grid::*;
pub use placement::*;
pub use sequence::*;
pub use types::*;

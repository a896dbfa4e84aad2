//! Threshold estimation algorithms.

pub mod gpd;
pub mod spot;

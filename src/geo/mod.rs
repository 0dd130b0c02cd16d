//! Geo module - region boundaries, projection and polygon filling

mod asset;
mod projection;
mod tessellate;

pub use asset::GeometryAsset;
pub use projection::{Bounds, ScreenFit};

#[cfg(test)]
pub(crate) use asset::tests as fixtures;

//! Utility functions shared by the detectors
//!
//! - Geometry (pixel rounding, distances)

/// Pixel rounding and distances
pub mod geometry;

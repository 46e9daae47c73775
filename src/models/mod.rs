//! Core data structures shared by the detectors

/// Packed single scan line
pub mod bit_row;
/// Packed black/white image
pub mod matrix;
/// Finder patterns and odd/even pairs
pub mod pattern;
/// Points and four-point regions
pub mod point;

pub use bit_row::BitRow;
pub use matrix::BitMatrix;
pub use pattern::{FINDER_PATTERN_COUNT, FINDER_PATTERN_MODULES, FinderPair, FinderPattern};
pub use point::{Point, Quad};

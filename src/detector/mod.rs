//! Symbol geometry detection
//!
//! This module contains the searches that bound a symbol before sampling:
//! - Rectangle location around a dark region (2D symbols)
//! - Run-length finder pattern matching on a scan line
//! - Pairing of odd/even finder patterns for stacked symbols

/// Environment-driven tunables
pub mod config;
/// Odd/even finder pairing with forward-only retries
pub mod pairing;
/// Seed-and-grow rectangle location
pub mod rectangle;
/// Finder candidates from run lengths and the reference table
pub mod run_length;

pub use config::ScanConfig;
pub use pairing::{PairAssembler, PairState, RowPairs, find_next_pair, scan_matrix, scan_rows};
pub use rectangle::{RectangleLocator, locate_rectangle};

//! RustLocator - symbol geometry localization for barcode readers
//!
//! Finds where a symbol sits in a binarized image before any decoding:
//! the bounding quadrilateral of a 2D symbol, and the odd/even finder
//! pattern pairs that synchronize a stacked linear symbol.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Symbol geometry detection (rectangle location, finder matching, pairing)
pub mod detector;
/// The single `NotFound` error kind
pub mod error;
/// Minimal stderr logger for the `log` facade
pub mod logger;
/// Core data structures (BitMatrix, BitRow, Point, FinderPattern, etc.)
pub mod models;
/// Helpers for the command-line tool and benchmarks
pub mod tools;
/// Utility functions (rounding, distances)
pub mod utils;

pub use detector::{PairAssembler, PairState, RectangleLocator, RowPairs, ScanConfig};
pub use error::{LocateError, LocateResult};
pub use models::{BitMatrix, BitRow, FinderPair, FinderPattern, Point, Quad};

/// Luma values below this are dark
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Locate the symbol rectangle in a grayscale image
///
/// # Arguments
/// * `image` - Grayscale bytes (1 byte per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// The four extreme points of the dark region around the image centre
pub fn locate_from_grayscale(image: &[u8], width: usize, height: usize) -> LocateResult<Quad> {
    let matrix = BitMatrix::from_luma(image, width, height, DEFAULT_THRESHOLD);
    detector::locate_rectangle(&matrix)
}

/// Find finder pairs on every configured row of a grayscale image
///
/// Rows are scanned in parallel; only rows holding at least one pair are
/// returned, ordered by row.
pub fn pairs_from_grayscale(image: &[u8], width: usize, height: usize) -> Vec<RowPairs> {
    let matrix = BitMatrix::from_luma(image, width, height, DEFAULT_THRESHOLD);
    detector::scan_matrix(&matrix, &ScanConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_from_grayscale() {
        let (width, height) = (80, 60);
        let mut image = vec![255u8; width * height];
        for y in 20..40 {
            for x in 25..55 {
                image[y * width + x] = 0;
            }
        }

        let quad = locate_from_grayscale(&image, width, height).unwrap();
        assert_eq!(quad.top(), Point::new(26.0, 21.0));
        assert_eq!(quad.bottom(), Point::new(53.0, 38.0));
    }

    #[test]
    fn test_blank_grayscale() {
        let image = vec![255u8; 40 * 40];
        assert_eq!(locate_from_grayscale(&image, 40, 40), Err(LocateError::NotFound));
        assert!(pairs_from_grayscale(&image, 40, 40).is_empty());
    }
}

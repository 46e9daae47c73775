use super::{BitRow, Point};
use crate::utils::geometry::{distance, round};

/// Compact bit matrix for storing a black/white image
///
/// `true` is a dark pixel. Reads outside the matrix are light.
#[derive(Debug, Clone)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitMatrix {
    /// Create a new all-light bit matrix with given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Threshold a grayscale buffer: values below `threshold` are dark
    ///
    /// Pixels missing from a short buffer read as light.
    pub fn from_luma(luma: &[u8], width: usize, height: usize, threshold: u8) -> Self {
        let mut matrix = Self::new(width, height);
        for (i, &value) in luma.iter().take(width * height).enumerate() {
            if value < threshold {
                matrix.set(i % width, i / width, true);
            }
        }
        matrix
    }

    /// Get matrix width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get matrix height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        (self.data[byte_index] >> bit_index) & 1 == 1
    }

    /// Get bit at signed coordinates; anything left of or above the origin is light
    pub fn get_signed(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.get(x as usize, y as usize)
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Mark a `width` x `height` block starting at (left, top) as dark
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        for y in top..(top + height).min(self.height) {
            for x in left..(left + width).min(self.width) {
                self.set(x, y, true);
            }
        }
    }

    /// Whether any pixel of column `x` between `y_from` and `y_to` (inclusive) is dark
    pub fn has_dark_pixel_along_column(&self, x: i32, y_from: i32, y_to: i32) -> bool {
        (y_from..=y_to).any(|y| self.get_signed(x, y))
    }

    /// Whether any pixel of row `y` between `x_from` and `x_to` (inclusive) is dark
    pub fn has_dark_pixel_along_row(&self, y: i32, x_from: i32, x_to: i32) -> bool {
        (x_from..=x_to).any(|x| self.get_signed(x, y))
    }

    /// First dark pixel met when walking from `p0` towards `p1`
    ///
    /// Samples `round(|p1 - p0|)` points starting at `p0`; `p1` itself is not
    /// sampled. Returns the rounded pixel coordinates of the hit.
    pub fn first_dark_pixel_on_segment(&self, p0: &Point, p1: &Point) -> Option<Point> {
        let dist = round(distance(p0, p1));
        if dist <= 0 {
            return None;
        }
        let x_step = (p1.x - p0.x) / dist as f32;
        let y_step = (p1.y - p0.y) / dist as f32;

        (0..dist).find_map(|i| {
            let x = round(p0.x + i as f32 * x_step);
            let y = round(p0.y + i as f32 * y_step);
            self.get_signed(x, y)
                .then(|| Point::new(x as f32, y as f32))
        })
    }

    /// Copy row `y` out as a standalone bit run
    pub fn row(&self, y: usize) -> BitRow {
        let mut row = BitRow::new(self.width);
        for x in 0..self.width {
            if self.get(x, y) {
                row.set(x);
            }
        }
        row
    }

    /// Count of dark pixels in the whole matrix
    pub fn count_dark(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for BitMatrix {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_matrix() {
        let mut matrix = BitMatrix::new(8, 8);
        assert_eq!(matrix.width(), 8);
        assert_eq!(matrix.height(), 8);

        matrix.set(3, 4, true);
        assert!(matrix.get(3, 4));
        assert!(!matrix.get(3, 3));
        assert_eq!(matrix.count_dark(), 1);

        matrix.set(3, 4, false);
        assert!(!matrix.get(3, 4));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut matrix = BitMatrix::new(8, 8);
        matrix.set(10, 10, true); // Should not panic
        assert!(!matrix.get(10, 10));
        assert!(!matrix.get_signed(-1, 2));
    }

    #[test]
    fn test_border_queries() {
        let mut matrix = BitMatrix::new(10, 10);
        matrix.set(4, 6, true);

        assert!(matrix.has_dark_pixel_along_column(4, 0, 9));
        assert!(matrix.has_dark_pixel_along_column(4, 6, 6));
        assert!(!matrix.has_dark_pixel_along_column(4, 0, 5));
        assert!(matrix.has_dark_pixel_along_row(6, 0, 4));
        assert!(!matrix.has_dark_pixel_along_row(6, 5, 9));
    }

    #[test]
    fn test_first_dark_pixel_on_segment() {
        let mut matrix = BitMatrix::new(10, 10);
        matrix.set(5, 5, true);

        let hit = matrix.first_dark_pixel_on_segment(&Point::new(2.0, 2.0), &Point::new(8.0, 8.0));
        assert_eq!(hit, Some(Point::new(5.0, 5.0)));

        // The end point is never sampled
        let miss = matrix.first_dark_pixel_on_segment(&Point::new(2.0, 5.0), &Point::new(5.0, 5.0));
        assert_eq!(miss, None);

        let empty = matrix.first_dark_pixel_on_segment(&Point::new(5.0, 5.0), &Point::new(5.0, 5.0));
        assert_eq!(empty, None);
    }

    #[test]
    fn test_from_luma() {
        let luma = [0, 200, 127, 128, 255, 10];
        let matrix = BitMatrix::from_luma(&luma, 3, 2, 128);
        assert!(matrix.get(0, 0));
        assert!(!matrix.get(1, 0));
        assert!(matrix.get(2, 0));
        assert!(!matrix.get(0, 1));
        assert!(matrix.get(2, 1));
        assert_eq!(matrix.count_dark(), 3);

        let short = BitMatrix::from_luma(&[0], 4, 4, 128);
        assert_eq!(short.count_dark(), 1);
    }

    #[test]
    fn test_row_copy() {
        let mut matrix = BitMatrix::new(12, 3);
        matrix.set_region(2, 1, 4, 1);
        let row = matrix.row(1);
        assert_eq!(row.len(), 12);
        assert!(!row.get(1));
        assert!(row.get(2) && row.get(5));
        assert!(!row.get(6));
    }
}

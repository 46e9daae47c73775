use std::cmp::Ordering;

use super::Point;

/// Width of a stacked-symbol finder pattern in modules
pub const FINDER_PATTERN_MODULES: usize = 15;

/// Number of distinct finder pattern values
pub const FINDER_PATTERN_COUNT: u8 = 6;

/// A classified finder pattern found on one scan line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Index into the reference pattern table (A = 0 .. F = 5)
    pub value: u8,
    /// First pixel of the pattern
    pub start: usize,
    /// One past the last pixel of the pattern
    pub end: usize,
    /// Row the pattern was read from
    pub row: usize,
    /// Pattern width divided by its module count
    pub estimated_module_size: f32,
}

impl FinderPattern {
    /// Create a pattern spanning `start..end` on `row`
    pub fn new(value: u8, start: usize, end: usize, row: usize) -> Self {
        let width = end.saturating_sub(start);
        Self {
            value,
            start,
            end,
            row,
            estimated_module_size: width as f32 / FINDER_PATTERN_MODULES as f32,
        }
    }

    /// Midpoint of the pattern on its row
    pub fn center(&self) -> Point {
        Point::new((self.start + self.end) as f32 / 2.0, self.row as f32)
    }

    /// Ordering by estimated module size
    pub fn cmp_module_size(&self, other: &Self) -> Ordering {
        self.estimated_module_size
            .total_cmp(&other.estimated_module_size)
    }
}

/// One odd and one even finder pattern read in scan order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPair {
    /// Pattern read left to right
    pub odd: FinderPattern,
    /// Pattern read mirrored
    pub even: FinderPattern,
    /// Combined value, `odd * 6 + even`
    pub value: u8,
}

impl FinderPair {
    /// Combine two finder patterns
    pub fn new(odd: FinderPattern, even: FinderPattern) -> Self {
        Self {
            odd,
            even,
            value: odd.value * FINDER_PATTERN_COUNT + even.value,
        }
    }

    /// Where the next search on the row resumes
    pub fn end(&self) -> usize {
        self.odd.end.max(self.even.end)
    }

    /// Both patterns in the order they appear on the row
    pub fn patterns(&self) -> [FinderPattern; 2] {
        if self.odd.start <= self.even.start {
            [self.odd, self.even]
        } else {
            [self.even, self.odd]
        }
    }
}

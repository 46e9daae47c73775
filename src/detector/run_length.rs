/// Run-length finder pattern matching for stacked symbologies
///
/// A scan line is turned into run lengths of alternating colour. Four
/// consecutive runs form a candidate; candidates are checked against the
/// reference table of finder patterns by ratio, never by absolute width.
use crate::error::{LocateError, LocateResult};
use crate::models::BitRow;

/// Four consecutive run lengths, starting with a dark run
pub type Counters = [u32; 4];

/// Largest average deviation from a reference pattern, per unit width
pub const MAX_AVG_VARIANCE: f32 = 0.2;
/// Largest deviation of any single element, per unit width
pub const MAX_INDIVIDUAL_VARIANCE: f32 = 0.45;

const MIN_FINDER_PATTERN_RATIO: f32 = 9.5 / 12.0;
const MAX_FINDER_PATTERN_RATIO: f32 = 12.5 / 14.0;

/// Relative widths of the first four elements of each finder pattern, A..F
pub const FINDER_PATTERNS: [Counters; 6] = [
    [1, 8, 4, 1], // A
    [3, 6, 4, 1], // B
    [3, 4, 6, 1], // C
    [3, 2, 8, 1], // D
    [2, 6, 5, 1], // E
    [2, 2, 9, 1], // F
];

/// Four runs that passed the structural finder check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Run lengths in the orientation they were tested in
    pub counters: Counters,
    /// First pixel of the first run
    pub start: usize,
    /// First pixel after the fourth run
    pub end: usize,
}

/// Structural test for four runs of a finder pattern
///
/// The first two runs must carry roughly 80-90% of the total width and no
/// run may be ten times wider than another.
pub fn is_finder_pattern(counters: &Counters) -> bool {
    let first_two_sum = counters[0] + counters[1];
    let sum = first_two_sum + counters[2] + counters[3];
    if sum == 0 {
        return false;
    }
    let ratio = first_two_sum as f32 / sum as f32;
    if !(MIN_FINDER_PATTERN_RATIO..=MAX_FINDER_PATTERN_RATIO).contains(&ratio) {
        return false;
    }

    let min_counter = counters.iter().copied().min().unwrap_or(0);
    let max_counter = counters.iter().copied().max().unwrap_or(0);
    max_counter < 10 * min_counter
}

/// Average deviation of `counters` from `pattern`, per pixel
///
/// Returns `f32::INFINITY` when any single element is off by more than
/// `max_individual_variance` unit widths, or when the runs are narrower
/// than the pattern itself.
pub fn pattern_match_variance(
    counters: &[u32],
    pattern: &[u32],
    max_individual_variance: f32,
) -> f32 {
    let total: u32 = counters.iter().sum();
    let pattern_length: u32 = pattern.iter().sum();
    if total < pattern_length || pattern_length == 0 {
        return f32::INFINITY;
    }

    let unit_bar_width = total as f32 / pattern_length as f32;
    let max_individual_variance = max_individual_variance * unit_bar_width;

    let mut total_variance = 0.0f32;
    for (&counter, &expected) in counters.iter().zip(pattern) {
        let scaled = expected as f32 * unit_bar_width;
        let variance = (counter as f32 - scaled).abs();
        if variance > max_individual_variance {
            return f32::INFINITY;
        }
        total_variance += variance;
    }
    total_variance / total as f32
}

/// Classify four element widths against the reference table
///
/// Returns the first pattern value that matches within tolerance.
pub fn parse_finder_value(counters: &Counters) -> Option<u8> {
    FINDER_PATTERNS
        .iter()
        .position(|pattern| {
            pattern_match_variance(counters, pattern, MAX_INDIVIDUAL_VARIANCE) < MAX_AVG_VARIANCE
        })
        .map(|value| value as u8)
}

fn reversed(counters: &Counters) -> Counters {
    [counters[3], counters[2], counters[1], counters[0]]
}

/// Scan `row` from `from` for the next four runs that look like a finder
///
/// Leading light pixels are skipped so the window always opens on a dark
/// run. With `reversed` set the runs are tested right-to-left, for patterns
/// printed mirrored. On a miss the window slides by two runs, so every
/// candidate still opens on a dark run and no pixel is read twice.
pub fn find_next_candidate(row: &BitRow, from: usize, reversed_scan: bool) -> LocateResult<Candidate> {
    let width = row.len();
    let row_offset = row.next_set(from);

    let mut counters: Counters = [0; 4];
    let mut counter_position = 0usize;
    let mut pattern_start = row_offset;
    let mut dark_run = true;

    for x in row_offset..width {
        if row.get(x) == dark_run {
            counters[counter_position] += 1;
            continue;
        }

        if counter_position == 3 {
            let tested = if reversed_scan {
                reversed(&counters)
            } else {
                counters
            };
            if is_finder_pattern(&tested) {
                return Ok(Candidate {
                    counters: tested,
                    start: pattern_start,
                    end: x,
                });
            }
            pattern_start += (counters[0] + counters[1]) as usize;
            counters = [counters[2], counters[3], 0, 0];
            counter_position = 2;
        } else {
            counter_position += 1;
        }
        counters[counter_position] = 1;
        dark_run = !dark_run;
    }

    Err(LocateError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(pattern: &[u32], module: u32) -> Vec<usize> {
        pattern.iter().map(|&w| (w * module) as usize).collect()
    }

    #[test]
    fn test_is_finder_pattern() {
        // Elements 2..5 of pattern A
        assert!(is_finder_pattern(&[8, 4, 1, 1]));
        assert!(is_finder_pattern(&[16, 8, 2, 2]));
        // Evenly spaced bars carry half the width in the first two runs
        assert!(!is_finder_pattern(&[3, 3, 3, 3]));
        // Ratio in range but one run ten times the smallest
        assert!(!is_finder_pattern(&[20, 10, 1, 3]));
        assert!(!is_finder_pattern(&[0, 0, 0, 0]));
    }

    #[test]
    fn test_pattern_match_variance() {
        assert_eq!(pattern_match_variance(&[3, 24, 12, 3], &[1, 8, 4, 1], 0.45), 0.0);
        assert_eq!(
            pattern_match_variance(&[1, 1, 1, 1], &[1, 8, 4, 1], 0.45),
            f32::INFINITY
        );
        assert_eq!(
            pattern_match_variance(&[10, 16, 8, 2], &[1, 8, 4, 1], 0.45),
            f32::INFINITY
        );
    }

    #[test]
    fn test_parse_every_reference_pattern() {
        for (value, pattern) in FINDER_PATTERNS.iter().enumerate() {
            for module in 1..=4 {
                let counters = pattern.map(|w| w * module);
                assert_eq!(parse_finder_value(&counters), Some(value as u8));
            }
        }
        assert_eq!(parse_finder_value(&[5, 5, 5, 5]), None);
    }

    #[test]
    fn test_find_candidate_exact_widths() {
        // Light lead-in, then elements 2..5 of pattern A at 3px per module,
        // then a dark run closing the window
        let mut runs = vec![3];
        runs.extend(scaled(&[8, 4, 1, 1], 3));
        runs.push(9);
        let row = BitRow::from_runs(&runs, false);

        let candidate = find_next_candidate(&row, 0, false).unwrap();
        assert_eq!(candidate.counters, [24, 12, 3, 3]);
        assert_eq!(candidate.start, 3);
        assert_eq!(candidate.end, 45);
    }

    #[test]
    fn test_find_candidate_reversed() {
        let mut runs = vec![3];
        runs.extend(scaled(&[1, 1, 4, 8], 3));
        runs.push(9);
        let row = BitRow::from_runs(&runs, false);

        assert!(find_next_candidate(&row, 0, false).is_err());
        let candidate = find_next_candidate(&row, 0, true).unwrap();
        assert_eq!(candidate.counters, [24, 12, 3, 3]);
        assert_eq!(candidate.start, 3);
    }

    #[test]
    fn test_window_slides_by_two_runs() {
        // Two junk runs in front of the pattern
        let runs = [2, 3, 3, 16, 8, 2, 2, 6];
        let row = BitRow::from_runs(&runs, false);
        let candidate = find_next_candidate(&row, 0, false).unwrap();
        assert_eq!(candidate.start, 8);
        assert_eq!(candidate.counters, [16, 8, 2, 2]);
    }

    #[test]
    fn test_starts_at_offset() {
        let runs = [2, 16, 8, 2, 2, 6, 4, 16, 8, 2, 2, 6];
        let row = BitRow::from_runs(&runs, false);
        let first = find_next_candidate(&row, 0, false).unwrap();
        assert_eq!(first.start, 2);
        let second = find_next_candidate(&row, first.end, false).unwrap();
        assert_eq!(second.start, 40);
    }

    #[test]
    fn test_exhausted_row() {
        let row = BitRow::from_runs(&[3; 20], false);
        assert_eq!(find_next_candidate(&row, 0, false), Err(LocateError::NotFound));

        let blank = BitRow::new(64);
        assert_eq!(find_next_candidate(&blank, 0, false), Err(LocateError::NotFound));
        assert_eq!(find_next_candidate(&blank, 500, true), Err(LocateError::NotFound));
    }

    #[test]
    fn test_pattern_cut_by_row_end_not_found() {
        // No pixel after the fourth run, so the window never closes
        let row = BitRow::from_runs(&[3, 24, 12, 3, 3], false);
        assert_eq!(find_next_candidate(&row, 0, false), Err(LocateError::NotFound));
    }
}

/// Finder pattern pairing for stacked symbols
///
/// Drives the run-length matcher along one row, validates each raw match
/// against the reference table and groups accepted patterns into odd/even
/// pairs. A rejected match is retried from the next bar boundary, so every
/// retry starts strictly further along the row than the last.
use log::{debug, trace};
use rayon::prelude::*;

use super::config::ScanConfig;
use super::run_length::{Candidate, find_next_candidate, parse_finder_value};
use crate::error::{LocateError, LocateResult};
use crate::models::{BitMatrix, BitRow, FinderPair, FinderPattern};

/// Where the next finder search on a row starts
///
/// A forced offset (from a rejected match) wins; otherwise the search
/// resumes at the end of the last accepted pattern.
pub fn scan_offset(previous: &[FinderPattern], forced_offset: Option<usize>) -> usize {
    forced_offset
        .or_else(|| previous.last().map(|pattern| pattern.end))
        .unwrap_or(0)
}

/// Whether the next finder on the row is read mirrored
pub fn searching_even(accepted: usize, start_from_even: bool) -> bool {
    (accepted % 2 != 0) ^ start_from_even
}

/// Start of the second run of the same colour after `pos`
pub fn next_second_bar(row: &BitRow, pos: usize) -> usize {
    if row.get(pos) {
        row.next_set(row.next_unset(pos))
    } else {
        row.next_unset(row.next_set(pos))
    }
}

/// Turn a raw match into a classified finder pattern
///
/// An odd match picks up the light run in front of it as its first element;
/// an even match picks up the dark run that starts where it ended. Returns
/// `None` when the completed element widths fit no reference pattern.
pub fn parse_candidate(
    row: &BitRow,
    row_number: usize,
    candidate: &Candidate,
    odd: bool,
) -> Option<FinderPattern> {
    let (first_counter, start, end) = if odd {
        let mut first_start = candidate.start;
        while first_start > 0 && !row.get(first_start - 1) {
            first_start -= 1;
        }
        (candidate.start - first_start, first_start, candidate.end)
    } else {
        let end = row.next_unset(candidate.end + 1);
        (end - candidate.end, candidate.start, end)
    };

    let [c0, c1, c2, _] = candidate.counters;
    let counters = [u32::try_from(first_counter).ok()?, c0, c1, c2];
    let value = parse_finder_value(&counters)?;
    Some(FinderPattern::new(value, start, end, row_number))
}

/// An accepted finder pattern and the retry offsets spent finding it
#[derive(Debug, Clone, PartialEq)]
pub struct FinderMatch {
    /// The classified pattern
    pub pattern: FinderPattern,
    /// Offsets used after rejected matches, in the order they were tried
    pub forced_offsets: Vec<usize>,
}

/// Find the finder pattern that follows `previous` on the row
///
/// Rejected matches are retried from the next bar boundary past their
/// start until a match classifies or the row runs out.
pub fn find_next_finder(
    row: &BitRow,
    row_number: usize,
    previous: &[FinderPattern],
    forced_offset: Option<usize>,
    start_from_even: bool,
) -> LocateResult<FinderMatch> {
    let even = searching_even(previous.len(), start_from_even);
    let mut forced_offset = forced_offset;
    let mut forced_offsets = Vec::new();

    loop {
        let offset = scan_offset(previous, forced_offset);
        let candidate = find_next_candidate(row, offset, even).inspect_err(|_| {
            debug!(
                "row {row_number}: no {} finder after {offset}",
                if even { "even" } else { "odd" }
            );
        })?;

        if let Some(pattern) = parse_candidate(row, row_number, &candidate, !even) {
            trace!(
                "row {row_number}: finder {} at {}..{}",
                pattern.value, pattern.start, pattern.end
            );
            return Ok(FinderMatch {
                pattern,
                forced_offsets,
            });
        }

        let next = next_second_bar(row, candidate.start);
        trace!(
            "row {row_number}: rejected {:?} at {}..{}, retrying from {next}",
            candidate.counters, candidate.start, candidate.end
        );
        forced_offset = Some(next);
        forced_offsets.push(next);
    }
}

fn pair_in_scan_order(first: FinderPattern, second: FinderPattern, first_even: bool) -> FinderPair {
    if first_even {
        FinderPair::new(second, first)
    } else {
        FinderPair::new(first, second)
    }
}

/// Find the next odd/even pair after `previous_pairs` on the row
///
/// `forced_offset` overrides where the first of the two searches starts.
pub fn find_next_pair(
    row: &BitRow,
    row_number: usize,
    previous_pairs: &[FinderPair],
    forced_offset: Option<usize>,
    start_from_even: bool,
) -> LocateResult<FinderPair> {
    let mut patterns: Vec<FinderPattern> =
        previous_pairs.iter().flat_map(FinderPair::patterns).collect();
    let first_even = searching_even(patterns.len(), start_from_even);

    let first = find_next_finder(row, row_number, &patterns, forced_offset, start_from_even)?;
    patterns.push(first.pattern);
    let second = find_next_finder(row, row_number, &patterns, None, start_from_even)?;

    Ok(pair_in_scan_order(first.pattern, second.pattern, first_even))
}

/// Progress of pair assembly on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    /// Looking for a forward-read finder
    SearchingOdd,
    /// Looking for a mirrored finder
    SearchingEven,
    /// The last search completed a pair
    PairComplete,
    /// The pair limit was reached
    Done,
    /// The row ran out before a pair completed
    NotFound,
}

/// Collects finder pairs along one row
pub struct PairAssembler<'a> {
    row: &'a BitRow,
    row_number: usize,
    start_from_even: bool,
    max_pairs: usize,
    patterns: Vec<FinderPattern>,
    pairs: Vec<FinderPair>,
    forced_offsets: Vec<usize>,
    state: PairState,
}

impl<'a> PairAssembler<'a> {
    /// Assembler for `row`, stopping after `max_pairs` pairs
    pub fn new(row: &'a BitRow, row_number: usize, start_from_even: bool, max_pairs: usize) -> Self {
        Self {
            row,
            row_number,
            start_from_even,
            max_pairs,
            patterns: Vec::new(),
            pairs: Vec::new(),
            forced_offsets: Vec::new(),
            state: Self::searching(0, start_from_even),
        }
    }

    fn searching(accepted: usize, start_from_even: bool) -> PairState {
        if searching_even(accepted, start_from_even) {
            PairState::SearchingEven
        } else {
            PairState::SearchingOdd
        }
    }

    /// Current state
    pub fn state(&self) -> PairState {
        self.state
    }

    /// Pairs accepted so far, in scan order
    pub fn pairs(&self) -> &[FinderPair] {
        &self.pairs
    }

    /// Every forced offset used on this row, in the order they were tried
    pub fn forced_offsets(&self) -> &[usize] {
        &self.forced_offsets
    }

    fn next_finder(&mut self) -> LocateResult<FinderPattern> {
        self.state = Self::searching(self.patterns.len(), self.start_from_even);
        match find_next_finder(
            self.row,
            self.row_number,
            &self.patterns,
            None,
            self.start_from_even,
        ) {
            Ok(found) => {
                self.forced_offsets.extend(found.forced_offsets);
                self.patterns.push(found.pattern);
                Ok(found.pattern)
            }
            Err(err) => {
                // Half a pair is no pair
                self.patterns.truncate(self.pairs.len() * 2);
                self.state = PairState::NotFound;
                Err(err)
            }
        }
    }

    /// Find and record the next pair
    ///
    /// Fails once the assembler is `Done` or `NotFound`.
    pub fn find_next_pair(&mut self) -> LocateResult<FinderPair> {
        if matches!(self.state, PairState::Done | PairState::NotFound) {
            return Err(LocateError::NotFound);
        }

        let first_even = searching_even(self.patterns.len(), self.start_from_even);
        let first = self.next_finder()?;
        let second = self.next_finder()?;
        let pair = pair_in_scan_order(first, second, first_even);
        self.pairs.push(pair);

        self.state = if self.pairs.len() >= self.max_pairs {
            PairState::Done
        } else {
            PairState::PairComplete
        };
        Ok(pair)
    }

    /// Collect pairs until the row runs out or the limit is reached
    pub fn assemble(&mut self) -> &[FinderPair] {
        while self.find_next_pair().is_ok() {}
        &self.pairs
    }

    /// Consume the assembler, keeping its pairs
    pub fn into_pairs(self) -> Vec<FinderPair> {
        self.pairs
    }
}

/// Pairs found on one matrix row
#[derive(Debug, Clone, PartialEq)]
pub struct RowPairs {
    /// Row index in the matrix
    pub row: usize,
    /// Pairs in scan order
    pub pairs: Vec<FinderPair>,
}

/// Assemble pairs on each of `rows`, starting every row with an odd finder
pub fn scan_rows(matrix: &BitMatrix, rows: &[usize], config: &ScanConfig) -> Vec<RowPairs> {
    scan_rows_with_parity(matrix, rows, config, false)
}

/// Assemble pairs on each of `rows` in parallel
///
/// Rows outside the matrix and rows without a pair are left out; the rest
/// come back ordered by row index.
pub fn scan_rows_with_parity(
    matrix: &BitMatrix,
    rows: &[usize],
    config: &ScanConfig,
    start_from_even: bool,
) -> Vec<RowPairs> {
    let mut found: Vec<RowPairs> = rows
        .par_iter()
        .filter(|&&y| y < matrix.height())
        .filter_map(|&y| {
            let row = matrix.row(y);
            let mut assembler = PairAssembler::new(&row, y, start_from_even, config.max_pairs);
            assembler.assemble();
            let pairs = assembler.into_pairs();
            (!pairs.is_empty()).then_some(RowPairs { row: y, pairs })
        })
        .collect();
    found.sort_by_key(|row_pairs| row_pairs.row);
    found
}

/// Scan every `config.row_step`-th row of the matrix
pub fn scan_matrix(matrix: &BitMatrix, config: &ScanConfig) -> Vec<RowPairs> {
    let rows: Vec<usize> = (0..matrix.height()).step_by(config.row_step.max(1)).collect();
    scan_rows(matrix, &rows, config)
}

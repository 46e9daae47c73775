/// A single scan line of black/white pixels
///
/// Bits are packed into `u32` words; `true` is a dark pixel. Reads past the
/// end are light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitRow {
    len: usize,
    words: Vec<u32>,
}

impl BitRow {
    /// Create an all-light row of `len` pixels
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(32)],
        }
    }

    /// Build a row from alternating run lengths
    ///
    /// The first run has the colour `first_dark`; colours alternate from there.
    pub fn from_runs(runs: &[usize], first_dark: bool) -> Self {
        let mut row = Self::new(runs.iter().sum());
        let mut pos = 0;
        let mut dark = first_dark;
        for &run in runs {
            if dark {
                for i in pos..pos + run {
                    row.set(i);
                }
            }
            pos += run;
            dark = !dark;
        }
        row
    }

    /// Number of pixels in the row
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the row has no pixels
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether pixel `i` is dark
    pub fn get(&self, i: usize) -> bool {
        if i >= self.len {
            return false;
        }
        (self.words[i / 32] >> (i % 32)) & 1 == 1
    }

    /// Mark pixel `i` dark
    pub fn set(&mut self, i: usize) {
        if i >= self.len {
            return;
        }
        self.words[i / 32] |= 1 << (i % 32);
    }

    /// Index of the first dark pixel at or after `from`, or `len()` if none
    pub fn next_set(&self, from: usize) -> usize {
        self.next_matching(from, true)
    }

    /// Index of the first light pixel at or after `from`, or `len()` if none
    pub fn next_unset(&self, from: usize) -> usize {
        self.next_matching(from, false)
    }

    fn next_matching(&self, from: usize, dark: bool) -> usize {
        if from >= self.len {
            return self.len;
        }
        let mut word_index = from / 32;
        let flip = if dark { 0 } else { u32::MAX };
        // Drop the bits below `from` in the first word
        let mut word = (self.words[word_index] ^ flip) & (u32::MAX << (from % 32));
        while word == 0 {
            word_index += 1;
            if word_index >= self.words.len() {
                return self.len;
            }
            word = self.words[word_index] ^ flip;
        }
        let found = word_index * 32 + word.trailing_zeros() as usize;
        found.min(self.len)
    }

    /// The same pixels read right to left
    pub fn reversed(&self) -> Self {
        let mut out = Self::new(self.len);
        for i in 0..self.len {
            if self.get(i) {
                out.set(self.len - 1 - i);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_runs() {
        let row = BitRow::from_runs(&[2, 3, 1], false);
        assert_eq!(row.len(), 6);
        let bits: Vec<bool> = (0..6).map(|i| row.get(i)).collect();
        assert_eq!(bits, vec![false, false, true, true, true, false]);
    }

    #[test]
    fn test_next_set_and_unset() {
        let row = BitRow::from_runs(&[40, 10, 30], false);
        assert_eq!(row.next_set(0), 40);
        assert_eq!(row.next_set(45), 45);
        assert_eq!(row.next_unset(40), 50);
        assert_eq!(row.next_set(50), row.len());
        assert_eq!(row.next_unset(79), 79);
        assert_eq!(row.next_unset(500), row.len());
    }

    #[test]
    fn test_next_unset_on_full_tail_word() {
        // Padding bits past `len` must never be reported
        let row = BitRow::from_runs(&[5, 30], false);
        assert_eq!(row.next_unset(5), row.len());
    }

    #[test]
    fn test_reversed() {
        let row = BitRow::from_runs(&[1, 2, 3], true);
        let rev = row.reversed();
        assert_eq!(rev, BitRow::from_runs(&[3, 2, 1], true));
        assert_eq!(rev.reversed(), row);
    }
}

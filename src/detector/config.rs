use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

static SEED_SIZE: OnceLock<usize> = OnceLock::new();

pub(crate) fn seed_size() -> usize {
    *SEED_SIZE.get_or_init(|| parse_env_usize("LOCATE_SEED_SIZE", 10).clamp(2, 64))
}

static MAX_PAIRS: OnceLock<usize> = OnceLock::new();

pub(crate) fn max_pairs() -> usize {
    *MAX_PAIRS.get_or_init(|| parse_env_usize("LOCATE_MAX_PAIRS", 11).clamp(1, 32))
}

static ROW_STEP: OnceLock<usize> = OnceLock::new();

pub(crate) fn row_step() -> usize {
    *ROW_STEP.get_or_init(|| parse_env_usize("LOCATE_ROW_STEP", 1).clamp(1, 64))
}

/// Resolved scan tunables
///
/// `ScanConfig::default()` reads the `LOCATE_*` environment variables once
/// per process; fields can be overridden afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Seed rectangle size for the rectangle locator
    pub seed_size: usize,
    /// Upper bound on pairs assembled from one row
    pub max_pairs: usize,
    /// Row stride for multi-row scans
    pub row_step: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            seed_size: seed_size(),
            max_pairs: max_pairs(),
            row_step: row_step(),
        }
    }
}

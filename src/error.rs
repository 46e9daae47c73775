/// Errors returned by the locator and the finder pattern scanners.
///
/// "Not found" is the only outcome a search can fail with: callers treat it
/// as "try another seed or another row" and move on.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateError {
    /// The search space was exhausted without a valid geometry or pattern
    #[error("no symbol geometry found")]
    NotFound,
}

/// Result alias used throughout the crate
pub type LocateResult<T> = Result<T, LocateError>;

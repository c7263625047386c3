//! Error types for the rrss-analysis crate.
use thiserror::Error;

/// Error type for the crate.
///
/// These are usage and data-integrity errors. Conditions that are expected while processing real
/// ascents, like a missing tropopause or a profile with no stability regions, are reported as
/// values and never show up here.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnalysisError {
    /// Not enough data available for analysis.
    #[error("not enough data available for analysis")]
    NotEnoughData,
    /// Parallel arrays that must share a length do not.
    #[error("parallel arrays differ in length: expected {expected}, found {found}")]
    MismatchedLengths {
        /// Length of the coordinate (or first) array.
        expected: usize,
        /// Length of the offending array.
        found: usize,
    },
    /// A vertical coordinate that must be strictly increasing is not.
    #[error("vertical coordinate is not strictly increasing at index {index}")]
    NonMonotonic {
        /// Index of the first sample that does not increase on its predecessor.
        index: usize,
    },
    /// Savitzky-Golay window must be odd and longer than the polynomial order.
    #[error(
        "invalid Savitzky-Golay window {window} for polynomial order {order}, window must be odd \
         and at least order + 1"
    )]
    InvalidFilterWindow {
        /// Requested window length in samples.
        window: usize,
        /// Requested polynomial order.
        order: usize,
    },
    /// Gaussian half width must be finite and positive.
    #[error("gaussian half width must be finite and positive")]
    InvalidGaussianWidth,
    /// Grid spacing must be finite and positive.
    #[error("grid spacing must be finite and positive")]
    InvalidGridSpacing,
    /// There is no data available that meets the requirements.
    #[error("profile is full of missing values, cannot do analysis")]
    NoDataProfile,
    /// Bad or invalid input.
    #[error("invalid input")]
    InvalidInput,
    /// A value that is required is not available.
    #[error("missing value required for analysis")]
    MissingValue,
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Check that a set of parallel arrays all have the same length as the first one.
pub(crate) fn check_lengths(expected: usize, others: &[usize]) -> Result<()> {
    match others.iter().find(|&&len| len != expected) {
        Some(&found) => Err(AnalysisError::MismatchedLengths { expected, found }),
        None => Ok(()),
    }
}

/// Check that a vertical coordinate is strictly increasing.
pub(crate) fn check_increasing(coord: &[f64]) -> Result<()> {
    match coord
        .windows(2)
        .position(|pair| !(pair[1] > pair[0]))
        .map(|i| i + 1)
    {
        Some(index) => Err(AnalysisError::NonMonotonic { index }),
        None => Ok(()),
    }
}

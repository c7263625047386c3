//! Find the tropopause with the WMO lapse rate definition.
//!
//! The tropopause is the lowest level at which the lapse rate drops to 2 K/km or less, provided
//! the average lapse rate between that level and every level within the next 2 km stays at or
//! below 2 K/km.
use crate::error::{check_increasing, check_lengths, AnalysisError, Result};
use metfor::Meters;
use optional::Optioned;
use std::fmt::Display;
use strum_macros::EnumIter;

/// How the tropopause search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Hash)]
#[repr(u8)]
pub enum TropopauseStatus {
    /// Found with a full averaging window above it.
    Found = 0,
    /// Found, but the profile ended less than a full window above the tropopause so the average
    /// was taken up to the highest available point.
    TruncatedWindow = 1,
    /// No candidate level satisfied the lapse rate criterion.
    NotFound = 2,
}

impl TropopauseStatus {
    /// Numeric flag value.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether a tropopause height came with this status.
    pub fn is_found(self) -> bool {
        self != TropopauseStatus::NotFound
    }
}

impl Display for TropopauseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TropopauseStatus::*;

        let string_rep = match self {
            Found => "found",
            TruncatedWindow => "found with truncated window",
            NotFound => "not found",
        };

        write!(f, "{}", string_rep)
    }
}

/// Parameters for the tropopause search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TropopauseSearch {
    /// Lowest height a candidate level may have.
    pub min_height: Meters,
    /// Highest height a candidate level may have.
    pub max_height: Meters,
    /// Depth above a candidate that the average lapse rate is checked over.
    pub window_depth: Meters,
    /// Largest lapse rate, K/km, for a tropopause.
    pub max_lapse_rate: f64,
}

impl Default for TropopauseSearch {
    fn default() -> Self {
        TropopauseSearch {
            min_height: Meters(4_000.0),
            max_height: Meters(18_000.0),
            window_depth: Meters(2_000.0),
            max_lapse_rate: 2.0,
        }
    }
}

impl TropopauseSearch {
    /// Search between `min_height` and `max_height` with the WMO window and threshold.
    pub fn new(min_height: Meters, max_height: Meters) -> Self {
        TropopauseSearch {
            min_height,
            max_height,
            ..Self::default()
        }
    }
}

/// Result of a tropopause search.
#[derive(Debug, Clone, PartialEq)]
pub struct Tropopause {
    height: Optioned<Meters>,
    index: Option<usize>,
    status: TropopauseStatus,
    lapse_rates: Vec<f64>,
}

impl Tropopause {
    /// The result for a profile with too few levels to search.
    pub(crate) fn not_found(levels: usize) -> Self {
        Tropopause {
            height: Optioned::default(),
            index: None,
            status: TropopauseStatus::NotFound,
            lapse_rates: vec![std::f64::NAN; levels],
        }
    }

    /// Height of the tropopause, missing if it was not found.
    pub fn height(&self) -> Optioned<Meters> {
        self.height
    }

    /// Index of the tropopause level in the searched profile.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// How the search ended.
    pub fn status(&self) -> TropopauseStatus {
        self.status
    }

    /// Centered lapse rates (K/km) used in the search, `NaN` at the end points.
    pub fn lapse_rates(&self) -> &[f64] {
        &self.lapse_rates
    }
}

/// Centered lapse rate in K/km at every interior level of a profile. The end points are `NaN`.
///
/// `temperature` is in kelvin and `height` in meters.
pub fn lapse_rate_profile(temperature: &[f64], height: &[f64]) -> Vec<f64> {
    let n = temperature.len().min(height.len());

    (0..n)
        .map(|i| {
            if i == 0 || i + 1 >= n {
                std::f64::NAN
            } else {
                1000.0 * (temperature[i - 1] - temperature[i + 1]) / (height[i + 1] - height[i - 1])
            }
        })
        .collect()
}

/// Height weighted mean of the lapse rates over a run of levels.
///
/// Each level gets a trapezoidal weight of half the depth of the layers on either side of it.
/// Missing lapse rates are left out of both the sum and the normalization.
fn weighted_mean_lapse_rate(lapse_rates: &[f64], height: &[f64]) -> f64 {
    let last = lapse_rates.len() - 1;

    let (sum, norm) = lapse_rates
        .iter()
        .enumerate()
        .filter(|(_, lr)| !lr.is_nan())
        .map(|(k, &lr)| {
            let below = if k > 0 { height[k] - height[k - 1] } else { 0.0 };
            let above = if k < last { height[k + 1] - height[k] } else { 0.0 };
            (lr, 0.5 * (below + above))
        })
        .fold((0.0, 0.0), |(sum, norm), (lr, w)| (sum + w * lr, norm + w));

    if norm > 0.0 {
        sum / norm
    } else {
        std::f64::NAN
    }
}

/// Find the tropopause in a profile of `temperature` (K) against strictly increasing `height`
/// (m), using the WMO lapse rate definition.
///
/// Candidate levels are tested from the bottom up and the first one that passes is returned, not
/// the one that passes by the widest margin. A tropopause that is not found is reported through
/// the status, only inconsistent or too short input is an error.
pub fn find_tropopause(
    temperature: &[f64],
    height: &[f64],
    search: &TropopauseSearch,
) -> Result<Tropopause> {
    check_lengths(height.len(), &[temperature.len()])?;
    if height.len() < 3 {
        return Err(AnalysisError::NotEnoughData);
    }
    check_increasing(height)?;

    let lapse_rates = lapse_rate_profile(temperature, height);
    let n = height.len();

    let min_z = search.min_height.0;
    let max_z = search.max_height.0;
    let depth = search.window_depth.0;
    let threshold = search.max_lapse_rate;

    let found = (1..n - 1)
        .take_while(|&i| height[i] <= max_z)
        .filter(|&i| height[i] >= min_z && lapse_rates[i] <= threshold)
        .find_map(|i| {
            let target = height[i] + depth;
            let (top, truncated) = match height[i + 1..].iter().position(|&z| z >= target) {
                Some(offset) => (i + 1 + offset, false),
                None => (n - 1, true),
            };

            let mean = weighted_mean_lapse_rate(&lapse_rates[i..=top], &height[i..=top]);
            if mean <= threshold {
                Some((i, truncated))
            } else {
                None
            }
        });

    let (height, index, status) = match found {
        Some((i, false)) => (Optioned::from(Meters(height[i])), Some(i), TropopauseStatus::Found),
        Some((i, true)) => (
            Optioned::from(Meters(height[i])),
            Some(i),
            TropopauseStatus::TruncatedWindow,
        ),
        None => (Optioned::default(), None, TropopauseStatus::NotFound),
    };

    Ok(Tropopause {
        height,
        index,
        status,
        lapse_rates,
    })
}

//! Filters for smoothing noise out of uniformly spaced vertical profiles.
//!
//! Two kernels are available. A truncated Gaussian that reaches two half widths either side of a
//! point, with the window shrunk symmetrically near the ends of the profile, and a Savitzky-Golay
//! least squares polynomial filter.
use crate::error::{AnalysisError, Result};
use nalgebra::DMatrix;

/// A smoothing filter and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// Leave the data alone.
    None,
    /// Truncated Gaussian kernel.
    Gaussian {
        /// Half width of the Gaussian, same units as `spacing`.
        half_width: f64,
        /// Distance between samples.
        spacing: f64,
    },
    /// Savitzky-Golay polynomial smoothing.
    SavitzkyGolay {
        /// Window length in samples, must be odd.
        window: usize,
        /// Order of the fitted polynomial, must be less than `window`.
        order: usize,
    },
}

impl Default for Filter {
    /// 200 m half width Gaussian on a 10 m grid.
    fn default() -> Self {
        Filter::Gaussian {
            half_width: 200.0,
            spacing: 10.0,
        }
    }
}

impl Filter {
    /// Smooth `data`, the output has the same length as the input.
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        match *self {
            Filter::None => Ok(data.to_vec()),
            Filter::Gaussian {
                half_width,
                spacing,
            } => gaussian_smooth(data, half_width, spacing),
            Filter::SavitzkyGolay { window, order } => savitzky_golay(data, window, order),
        }
    }

    /// The same filter for data sampled every `spacing`. Only the Gaussian depends on the spacing.
    pub fn with_spacing(self, spacing: f64) -> Self {
        match self {
            Filter::Gaussian { half_width, .. } => Filter::Gaussian {
                half_width,
                spacing,
            },
            other => other,
        }
    }
}

/// Number of samples either side of the center covered by the Gaussian window, two half widths.
fn gaussian_radius(half_width: f64, spacing: f64) -> Result<usize> {
    if !(half_width > 0.0) || !half_width.is_finite() {
        return Err(AnalysisError::InvalidGaussianWidth);
    }
    if !(spacing > 0.0) || !spacing.is_finite() {
        return Err(AnalysisError::InvalidGridSpacing);
    }

    // Tolerance keeps exact multiples, like 400 m / 10 m, from rounding down a step.
    Ok((2.0 * half_width / spacing + 1.0e-9).floor() as usize)
}

/// Normalized weights for a Gaussian with `half_width`, sampled every `spacing`, and truncated at
/// two half widths either side of the center. The result has odd length with the center weight in
/// the middle.
///
/// The window reaches `floor(2 * half_width / spacing)` samples either side of the center, so a
/// 200 m half width on a 10 m grid gives 81 weights. The half width is the standard deviation of
/// the Gaussian, not the reach of the window.
pub fn gaussian_weights(half_width: f64, spacing: f64) -> Result<Vec<f64>> {
    let radius = gaussian_radius(half_width, spacing)? as isize;
    let two_d_sq = 2.0 * half_width * half_width;

    let weights: Vec<f64> = (-radius..=radius)
        .map(|i| {
            let dist = i as f64 * spacing;
            (-(dist * dist) / two_d_sq).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();

    Ok(weights.into_iter().map(|w| w / total).collect())
}

/// Smooth a uniformly spaced profile with a truncated Gaussian kernel.
///
/// Near either end the window is cut down to the distance to the closest end on both sides, so a
/// point never takes more information from one side than the other, and the weights are
/// renormalized. Missing (`NaN`) inputs are left out of the weighted sum and its normalization,
/// and a missing point stays missing.
pub fn gaussian_smooth(data: &[f64], half_width: f64, spacing: f64) -> Result<Vec<f64>> {
    let weights = gaussian_weights(half_width, spacing)?;
    let radius = weights.len() / 2;
    let n = data.len();

    let smoothed = (0..n)
        .map(|i| {
            if data[i].is_nan() {
                return std::f64::NAN;
            }

            let hw = radius.min(i).min(n - 1 - i);
            let kernel = &weights[radius - hw..=radius + hw];
            let window = &data[i - hw..=i + hw];

            let (sum, norm) = kernel
                .iter()
                .zip(window)
                .filter(|(_, v)| !v.is_nan())
                .fold((0.0, 0.0), |(sum, norm), (w, v)| (sum + w * v, norm + w));

            sum / norm
        })
        .collect();

    Ok(smoothed)
}

/// Validate Savitzky-Golay parameters.
fn check_savitzky_golay(window: usize, order: usize) -> Result<()> {
    if window % 2 == 0 || window < order + 1 {
        Err(AnalysisError::InvalidFilterWindow { window, order })
    } else {
        Ok(())
    }
}

/// Least squares smoothing matrix for one window. Row `r` holds the weights that give the fitted
/// polynomial at position `r` of the window from the `window` samples in it.
fn savitzky_golay_matrix(window: usize, order: usize) -> Result<DMatrix<f64>> {
    let half = window / 2;
    // Scaling positions to [-1, 1] keeps the normal equations well conditioned and doesn't
    // change the fit.
    let scale = half.max(1) as f64;

    let vander = DMatrix::from_fn(window, order + 1, |r, c| {
        ((r as f64 - half as f64) / scale).powi(c as i32)
    });
    let normal = vander.transpose() * &vander;
    let inverse = normal.try_inverse().ok_or(AnalysisError::InvalidInput)?;

    Ok(&vander * inverse * vander.transpose())
}

/// Smooth a uniformly spaced profile with a Savitzky-Golay filter.
///
/// `window` must be odd and at least `order + 1`, anything else is an error rather than being
/// quietly adjusted. The first and last half window are taken from the polynomial fitted to the
/// first and last full window, so `data` must be at least one window long.
pub fn savitzky_golay(data: &[f64], window: usize, order: usize) -> Result<Vec<f64>> {
    check_savitzky_golay(window, order)?;

    let n = data.len();
    if n < window {
        return Err(AnalysisError::NotEnoughData);
    }

    let hat = savitzky_golay_matrix(window, order)?;
    let half = window / 2;

    let apply_row = |row: usize, offset: usize| -> f64 {
        (0..window).map(|k| hat[(row, k)] * data[offset + k]).sum()
    };

    let smoothed = (0..n)
        .map(|i| {
            if i < half {
                apply_row(i, 0)
            } else if i >= n - half {
                apply_row(i - (n - window), n - window)
            } else {
                apply_row(half, i - half)
            }
        })
        .collect();

    Ok(smoothed)
}

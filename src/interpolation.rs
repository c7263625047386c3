//! Piecewise linear interpolation of profile variables onto a new vertical coordinate.
use crate::error::{check_increasing, check_lengths, AnalysisError, Result};

/// What to do with target coordinates that fall outside the source coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBounds {
    /// Use the value at the nearest end of the source coordinate.
    Clamp,
    /// Mark the value as missing (`NaN`).
    Missing,
}

// Where a target coordinate falls relative to the source coordinate.
#[derive(Debug, Clone, Copy)]
enum Bracket {
    Between(usize, usize, f64),
    At(usize),
    Outside,
}

fn make_bracket(xs: &[f64], target_x: f64, policy: OutOfBounds) -> Bracket {
    let last = xs.len() - 1;

    if target_x.is_nan() {
        return Bracket::Outside;
    }

    if target_x < xs[0] || target_x > xs[last] {
        return match policy {
            OutOfBounds::Missing => Bracket::Outside,
            OutOfBounds::Clamp if target_x < xs[0] => Bracket::At(0),
            OutOfBounds::Clamp => Bracket::At(last),
        };
    }

    // First index with a coordinate strictly above the target.
    let above = xs.partition_point(|&x| x <= target_x);
    if above > last {
        return Bracket::At(last);
    }
    let below = above - 1;
    if (xs[below] - target_x).abs() < std::f64::EPSILON {
        Bracket::At(below)
    } else {
        let frac = (target_x - xs[below]) / (xs[above] - xs[below]);
        Bracket::Between(below, above, frac)
    }
}

#[inline]
fn eval_bracket(bracket: Bracket, ys: &[f64]) -> f64 {
    match bracket {
        Bracket::Between(i0, i1, frac) => ys[i0] + frac * (ys[i1] - ys[i0]),
        Bracket::At(i) => ys[i],
        Bracket::Outside => std::f64::NAN,
    }
}

/// Interpolate several variables that share a source coordinate onto new coordinates at once.
///
/// `xs` must be strictly increasing and every column must have the same length as `xs`. The
/// targets in `xs_new` may come in any order. The brackets are found once per target and reused
/// for every column, so the columns stay aligned with each other.
pub fn interpolate_many(
    xs: &[f64],
    columns: &[&[f64]],
    xs_new: &[f64],
    policy: OutOfBounds,
) -> Result<Vec<Vec<f64>>> {
    if xs.is_empty() {
        return Err(AnalysisError::NotEnoughData);
    }
    let lengths: Vec<usize> = columns.iter().map(|col| col.len()).collect();
    check_lengths(xs.len(), &lengths)?;
    check_increasing(xs)?;

    let brackets: Vec<Bracket> = xs_new
        .iter()
        .map(|&x| make_bracket(xs, x, policy))
        .collect();

    Ok(columns
        .iter()
        .map(|ys| brackets.iter().map(|&b| eval_bracket(b, ys)).collect())
        .collect())
}

/// Interpolate a single variable onto new coordinates.
///
/// See `interpolate_many` for the requirements on the inputs.
pub fn interpolate(
    xs: &[f64],
    ys: &[f64],
    xs_new: &[f64],
    policy: OutOfBounds,
) -> Result<Vec<f64>> {
    interpolate_many(xs, &[ys], xs_new, policy).map(|mut cols| cols.remove(0))
}

/// Build a uniformly spaced coordinate running from `lower` up to, but not past, `upper`.
///
/// An `upper` below `lower` gives an empty grid.
pub fn uniform_grid(lower: f64, upper: f64, spacing: f64) -> Result<Vec<f64>> {
    if !(spacing > 0.0) || !spacing.is_finite() {
        return Err(AnalysisError::InvalidGridSpacing);
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(AnalysisError::InvalidInput);
    }
    if upper < lower {
        return Ok(vec![]);
    }

    // Small tolerance so an `upper` sitting exactly on the grid is not lost to rounding.
    let steps = ((upper - lower) / spacing + 1.0e-9).floor() as usize;
    Ok((0..=steps)
        .map(|i| (lower + i as f64 * spacing).min(upper))
        .collect())
}

//! Find regions of reduced static stability in a potential temperature profile.
//!
//! A region is a run of levels where the average potential temperature gradient is below a
//! reference gradient and no sub-layer at least `window_depth` deep has an average gradient of
//! twice the reference or more. Every start level is expanded into all the regions that begin
//! there, and then the strongest regions are picked greedily until none that don't overlap are
//! left.
use crate::error::{check_increasing, check_lengths, Result};

/// Parameters for the stability region search. Heights are in km and gradients in K/km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSearch {
    /// Reference potential temperature gradient.
    pub ref_gradient: f64,
    /// Depth of the sub-layers checked against twice the reference gradient. Also the minimum
    /// depth of a region.
    pub window_depth: f64,
}

impl Default for RegionSearch {
    fn default() -> Self {
        RegionSearch {
            ref_gradient: 1.125,
            window_depth: 0.2,
        }
    }
}

impl RegionSearch {
    /// Search with the given reference gradient and the default 0.2 km sub-layer depth.
    pub fn new(ref_gradient: f64) -> Self {
        RegionSearch {
            ref_gradient,
            ..Self::default()
        }
    }
}

/// A region of reduced static stability, described by indexes into the profile it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityRegion {
    /// Index of the bottom level.
    pub start: usize,
    /// Index of the top level.
    pub end: usize,
    /// Depth in km.
    pub depth: f64,
    /// Average potential temperature gradient in K/km.
    pub gradient: f64,
    /// Score used to choose between overlapping regions, deeper and less stable is stronger.
    pub strength: f64,
}

impl StabilityRegion {
    /// Whether two regions share any level, including a shared end point.
    pub fn overlaps(&self, other: &StabilityRegion) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[inline]
fn gradient(height: &[f64], theta: &[f64], bottom: usize, top: usize) -> f64 {
    (theta[top] - theta[bottom]) / (height[top] - height[bottom])
}

/// Find the highest level that could be the top of a region starting at `start`.
///
/// Moving up from `start`, each level is checked with the thinnest layer ending there that is at
/// least `window_depth` deep. The search stops below the first level where that layer's gradient
/// reaches twice the reference gradient. If the first layer checked above `start` fails, no region
/// can start there and `start` is returned. On an irregular grid the bottom of the layer may still
/// be `start` after some layers have passed, so what matters is whether any layer passed.
pub fn seek_region_top(
    height: &[f64],
    theta: &[f64],
    start: usize,
    search: &RegionSearch,
) -> usize {
    let limit = 2.0 * search.ref_gradient;
    let depth = search.window_depth;

    let mut bottom = start;
    let mut passed_any = false;
    for top in start + 1..height.len() {
        while bottom + 1 < top && height[top] - height[bottom + 1] >= depth {
            bottom += 1;
        }

        if height[top] - height[bottom] < depth {
            continue;
        }

        // NaN gradients count as too steep.
        if !(gradient(height, theta, bottom, top) < limit) {
            return if passed_any { top - 1 } else { start };
        }
        passed_any = true;
    }

    height.len().saturating_sub(1)
}

/// Every possible region in the profile, in order of start level and then from the highest top
/// down.
pub fn candidate_regions(
    height: &[f64],
    theta: &[f64],
    search: &RegionSearch,
) -> Vec<StabilityRegion> {
    let g_ref = search.ref_gradient;
    let mut candidates = vec![];

    for start in 0..height.len().saturating_sub(1) {
        let highest = seek_region_top(height, theta, start, search);

        for end in (start + 1..=highest).rev() {
            let depth = height[end] - height[start];
            if depth < search.window_depth {
                break;
            }

            let d_theta = theta[end] - theta[start];
            let gradient = d_theta / depth;
            if gradient < g_ref {
                candidates.push(StabilityRegion {
                    start,
                    end,
                    depth,
                    gradient,
                    strength: 4.0 * g_ref * depth - d_theta,
                });
            }
        }
    }

    candidates
}

/// Greedily pick the strongest candidate, drop everything overlapping it, and repeat.
///
/// Equal strengths go to whichever candidate came first. The result never overlaps, but it isn't
/// guaranteed to cover the most of the profile possible. It is in the order the regions were
/// picked, strongest first.
pub fn select_regions(candidates: &[StabilityRegion]) -> Vec<StabilityRegion> {
    let mut active = vec![true; candidates.len()];
    let mut selected = vec![];

    loop {
        let best = candidates
            .iter()
            .enumerate()
            .filter(|&(i, _)| active[i])
            .fold(None, |best: Option<usize>, (i, cand)| match best {
                Some(b) if candidates[b].strength >= cand.strength => best,
                _ => Some(i),
            });

        let chosen = match best {
            Some(b) => candidates[b],
            None => break,
        };

        for (flag, cand) in active.iter_mut().zip(candidates) {
            if *flag && cand.overlaps(&chosen) {
                *flag = false;
            }
        }

        selected.push(chosen);
    }

    selected
}

/// Find the regions of reduced static stability in a profile of potential temperature (K)
/// against strictly increasing height (km).
///
/// Profiles that are too short, or have nothing that qualifies, give an empty list.
pub fn find_stability_regions(
    height: &[f64],
    theta: &[f64],
    search: &RegionSearch,
) -> Result<Vec<StabilityRegion>> {
    check_lengths(height.len(), &[theta.len()])?;
    if height.len() < 3 {
        return Ok(vec![]);
    }
    check_increasing(height)?;

    let candidates = candidate_regions(height, theta, search);
    Ok(select_regions(&candidates))
}

/// Mark how much each level of a profile lies within a set of layers.
///
/// `layers` are `(bottom, top)` pairs in the same units as `height`, usually regions found in a
/// different profile. Levels inside a layer get 1. The level just outside each end of a layer gets
/// the fraction of its grid interval toward the layer that the layer covers, and every other level
/// gets 0. Where layers overlap the largest value wins.
pub fn layer_mask(height: &[f64], layers: &[(f64, f64)]) -> Vec<f64> {
    let mut mask = vec![0.0; height.len()];

    for &(bottom, top) in layers {
        for (i, &z) in height.iter().enumerate() {
            let val = if z >= bottom && z <= top {
                1.0
            } else if z < bottom {
                match height.get(i + 1) {
                    Some(&above) if above >= bottom => coverage(z, above, bottom, top),
                    _ => 0.0,
                }
            } else {
                match i.checked_sub(1).map(|j| height[j]) {
                    Some(below) if below <= top => coverage(below, z, bottom, top),
                    _ => 0.0,
                }
            };

            if val > mask[i] {
                mask[i] = val;
            }
        }
    }

    mask
}

// Fraction of the interval from lower to upper inside the layer.
#[inline]
fn coverage(lower: f64, upper: f64, bottom: f64, top: f64) -> f64 {
    ((upper.min(top) - lower.max(bottom)) / (upper - lower)).max(0.0)
}

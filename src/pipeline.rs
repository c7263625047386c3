//! Run the full analysis on raw ascents.
//!
//! Each ascent is converted to a profile, put on a uniform height grid, and has its potential
//! temperature calculated and smoothed. The tropopause is located from the temperature profile,
//! everything at and above it is dropped, and the remaining potential temperature profile is
//! searched for regions of reduced stability.
use crate::climatology::ReferenceHeights;
use crate::error::{AnalysisError, Result};
use crate::profile::Profile;
use crate::records::{AscentSummary, RegionRecord};
use crate::smoothing::Filter;
use crate::source::RawAscent;
use crate::stability::{find_stability_regions, layer_mask, RegionSearch, StabilityRegion};
use crate::tropopause::{find_tropopause, Tropopause, TropopauseSearch};
use crate::utility::unpack_all;
use metfor::Meters;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Settings for the analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    grid_spacing: Meters,
    filter: Filter,
    smooth_all_fields: bool,
    tropopause: TropopauseSearch,
    regions: RegionSearch,
    reference_heights: ReferenceHeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            grid_spacing: Meters(10.0),
            filter: Filter::default(),
            smooth_all_fields: false,
            tropopause: TropopauseSearch::default(),
            regions: RegionSearch::default(),
            reference_heights: ReferenceHeights::default(),
        }
    }
}

impl PipelineConfig {
    /// The default configuration, a 10 m grid and a 200 m Gaussian applied to potential
    /// temperature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the vertical grid spacing.
    ///
    /// A Gaussian filter is always applied with the grid spacing.
    pub fn with_grid_spacing(self, grid_spacing: Meters) -> Self {
        Self {
            grid_spacing,
            ..self
        }
    }

    /// Builder method to set the smoothing filter.
    pub fn with_filter(self, filter: Filter) -> Self {
        Self { filter, ..self }
    }

    /// Builder method to smooth every variable, not just the potential temperature. The
    /// tropopause is then found from the smoothed temperature.
    pub fn with_smooth_all_fields(self, smooth_all_fields: bool) -> Self {
        Self {
            smooth_all_fields,
            ..self
        }
    }

    /// Builder method to set the tropopause search parameters.
    pub fn with_tropopause_search(self, tropopause: TropopauseSearch) -> Self {
        Self { tropopause, ..self }
    }

    /// Builder method to set the stability region search parameters.
    pub fn with_region_search(self, regions: RegionSearch) -> Self {
        Self { regions, ..self }
    }

    /// Builder method to set the climatological tropopause heights.
    pub fn with_reference_heights(self, reference_heights: ReferenceHeights) -> Self {
        Self {
            reference_heights,
            ..self
        }
    }

    /// Vertical grid spacing.
    pub fn grid_spacing(&self) -> Meters {
        self.grid_spacing
    }

    /// The smoothing filter, adjusted to the grid spacing.
    pub fn filter(&self) -> Filter {
        self.filter.with_spacing(self.grid_spacing.0)
    }

    /// Whether every variable is smoothed.
    pub fn smooth_all_fields(&self) -> bool {
        self.smooth_all_fields
    }

    /// Tropopause search parameters.
    pub fn tropopause_search(&self) -> &TropopauseSearch {
        &self.tropopause
    }

    /// Stability region search parameters.
    pub fn region_search(&self) -> &RegionSearch {
        &self.regions
    }

    /// Climatological tropopause heights.
    pub fn reference_heights(&self) -> &ReferenceHeights {
        &self.reference_heights
    }
}

/// The analysis of one ascent.
#[derive(Debug, Clone)]
pub struct AscentAnalysis {
    profile: Profile,
    tropopause: Tropopause,
    regions: Vec<StabilityRegion>,
    records: Vec<RegionRecord>,
    summary: AscentSummary,
}

impl AscentAnalysis {
    /// The gridded and smoothed profile, cut off below the tropopause.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The tropopause search result. Its lapse rates cover the full gridded profile.
    pub fn tropopause(&self) -> &Tropopause {
        &self.tropopause
    }

    /// The regions of reduced stability, strongest first.
    pub fn regions(&self) -> &[StabilityRegion] {
        &self.regions
    }

    /// One record per region, in the same order as `regions`.
    pub fn region_records(&self) -> &[RegionRecord] {
        &self.records
    }

    /// Summary of the ascent.
    pub fn summary(&self) -> &AscentSummary {
        &self.summary
    }

    /// Mask the levels of a height profile by the regions found here, see `layer_mask`.
    ///
    /// The heights can come from another profile, e.g. a model run of the same ascent.
    pub fn region_mask(&self, height: &[Meters]) -> Vec<f64> {
        let layers: Vec<(f64, f64)> = self
            .records
            .iter()
            .map(|rec| (rec.bottom.height.0, rec.top.height.0))
            .collect();

        layer_mask(&unpack_all(height), &layers)
    }
}

/// Analyze a single ascent.
///
/// A missing tropopause is not an error, the analysis comes back with a `NotFound` status and no
/// regions. The same goes for an ascent with too few levels on the grid to search. Errors are
/// reserved for ascents that can't be analyzed at all, like one with no usable samples or a
/// height that doesn't increase.
pub fn analyze_ascent(raw: &RawAscent, config: &PipelineConfig) -> Result<AscentAnalysis> {
    let station = raw.station();
    let filter = config.filter();

    let profile = raw
        .to_profile()?
        .regrid(config.grid_spacing)?
        .with_potential_temperature();
    debug!(station, levels = profile.len(), "gridded profile");

    if profile.len() < MIN_LEVELS {
        debug!(station, levels = profile.len(), "too few levels to analyze");
        let tropopause = Tropopause::not_found(profile.len());
        return finish(station, profile.truncated(0), tropopause, vec![], config);
    }

    let profile = if config.smooth_all_fields {
        profile.filter_fields(&filter)?
    } else {
        profile.smooth_theta(&filter)?
    };

    let tropopause = find_tropopause(
        &unpack_all(profile.temperature_profile()),
        &unpack_all(profile.height_profile()),
        &config.tropopause,
    )?;
    debug!(
        station,
        status = %tropopause.status(),
        height = ?tropopause.height().into_option(),
        "tropopause search"
    );

    let profile = profile.truncated(tropopause.index().unwrap_or(0));

    let regions = find_stability_regions(
        &profile.height_km(),
        &unpack_all(profile.theta_profile()),
        &config.regions,
    )?;

    finish(station, profile, tropopause, regions, config)
}

// Fewest levels the tropopause search can work with.
const MIN_LEVELS: usize = 3;

fn finish(
    station: i32,
    profile: Profile,
    tropopause: Tropopause,
    regions: Vec<StabilityRegion>,
    config: &PipelineConfig,
) -> Result<AscentAnalysis> {
    let records = regions
        .iter()
        .map(|region| make_record(&profile, &tropopause, region))
        .collect::<Result<Vec<_>>>()?;

    let summary = AscentSummary {
        station,
        valid_time: profile.valid_time(),
        tropopause_height: tropopause.height(),
        status: tropopause.status(),
        above_reference: config
            .reference_heights
            .is_above(station, tropopause.height()),
        region_count: regions.len(),
    };

    info!(
        station,
        status = %tropopause.status(),
        regions = regions.len(),
        "analyzed ascent"
    );

    Ok(AscentAnalysis {
        profile,
        tropopause,
        regions,
        records,
        summary,
    })
}

fn make_record(
    profile: &Profile,
    tropopause: &Tropopause,
    region: &StabilityRegion,
) -> Result<RegionRecord> {
    let bottom = profile
        .point(region.start)
        .ok_or(AnalysisError::InvalidInput)?;
    let top = profile.point(region.end).ok_or(AnalysisError::InvalidInput)?;
    let middle = profile.point_at_height(Meters(0.5 * (bottom.height.0 + top.height.0)))?;

    let station = profile.station_info();

    Ok(RegionRecord {
        station: station.station_num(),
        location: station.location(),
        valid_time: profile.valid_time(),
        launch_time: profile.launch_time(),
        tropopause_height: tropopause.height(),
        region: *region,
        bottom,
        top,
        middle,
    })
}

/// Analyze many ascents in parallel.
///
/// Results are in the same order as the input. A failed ascent is logged and its error is kept in
/// place, it doesn't stop the rest of the batch.
pub fn analyze_batch(
    ascents: &[RawAscent],
    config: &PipelineConfig,
) -> Vec<Result<AscentAnalysis>> {
    let results: Vec<Result<AscentAnalysis>> = ascents
        .par_iter()
        .map(|raw| {
            let result = analyze_ascent(raw, config);
            if let Err(ref err) = result {
                warn!(station = raw.station(), error = %err, "ascent analysis failed");
            }
            result
        })
        .collect();

    let failed = results.iter().filter(|res| res.is_err()).count();
    info!(ascents = results.len(), failed, "finished batch");

    results
}

/// Analyze alternative sources for the same ascent, in order of preference, until one has a
/// tropopause.
///
/// Typically the candidates are a sonde, then a model analysis, then a forecast. If none of them
/// has a tropopause the last successful analysis is returned, and if none succeeded the last
/// error.
pub fn analyze_with_fallback(
    candidates: &[RawAscent],
    config: &PipelineConfig,
) -> Result<AscentAnalysis> {
    let mut fallback: Option<AscentAnalysis> = None;
    let mut last_err = AnalysisError::NoDataProfile;

    for raw in candidates {
        match analyze_ascent(raw, config) {
            Ok(analysis) if analysis.tropopause().status().is_found() => return Ok(analysis),
            Ok(analysis) => {
                debug!(
                    station = raw.station(),
                    source = raw.description().unwrap_or("unknown"),
                    "no tropopause, trying next source"
                );
                fallback = Some(analysis);
            }
            Err(err) => {
                debug!(
                    station = raw.station(),
                    source = raw.description().unwrap_or("unknown"),
                    error = %err,
                    "analysis failed, trying next source"
                );
                last_err = err;
            }
        }
    }

    fallback.ok_or(last_err)
}

#![warn(missing_docs)]
//! Functions and data types for finding the tropopause and regions of reduced static stability
//! in radiosonde and model ascents.
//!
//! Raw ascents are converted to typed profiles, interpolated onto a uniform height grid, and have
//! their potential temperature computed and smoothed. The tropopause is located with the WMO lapse
//! rate definition, and below it the potential temperature profile is searched for layers where
//! the gradient falls below a reference value.
//!
//! # Examples
//!
//! ```rust
//! use rrss_analysis::{analyze_ascent, PipelineConfig, ProfileSource, RawAscent, RawRow};
//!
//! // A dry adiabatic layer over an isothermal layer.
//! let rows: Vec<RawRow> = (0..=100)
//!     .map(|i| {
//!         let height = f64::from(i) * 100.0;
//!         let temperature = if height <= 5_000.0 {
//!             300.0 - 0.0098 * height
//!         } else {
//!             251.0
//!         };
//!         RawRow {
//!             station: 71917,
//!             pressure: 100_000.0 * (-height / 8_000.0).exp(),
//!             temperature,
//!             dew_point_depression: 2.0,
//!             height,
//!             longitude: -85.93,
//!             latitude: 79.98,
//!             time: 0.0,
//!         }
//!     })
//!     .collect();
//!
//! let raw = RawAscent::new(71917, ProfileSource::Standard, rows);
//! let analysis = analyze_ascent(&raw, &PipelineConfig::default()).unwrap();
//!
//! assert!(analysis.tropopause().status().is_found());
//! for record in analysis.region_records() {
//!     println!("{}", record);
//! }
//! ```

//
// API
//
pub use crate::{
    climatology::ReferenceHeights,
    compare::{
        field_differences, profile_differences, ComparedField, FieldDifference,
        ProfileDifferences,
    },
    error::{AnalysisError, Result},
    interpolation::{interpolate, interpolate_many, uniform_grid, OutOfBounds},
    pipeline::{
        analyze_ascent, analyze_batch, analyze_with_fallback, AscentAnalysis, PipelineConfig,
    },
    profile::{Profile, ProfilePoint, StationInfo},
    records::{write_region_records, write_summaries, AscentSummary, RegionRecord},
    smoothing::{gaussian_smooth, gaussian_weights, savitzky_golay, Filter},
    source::{split_stations, ProfileSource, RawAscent, RawRow},
    stability::{
        candidate_regions, find_stability_regions, layer_mask, seek_region_top, select_regions,
        RegionSearch, StabilityRegion,
    },
    thermo::{
        brunt_vaisala_squared, dew_point, fractional_humidity_gradient, gravity,
        relative_humidity, relative_humidity_profile, specific_humidity_gradient,
        specific_humidity_profile, theta_gradient, theta_profile, WaterPhase,
    },
    tropopause::{
        find_tropopause, lapse_rate_profile, Tropopause, TropopauseSearch, TropopauseStatus,
    },
};

//
// Internal use only
//

// 3rd party libs
#[macro_use]
extern crate itertools;

// Modules
mod climatology;
mod compare;
mod error;
mod interpolation;
mod pipeline;
mod profile;
mod records;
mod smoothing;
mod source;
mod stability;
#[cfg(test)]
mod test_data;
mod thermo;
mod tropopause;
mod utility;

//! Raw ascent records and their conversion into profiles.
//!
//! Raw data arrives as flat rows tagged with a station id, in SI units with negative sentinels for
//! missing values. How missing values are handled depends on where the data came from, which is
//! captured by `ProfileSource`.
use crate::error::{AnalysisError, Result};
use crate::interpolation::{interpolate, OutOfBounds};
use crate::profile::{Profile, StationInfo};
use chrono::NaiveDateTime;
use metfor::{CelsiusDiff, HectoPascal, Kelvin, Meters};
use optional::Optioned;
use std::collections::HashMap;
use std::fmt::{self, Display};
use strum_macros::EnumIter;
use tracing::debug;

/// One raw sample from an ascent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRow {
    /// WMO station number.
    pub station: i32,
    /// Pressure in Pa, negative when missing.
    pub pressure: f64,
    /// Temperature in K, negative when missing.
    pub temperature: f64,
    /// Dew point depression in K.
    pub dew_point_depression: f64,
    /// Height above sea level in m, negative when missing.
    pub height: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Launch time in seconds.
    pub time: f64,
}

/// The format of the data source, which decides how missing values are dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ProfileSource {
    /// Samples missing temperature or pressure are dropped, height is always reported.
    Standard,
    /// Height is only reported at some levels. Samples missing pressure are dropped and the
    /// height is filled in from pressure using the levels where it is known.
    Canadian,
}

impl Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let string_rep = match self {
            ProfileSource::Standard => "standard",
            ProfileSource::Canadian => "canadian",
        };

        write!(f, "{}", string_rep)
    }
}

impl ProfileSource {
    /// Select the usable rows and their heights.
    fn prepare<'a>(self, rows: &'a [RawRow]) -> Result<(Vec<&'a RawRow>, Vec<f64>)> {
        match self {
            ProfileSource::Standard => {
                let kept: Vec<&RawRow> = rows
                    .iter()
                    .filter(|r| r.temperature >= 0.0 && r.pressure >= 0.0)
                    .collect();
                let height = kept.iter().map(|r| r.height).collect();
                Ok((kept, height))
            }
            ProfileSource::Canadian => backfill_heights(rows),
        }
    }
}

// Heights are interpolated against -P so the coordinate increases upward. Only levels at or below
// the highest level with a known height are kept, heights are never extrapolated upward.
fn backfill_heights(rows: &[RawRow]) -> Result<(Vec<&RawRow>, Vec<f64>)> {
    let with_pressure: Vec<&RawRow> = rows.iter().filter(|r| r.pressure >= 0.0).collect();

    let (known_coord, known_height): (Vec<f64>, Vec<f64>) = with_pressure
        .iter()
        .filter(|r| r.height >= 0.0)
        .map(|r| (-r.pressure, r.height))
        .unzip();

    let top_pressure = known_coord
        .iter()
        .map(|&c| -c)
        .fold(std::f64::INFINITY, f64::min);
    if !top_pressure.is_finite() {
        return Err(AnalysisError::NoDataProfile);
    }

    let kept: Vec<&RawRow> = with_pressure
        .into_iter()
        .filter(|r| r.temperature >= 0.0 && r.pressure >= top_pressure)
        .collect();
    let coord: Vec<f64> = kept.iter().map(|r| -r.pressure).collect();

    let height = interpolate(&known_coord, &known_height, &coord, OutOfBounds::Clamp)?;
    Ok((kept, height))
}

/// All the raw rows from one station's ascent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAscent {
    station: i32,
    source: ProfileSource,
    description: Option<String>,
    valid_time: Option<NaiveDateTime>,
    rows: Vec<RawRow>,
}

impl RawAscent {
    /// Create a new raw ascent.
    pub fn new(station: i32, source: ProfileSource, rows: Vec<RawRow>) -> Self {
        RawAscent {
            station,
            source,
            description: None,
            valid_time: None,
            rows,
        }
    }

    /// Builder method to set the valid time, usually the date of the file the rows came from.
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Builder method to describe where the data came from, eg "sonde" or "analysis".
    pub fn with_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.description = Option::from(desc);
        self
    }

    /// WMO station number.
    pub fn station(&self) -> i32 {
        self.station
    }

    /// Format of the source data.
    pub fn source(&self) -> ProfileSource {
        self.source
    }

    /// Description of where the data came from.
    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(|s| s.as_ref())
    }

    /// The valid time.
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// The raw rows.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Convert to a profile, dropping unusable samples and converting to working units.
    ///
    /// Location and launch time are taken from the lowest sample that was kept.
    pub fn to_profile(&self) -> Result<Profile> {
        let (kept, height) = self.source.prepare(&self.rows)?;
        if kept.is_empty() {
            return Err(AnalysisError::NoDataProfile);
        }

        debug!(
            station = self.station,
            source = %self.source,
            kept = kept.len(),
            discarded = self.rows.len() - kept.len(),
            "prepared raw ascent"
        );

        let pressure = kept.iter().map(|r| HectoPascal(r.pressure / 100.0)).collect();
        let temperature = kept.iter().map(|r| Kelvin(r.temperature)).collect();
        let dpd = kept
            .iter()
            .map(|r| CelsiusDiff(r.dew_point_depression))
            .collect();
        let height = height.into_iter().map(Meters).collect();

        let (location, launch_time) = match kept.first() {
            Some(first) => (
                Some((first.latitude, first.longitude)),
                launch_seconds(first.time),
            ),
            None => (None, Optioned::default()),
        };

        Ok(Profile::from_columns(pressure, temperature, dpd, height)?
            .with_source_description(self.description.clone())
            .with_station_info(StationInfo::new_with_values(self.station, location))
            .with_valid_time(self.valid_time)
            .with_launch_time(launch_time))
    }
}

fn launch_seconds(time: f64) -> Optioned<i64> {
    if time.is_finite() {
        Optioned::from(time.round() as i64)
    } else {
        Optioned::default()
    }
}

/// Split flat rows into one ascent per station, in the order of `stations`.
///
/// Rows keep their relative order. Rows from stations that are not listed are ignored, and
/// listed stations with no rows are skipped.
pub fn split_stations(rows: &[RawRow], stations: &[i32], source: ProfileSource) -> Vec<RawAscent> {
    let mut by_station: HashMap<i32, Vec<RawRow>> = HashMap::new();
    for row in rows {
        by_station.entry(row.station).or_default().push(*row);
    }

    stations
        .iter()
        .filter_map(|&stn| {
            by_station
                .remove(&stn)
                .map(|stn_rows| RawAscent::new(stn, source, stn_rows))
        })
        .collect()
}

//! Data type and methods to store a single ascent profile.

use crate::error::{check_increasing, check_lengths, AnalysisError, Result};
use crate::interpolation::{interpolate_many, uniform_grid, OutOfBounds};
use crate::smoothing::Filter;
use crate::thermo;
use crate::utility::{pack_all, unpack_all};
use chrono::NaiveDateTime;
use metfor::{CelsiusDiff, HectoPascal, Kelvin, Km, Meters};
use optional::Optioned;

pub use self::{profile_point::ProfilePoint, station_info::StationInfo};

/// A vertical profile from one ascent.
///
/// The variables are stored in parallel vectors ordered from the bottom up, with a strictly
/// increasing height. Missing values are `NaN`. Potential temperature is derived, so until
/// `with_potential_temperature` is called that vector has length 0.
#[derive(Clone, Debug, Default)]
pub struct Profile {
    // Description of the source of the profile, eg sonde or model analysis.
    source: Option<String>,

    // Station info
    station: StationInfo,

    // Valid time of the ascent
    valid_time: Option<NaiveDateTime>,
    // Launch time in seconds, as reported by the data source.
    launch_time: Optioned<i64>,

    // Profiles
    pressure: Vec<HectoPascal>,
    temperature: Vec<Kelvin>,
    dew_point_depression: Vec<CelsiusDiff>,
    height: Vec<Meters>,
    theta: Vec<Kelvin>,
}

impl Profile {
    /// Create a profile from its columns.
    ///
    /// All of the columns must have the same length and the height must be strictly increasing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{CelsiusDiff, HectoPascal, Kelvin, Meters};
    /// use rrss_analysis::Profile;
    ///
    /// let prof = Profile::from_columns(
    ///     vec![HectoPascal(1000.0), HectoPascal(900.0)],
    ///     vec![Kelvin(288.0), Kelvin(281.0)],
    ///     vec![CelsiusDiff(2.0), CelsiusDiff(4.0)],
    ///     vec![Meters(100.0), Meters(1000.0)],
    /// )
    /// .unwrap();
    /// assert_eq!(prof.len(), 2);
    ///
    /// let bad = Profile::from_columns(
    ///     vec![HectoPascal(1000.0), HectoPascal(900.0)],
    ///     vec![Kelvin(288.0), Kelvin(281.0)],
    ///     vec![CelsiusDiff(2.0), CelsiusDiff(4.0)],
    ///     vec![Meters(1000.0), Meters(100.0)],
    /// );
    /// assert!(bad.is_err());
    /// ```
    pub fn from_columns(
        pressure: Vec<HectoPascal>,
        temperature: Vec<Kelvin>,
        dew_point_depression: Vec<CelsiusDiff>,
        height: Vec<Meters>,
    ) -> Result<Self> {
        if height.is_empty() {
            return Err(AnalysisError::NoDataProfile);
        }
        check_lengths(
            height.len(),
            &[pressure.len(), temperature.len(), dew_point_depression.len()],
        )?;
        check_increasing(&unpack_all(&height))?;

        Ok(Profile {
            pressure,
            temperature,
            dew_point_depression,
            height,
            ..Profile::default()
        })
    }

    /// Add a source description to this profile.
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this profile.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.as_ref())
    }

    /// Builder function for setting the station info.
    #[inline]
    pub fn with_station_info(mut self, new_value: StationInfo) -> Self {
        self.station = new_value;
        self
    }

    /// Get the station info
    #[inline]
    pub fn station_info(&self) -> &StationInfo {
        &self.station
    }

    /// Builder method to set the valid time of the profile.
    ///
    /// # Examples
    /// ```rust
    /// use rrss_analysis::Profile;
    /// use chrono::NaiveDate;
    ///
    /// let vtime = NaiveDate::from_ymd(2019, 1, 1).and_hms(12, 0, 0);
    /// let _prof = Profile::default().with_valid_time(vtime);
    /// let _prof = Profile::default().with_valid_time(Some(vtime));
    /// ```
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Valid time of the profile.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    /// Builder method to set the launch time, in seconds.
    #[inline]
    pub fn with_launch_time<T>(mut self, launch_time: T) -> Self
    where
        Optioned<i64>: From<T>,
    {
        self.launch_time = Optioned::from(launch_time);
        self
    }

    /// Launch time in seconds.
    #[inline]
    pub fn launch_time(&self) -> Optioned<i64> {
        self.launch_time
    }

    /// Number of levels in the profile.
    #[inline]
    pub fn len(&self) -> usize {
        self.height.len()
    }

    /// Whether the profile has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height.is_empty()
    }

    /// Get the pressure profile
    #[inline]
    pub fn pressure_profile(&self) -> &[HectoPascal] {
        &self.pressure
    }

    /// Get the temperature profile
    #[inline]
    pub fn temperature_profile(&self) -> &[Kelvin] {
        &self.temperature
    }

    /// Get the dew point depression profile
    #[inline]
    pub fn dew_point_depression_profile(&self) -> &[CelsiusDiff] {
        &self.dew_point_depression
    }

    /// Get the height profile
    #[inline]
    pub fn height_profile(&self) -> &[Meters] {
        &self.height
    }

    /// Get the potential temperature profile, empty until it has been calculated.
    #[inline]
    pub fn theta_profile(&self) -> &[Kelvin] {
        &self.theta
    }

    /// The height profile in km.
    pub fn height_km(&self) -> Vec<f64> {
        self.height.iter().map(|&z| Km::from(z).0).collect()
    }

    /// Calculate the potential temperature at every level.
    pub fn with_potential_temperature(mut self) -> Self {
        self.theta = thermo::theta_profile(&self);
        self
    }

    /// Interpolate the profile onto a uniform height grid with the given spacing.
    ///
    /// The grid starts at the first multiple of `spacing` at or above the lowest level and ends at
    /// or below the highest level, so no value is extrapolated.
    pub fn regrid(&self, spacing: Meters) -> Result<Self> {
        let height = unpack_all(&self.height);
        let (bottom, top) = match (height.first(), height.last()) {
            (Some(&bottom), Some(&top)) => (bottom, top),
            _ => return Err(AnalysisError::NoDataProfile),
        };

        let dz = spacing.0;
        let grid = uniform_grid((bottom / dz).ceil() * dz, top, dz)?;

        let pressure = unpack_all(&self.pressure);
        let temperature = unpack_all(&self.temperature);
        let dew_point_depression = unpack_all(&self.dew_point_depression);
        let theta = unpack_all(&self.theta);

        let mut columns: Vec<&[f64]> =
            vec![&pressure[..], &temperature[..], &dew_point_depression[..]];
        let has_theta = !theta.is_empty();
        if has_theta {
            columns.push(&theta[..]);
        }

        let mut vals = interpolate_many(&height, &columns, &grid, OutOfBounds::Missing)?;
        let theta = if has_theta {
            vals.pop().unwrap_or_default()
        } else {
            vec![]
        };
        let dew_point_depression = vals.pop().unwrap_or_default();
        let temperature = vals.pop().unwrap_or_default();
        let pressure = vals.pop().unwrap_or_default();

        Ok(Profile {
            pressure: pack_all(&pressure),
            temperature: pack_all(&temperature),
            dew_point_depression: pack_all(&dew_point_depression),
            height: pack_all(&grid),
            theta: pack_all(&theta),
            ..self.clone()
        })
    }

    /// Smooth the potential temperature profile.
    ///
    /// The potential temperature must already have been calculated.
    pub fn smooth_theta(mut self, filter: &Filter) -> Result<Self> {
        if self.theta.is_empty() {
            return Err(AnalysisError::MissingValue);
        }

        self.theta = pack_all(&filter.apply(&unpack_all(&self.theta))?);
        Ok(self)
    }

    /// Smooth every variable except the height.
    pub fn filter_fields(mut self, filter: &Filter) -> Result<Self> {
        self.pressure = pack_all(&filter.apply(&unpack_all(&self.pressure))?);
        self.temperature = pack_all(&filter.apply(&unpack_all(&self.temperature))?);
        self.dew_point_depression =
            pack_all(&filter.apply(&unpack_all(&self.dew_point_depression))?);
        if !self.theta.is_empty() {
            self.theta = pack_all(&filter.apply(&unpack_all(&self.theta))?);
        }

        Ok(self)
    }

    /// Keep only the lowest `len` levels.
    pub fn truncated(mut self, len: usize) -> Self {
        self.pressure.truncate(len);
        self.temperature.truncate(len);
        self.dew_point_depression.truncate(len);
        self.height.truncate(len);
        self.theta.truncate(len);
        self
    }

    /// Get the values at one level.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{CelsiusDiff, HectoPascal, Kelvin, Meters};
    /// use rrss_analysis::Profile;
    ///
    /// let prof = Profile::from_columns(
    ///     vec![HectoPascal(1000.0), HectoPascal(900.0)],
    ///     vec![Kelvin(288.0), Kelvin(281.0)],
    ///     vec![CelsiusDiff(2.0), CelsiusDiff(4.0)],
    ///     vec![Meters(100.0), Meters(1000.0)],
    /// )
    /// .unwrap()
    /// .with_potential_temperature();
    ///
    /// let pnt = prof.point(1).unwrap();
    /// assert_eq!(pnt.temperature, Kelvin(281.0));
    /// assert_eq!(pnt.height, Meters(1000.0));
    /// assert!(pnt.theta > pnt.temperature);
    ///
    /// assert!(prof.point(2).is_none()); // There weren't that many levels!
    /// ```
    pub fn point(&self, idx: usize) -> Option<ProfilePoint> {
        if idx >= self.len() {
            return None;
        }

        Some(ProfilePoint {
            temperature: self.temperature[idx],
            dew_point_depression: self.dew_point_depression[idx],
            height: self.height[idx],
            theta: self.theta.get(idx).copied().unwrap_or(Kelvin(std::f64::NAN)),
        })
    }

    /// Interpolate the values at a height, heights outside the profile take the nearest end value.
    pub fn point_at_height(&self, target: Meters) -> Result<ProfilePoint> {
        let height = unpack_all(&self.height);
        let temperature = unpack_all(&self.temperature);
        let dew_point_depression = unpack_all(&self.dew_point_depression);
        let theta = if self.theta.is_empty() {
            vec![std::f64::NAN; height.len()]
        } else {
            unpack_all(&self.theta)
        };

        let vals = interpolate_many(
            &height,
            &[&temperature[..], &dew_point_depression[..], &theta[..]],
            &[target.0],
            OutOfBounds::Clamp,
        )?;

        Ok(ProfilePoint {
            temperature: Kelvin(vals[0][0]),
            dew_point_depression: CelsiusDiff(vals[1][0]),
            height: target,
            theta: Kelvin(vals[2][0]),
        })
    }
}

mod profile_point;
mod station_info;

//! Climatological tropopause heights used to flag ascents with an unusually high tropopause.
use crate::error::{AnalysisError, Result};
use metfor::{Km, Meters};
use optional::Optioned;
use std::collections::HashMap;
use std::str::FromStr;

/// Reference tropopause heights by station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceHeights {
    heights: HashMap<i32, Meters>,
}

impl ReferenceHeights {
    /// An empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a station.
    pub fn with_station(mut self, station: i32, height: Meters) -> Self {
        self.insert(station, height);
        self
    }

    /// Add or replace a station's reference height.
    pub fn insert(&mut self, station: i32, height: Meters) {
        self.heights.insert(station, height);
    }

    /// Reference height for a station.
    pub fn get(&self, station: i32) -> Option<Meters> {
        self.heights.get(&station).copied()
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether there are no stations.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Whether `height` is above the station's reference height.
    ///
    /// `None` if the station has no reference or the height is missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use optional::{none, some};
    /// use metfor::Meters;
    /// use rrss_analysis::ReferenceHeights;
    ///
    /// let refs = ReferenceHeights::new().with_station(71917, Meters(9_000.0));
    ///
    /// assert_eq!(refs.is_above(71917, some(Meters(9_500.0))), Some(true));
    /// assert_eq!(refs.is_above(71917, some(Meters(8_500.0))), Some(false));
    /// assert_eq!(refs.is_above(71917, none()), None);
    /// assert_eq!(refs.is_above(71924, some(Meters(9_500.0))), None);
    /// ```
    pub fn is_above(&self, station: i32, height: Optioned<Meters>) -> Option<bool> {
        let reference = self.get(station)?;
        let height = height.into_option()?;
        Some(height > reference)
    }
}

impl FromStr for ReferenceHeights {
    type Err = AnalysisError;

    /// Parse lines of `station mean median`, with heights in km.
    ///
    /// The mean is used as the reference. Blank lines and lines starting with `#` are skipped.
    fn from_str(s: &str) -> Result<Self> {
        let mut refs = ReferenceHeights::new();

        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 {
                return Err(AnalysisError::InvalidInput);
            }

            let station = i32::from_str(tokens[0]).map_err(|_| AnalysisError::InvalidInput)?;
            let mean = f64::from_str(tokens[1]).map_err(|_| AnalysisError::InvalidInput)?;
            f64::from_str(tokens[2]).map_err(|_| AnalysisError::InvalidInput)?;

            refs.insert(station, Meters::from(Km(mean)));
        }

        Ok(refs)
    }
}

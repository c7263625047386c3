/// Station information, identification number and location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StationInfo {
    /// WMO station number, eg 71917
    num: i32,
    /// Latitude and longitude.
    location: Option<(f64, f64)>,
}

impl StationInfo {
    /// Create a new `StationInfo` object.
    ///
    /// # Arguments
    /// station_num: The WMO station identifier.
    ///
    /// location: The latitude and longitude as a tuple, or None.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrss_analysis::StationInfo;
    ///
    /// let _stn = StationInfo::new_with_values(10771, (49.43, 11.90));
    /// let _stn = StationInfo::new_with_values(10771, Some((49.43, 11.90)));
    /// let _stn = StationInfo::new_with_values(10771, None);
    /// ```
    #[inline]
    pub fn new_with_values<U>(station_num: i32, location: U) -> Self
    where
        U: Into<Option<(f64, f64)>>,
    {
        StationInfo {
            num: station_num,
            location: location.into(),
        }
    }

    /// Create a new object for a station with an unknown location.
    #[inline]
    pub fn new(station_num: i32) -> Self {
        Self::new_with_values(station_num, None)
    }

    /// Builder method to add a location.
    #[inline]
    pub fn with_lat_lon<U>(self, coords: U) -> Self
    where
        U: Into<Option<(f64, f64)>>,
    {
        Self {
            location: coords.into(),
            ..self
        }
    }

    /// Station number.
    #[inline]
    pub fn station_num(&self) -> i32 {
        self.num
    }

    /// Station location as latitude and longitude.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rrss_analysis::StationInfo;
    ///
    /// assert!(StationInfo::new(71917).location().is_none());
    /// assert_eq!(
    ///     StationInfo::new(71917).with_lat_lon((79.98, -85.93)).location(),
    ///     Some((79.98, -85.93))
    /// );
    /// ```
    #[inline]
    pub fn location(&self) -> Option<(f64, f64)> {
        self.location
    }
}

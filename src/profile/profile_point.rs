use metfor::{CelsiusDiff, Kelvin, Meters};

/// The values at one level of a profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfilePoint {
    /// Temperature
    pub temperature: Kelvin,
    /// Dew point depression
    pub dew_point_depression: CelsiusDiff,
    /// Height above sea level
    pub height: Meters,
    /// Potential temperature
    pub theta: Kelvin,
}

//! Potential temperature, humidity, and the profiles derived from them.
//!
//! The profile functions take a `Profile` and return a value for every level, with missing values
//! where an input was missing.
use crate::profile::Profile;
use crate::utility::unpack_all;
use metfor::{Celsius, CelsiusDiff, Kelvin, Meters, Quantity, FREEZING};
use optional::{none, some, Optioned};
use strum_macros::EnumIter;

/// Mean radius of the earth in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

// Below this saturation in the mixed phase is taken entirely with respect to ice.
const ICE_ONLY: Celsius = Celsius(-23.0);

/// Acceleration due to gravity, m/s², at a height above sea level.
#[inline]
pub fn gravity(height: Meters) -> f64 {
    let ratio = EARTH_RADIUS / (EARTH_RADIUS + height.unpack());
    metfor::g * ratio * ratio
}

/// Calculate a profile of potential temperature from the pressure and temperature profiles.
///
/// Levels missing either pressure or temperature are missing in the result.
pub fn theta_profile(prof: &Profile) -> Vec<Kelvin> {
    izip!(prof.pressure_profile(), prof.temperature_profile())
        .map(|(&p, &t)| metfor::potential_temperature(p, t))
        .collect()
}

/// Get a profile of the potential temperature gradient in K / km.
///
/// Interior levels use a centered difference and the end points a one sided difference. If the
/// profile has no potential temperature the result is empty.
pub fn theta_gradient(prof: &Profile) -> Vec<Optioned<f64>> {
    let theta = prof.theta_profile();
    if theta.is_empty() {
        return vec![];
    }

    per_km(gradient(prof.height_profile(), &unpack_all(theta)))
}

/// Get a profile of the squared Brunt-Väisälä frequency in s⁻².
///
/// Gravity falls off with height above sea level.
pub fn brunt_vaisala_squared(prof: &Profile) -> Vec<Optioned<f64>> {
    let theta = prof.theta_profile();
    if theta.is_empty() {
        return vec![];
    }

    let dtheta_dz = gradient(prof.height_profile(), &unpack_all(theta));
    izip!(dtheta_dz, prof.height_profile(), theta)
        .map(|(dtheta_dz, &z, &th)| {
            dtheta_dz
                .into_option()
                .map(|g| gravity(z) / th.unpack() * g)
                .filter(|n2| n2.is_finite())
                .map_or_else(none, some)
        })
        .collect()
}

/// The phase of water that saturation is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum WaterPhase {
    /// Liquid water at all temperatures.
    Liquid,
    /// Ice at all temperatures.
    Ice,
    /// Liquid water above freezing and ice below -23C, with a quadratic blend in between.
    Mixed,
}

/// Dew point from a temperature and dew point depression.
#[inline]
pub fn dew_point(temperature: Kelvin, dew_point_depression: CelsiusDiff) -> Kelvin {
    Kelvin(temperature.unpack() - dew_point_depression.unpack())
}

/// Relative humidity as a fraction, with respect to the given phase.
///
/// The vapor pressure always comes from the dew point over liquid water, only the saturation
/// vapor pressure depends on the phase.
pub fn relative_humidity(
    temperature: Kelvin,
    dew_point: Kelvin,
    phase: WaterPhase,
) -> Option<f64> {
    let rh = match phase {
        WaterPhase::Liquid => metfor::rh(temperature, dew_point)?,
        WaterPhase::Ice => vapor_pressure_liquid(dew_point) / vapor_pressure_ice(temperature),
        WaterPhase::Mixed => {
            let alpha = liquid_fraction(temperature);
            let saturation = alpha * vapor_pressure_liquid(temperature)
                + (1.0 - alpha) * vapor_pressure_ice(temperature);
            vapor_pressure_liquid(dew_point) / saturation
        }
    };

    if rh.is_finite() {
        Some(rh)
    } else {
        None
    }
}

// Weight given to saturation over liquid water in the mixed phase.
fn liquid_fraction(temperature: Kelvin) -> f64 {
    let t_c = Celsius::from(temperature).unpack();
    let (t_ice, t_frz) = (ICE_ONLY.unpack(), FREEZING.unpack());

    let frac = ((t_c - t_ice) / (t_frz - t_ice)).max(0.0).min(1.0);
    frac * frac
}

// Saturation vapor pressure over liquid water in hPa, Alduchov and Eskridge (1996).
fn vapor_pressure_liquid(temperature: Kelvin) -> f64 {
    let t_c = Celsius::from(temperature).unpack();
    6.1094 * (17.625 * t_c / (t_c + 243.04)).exp()
}

// Saturation vapor pressure over ice in hPa, Alduchov and Eskridge (1996).
fn vapor_pressure_ice(temperature: Kelvin) -> f64 {
    let t_c = Celsius::from(temperature).unpack();
    6.1121 * (22.587 * t_c / (t_c + 273.86)).exp()
}

/// Get a profile of specific humidity in kg / kg.
pub fn specific_humidity_profile(prof: &Profile) -> Vec<Optioned<f64>> {
    izip!(
        prof.pressure_profile(),
        prof.temperature_profile(),
        prof.dew_point_depression_profile()
    )
    .map(|(&p, &t, &dpd)| {
        metfor::specific_humidity(dew_point(t, dpd), p)
            .filter(|q| q.is_finite())
            .map_or_else(none, some)
    })
    .collect()
}

/// Get a profile of relative humidity, as a fraction, with respect to the given phase.
pub fn relative_humidity_profile(prof: &Profile, phase: WaterPhase) -> Vec<Optioned<f64>> {
    izip!(
        prof.temperature_profile(),
        prof.dew_point_depression_profile()
    )
    .map(|(&t, &dpd)| relative_humidity(t, dew_point(t, dpd), phase).map_or_else(none, some))
    .collect()
}

/// Get a profile of the specific humidity gradient in kg / kg / km.
pub fn specific_humidity_gradient(prof: &Profile) -> Vec<Optioned<f64>> {
    let q: Vec<f64> = specific_humidity_profile(prof)
        .into_iter()
        .map(|q| q.unpack())
        .collect();

    per_km(gradient(prof.height_profile(), &q))
}

/// Get a profile of the specific humidity gradient relative to the specific humidity, in 1 / km.
///
/// Levels that are completely dry are missing.
pub fn fractional_humidity_gradient(prof: &Profile) -> Vec<Optioned<f64>> {
    izip!(
        specific_humidity_gradient(prof),
        specific_humidity_profile(prof)
    )
    .map(|(dq_dz, q)| {
        dq_dz
            .into_option()
            .and_then(|dq_dz| q.into_option().map(|q| dq_dz / q))
            .filter(|frac| frac.is_finite())
            .map_or_else(none, some)
    })
    .collect()
}

fn per_km(grad: Vec<Optioned<f64>>) -> Vec<Optioned<f64>> {
    grad.into_iter().map(|g| g.map_t(|g| g * 1000.0)).collect()
}

// dv/dz in units of v per meter.
fn gradient(height: &[Meters], vals: &[f64]) -> Vec<Optioned<f64>> {
    let num = height.len().min(vals.len());
    if num < 2 {
        return vec![none(); num];
    }

    (0..num)
        .map(|i| {
            let below = i.saturating_sub(1);
            let above = (i + 1).min(num - 1);

            let dz = height[above].unpack() - height[below].unpack();
            let grad = (vals[above] - vals[below]) / dz;
            if grad.is_finite() {
                some(grad)
            } else {
                none()
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utility::test_tools::approx_equal;
    use metfor::HectoPascal;
    use strum::IntoEnumIterator;

    fn test_profile() -> Profile {
        let height = vec![Meters(0.0), Meters(1000.0), Meters(2000.0), Meters(3000.0)];
        let pressure = vec![
            HectoPascal(1000.0),
            HectoPascal(900.0),
            HectoPascal(800.0),
            HectoPascal(700.0),
        ];
        let theta = [300.0, 304.0, 308.0, 312.0];
        let temperature = izip!(&theta, &pressure)
            .map(|(&th, &p)| Kelvin::from(metfor::temperature_from_pot_temp(Kelvin(th), p)))
            .collect();
        let dpd = vec![CelsiusDiff(2.0); 4];

        Profile::from_columns(pressure, temperature, dpd, height)
            .unwrap()
            .with_potential_temperature()
    }

    // Constant temperature with the air drying out with height.
    fn drying_profile() -> Profile {
        Profile::from_columns(
            vec![
                HectoPascal(1000.0),
                HectoPascal(900.0),
                HectoPascal(800.0),
                HectoPascal(700.0),
            ],
            vec![Kelvin(280.0); 4],
            vec![
                CelsiusDiff(0.0),
                CelsiusDiff(5.0),
                CelsiusDiff(10.0),
                CelsiusDiff(std::f64::NAN),
            ],
            vec![Meters(0.0), Meters(1000.0), Meters(2000.0), Meters(3000.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_theta_profile() {
        let prof = test_profile();
        for (th, expected) in prof.theta_profile().iter().zip(&[300.0, 304.0, 308.0, 312.0]) {
            assert!(approx_equal(th.unpack(), *expected, 1.0e-6));
        }
    }

    #[test]
    fn test_gravity() {
        assert!(approx_equal(gravity(Meters(0.0)), metfor::g, 1.0e-12));
        assert!(gravity(Meters(10_000.0)) < gravity(Meters(0.0)));

        let ratio = gravity(Meters(10_000.0)) / gravity(Meters(0.0));
        assert!(approx_equal(ratio, 0.996_868, 1.0e-5));
    }

    #[test]
    fn test_theta_gradient() {
        let prof = test_profile();
        let grad = theta_gradient(&prof);
        assert_eq!(grad.len(), 4);
        for g in grad {
            assert!(approx_equal(g.unpack(), 4.0, 1.0e-6));
        }
    }

    #[test]
    fn test_brunt_vaisala() {
        let prof = test_profile();
        let n2 = brunt_vaisala_squared(&prof);
        assert_eq!(n2.len(), 4);

        let expected = gravity(Meters(0.0)) / 300.0 * 0.004;
        assert!(approx_equal(n2[0].unpack(), expected, 1.0e-8));
        assert!(n2.iter().all(|v| v.is_some() && v.unpack() > 0.0));
    }

    #[test]
    fn test_no_theta_is_empty() {
        let prof = Profile::from_columns(
            vec![HectoPascal(1000.0), HectoPascal(900.0)],
            vec![Kelvin(290.0), Kelvin(285.0)],
            vec![CelsiusDiff(1.0), CelsiusDiff(1.0)],
            vec![Meters(0.0), Meters(900.0)],
        )
        .unwrap();

        assert!(theta_gradient(&prof).is_empty());
        assert!(brunt_vaisala_squared(&prof).is_empty());
    }

    #[test]
    fn test_specific_humidity() {
        let q = specific_humidity_profile(&drying_profile());
        assert_eq!(q.len(), 4);

        // Saturated at about 7C and 1000 hPa.
        assert!(q[0].unpack() > 0.005 && q[0].unpack() < 0.008);
        assert!(q[1].unpack() < q[0].unpack());
        assert!(q[2].unpack() < q[1].unpack());
        assert!(q[3].is_none());
    }

    #[test]
    fn test_humidity_gradients() {
        let prof = drying_profile();
        let q = specific_humidity_profile(&prof);
        let dq_dz = specific_humidity_gradient(&prof);
        let frac = fractional_humidity_gradient(&prof);
        assert_eq!(dq_dz.len(), 4);
        assert_eq!(frac.len(), 4);

        let expected = (q[1].unpack() - q[0].unpack()) / 1.0;
        assert!(approx_equal(dq_dz[0].unpack(), expected, 1.0e-12));
        for i in 0..2 {
            assert!(dq_dz[i].unpack() < 0.0);
            assert!(approx_equal(
                frac[i].unpack(),
                dq_dz[i].unpack() / q[i].unpack(),
                1.0e-9
            ));
        }

        // The gradient at the top reaches into the missing level.
        assert!(dq_dz[3].is_none());
        assert!(frac[3].is_none());
    }

    #[test]
    fn test_relative_humidity_phases() {
        let warm = Kelvin(283.15);
        assert!(approx_equal(
            relative_humidity(warm, warm, WaterPhase::Liquid).unwrap(),
            1.0,
            1.0e-6
        ));
        assert!(approx_equal(
            relative_humidity(warm, warm, WaterPhase::Mixed).unwrap(),
            1.0,
            1.0e-12
        ));

        // Air saturated over water is supersaturated over ice.
        let cold = Kelvin(253.15);
        let liquid = relative_humidity(cold, cold, WaterPhase::Liquid).unwrap();
        let mixed = relative_humidity(cold, cold, WaterPhase::Mixed).unwrap();
        let ice = relative_humidity(cold, cold, WaterPhase::Ice).unwrap();
        assert!(approx_equal(liquid, 1.0, 1.0e-6));
        assert!(ice > 1.15 && ice < 1.3);
        assert!(liquid < mixed && mixed < ice);

        let very_cold = Kelvin(233.15);
        assert!(approx_equal(
            relative_humidity(very_cold, very_cold, WaterPhase::Mixed).unwrap(),
            relative_humidity(very_cold, very_cold, WaterPhase::Ice).unwrap(),
            1.0e-12
        ));
    }

    #[test]
    fn test_relative_humidity_profile() {
        let prof = drying_profile();
        for phase in WaterPhase::iter() {
            let rh = relative_humidity_profile(&prof, phase);
            assert_eq!(rh.len(), 4);
            assert!(rh[1].unpack() < rh[0].unpack());
            assert!(rh[2].unpack() < rh[1].unpack());
            assert!(rh[3].is_none());
        }
    }
}

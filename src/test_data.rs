//! Synthetic profiles used in tests.
use crate::source::{ProfileSource, RawAscent, RawRow};

/// Evenly spaced heights from `lower` to `upper`, both ends included.
pub fn uniform_heights(lower: f64, upper: f64, step: f64) -> Vec<f64> {
    let num = ((upper - lower) / step).round() as usize + 1;
    (0..num).map(|i| lower + i as f64 * step).collect()
}

/// Change accumulated from the bottom of a stack of layers up to `z`.
///
/// Each layer is `(top, rate)`, stacked from the bottom of the profile. Rates are per unit of
/// height. Above the top of the last layer its rate carries on.
fn accumulate(z: f64, bottom: f64, layers: &[(f64, f64)]) -> f64 {
    let mut total = 0.0;
    let mut layer_bottom = bottom;
    for (i, &(top, rate)) in layers.iter().enumerate() {
        let top = if i == layers.len() - 1 { z.max(top) } else { top };
        if z <= layer_bottom {
            break;
        }
        total += rate * (z.min(top) - layer_bottom);
        layer_bottom = top;
    }
    total
}

/// Temperature (K) at each height (m) for stacked layers of constant lapse rate (K/km).
pub fn lapse_rate_layers(height: &[f64], surface_temp: f64, layers: &[(f64, f64)]) -> Vec<f64> {
    let bottom = height[0];
    height
        .iter()
        .map(|&z| surface_temp - accumulate(z, bottom, layers) / 1000.0)
        .collect()
}

/// Potential temperature (K) at each height (km) for stacked layers of constant gradient (K/km).
pub fn theta_layers(height: &[f64], bottom_theta: f64, layers: &[(f64, f64)]) -> Vec<f64> {
    let bottom = height[0];
    height
        .iter()
        .map(|&z| bottom_theta + accumulate(z, bottom, layers))
        .collect()
}

/// Pressure (Pa) at each height (m) by integrating the hypsometric equation up from 1000 hPa.
pub fn hydrostatic_pressure(height: &[f64], temperature: &[f64]) -> Vec<f64> {
    const RD: f64 = 287.04;
    const G: f64 = 9.80665;

    let mut pressure = Vec::with_capacity(height.len());
    pressure.push(100_000.0);
    for i in 1..height.len() {
        let t_mean = 0.5 * (temperature[i] + temperature[i - 1]);
        let dz = height[i] - height[i - 1];
        pressure.push(pressure[i - 1] * (-G * dz / (RD * t_mean)).exp());
    }
    pressure
}

/// A 16 km ascent sampled every 50 m. Standard 6.5 K/km lapse rate with two 9.5 K/km layers at
/// 3-4 km and 7-8 km and an isothermal stratosphere from 11 km.
pub fn two_layer_rows(station: i32) -> Vec<RawRow> {
    let height = uniform_heights(0.0, 16_000.0, 50.0);
    let temperature = lapse_rate_layers(
        &height,
        290.0,
        &[
            (3_000.0, 6.5),
            (4_000.0, 9.5),
            (7_000.0, 6.5),
            (8_000.0, 9.5),
            (11_000.0, 6.5),
            (16_000.0, 0.0),
        ],
    );
    let pressure = hydrostatic_pressure(&height, &temperature);

    height
        .iter()
        .zip(temperature.iter().zip(pressure.iter()))
        .enumerate()
        .map(|(i, (&z, (&t, &p)))| RawRow {
            station,
            pressure: p,
            temperature: t,
            dew_point_depression: 5.0,
            height: z,
            longitude: -85.93,
            latitude: 79.98,
            time: i as f64 * 10.0,
        })
        .collect()
}

/// An ascent built from `two_layer_rows`.
pub fn two_layer_ascent(station: i32) -> RawAscent {
    RawAscent::new(station, ProfileSource::Standard, two_layer_rows(station))
}

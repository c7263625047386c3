//! Compare a model profile against a reference profile, usually a sonde.
//!
//! Derived fields are calculated on each profile's own grid, then the model values are
//! interpolated onto the reference heights before they are differenced. The two profiles do not
//! need to share a grid, reference levels outside the model profile come out missing.
use crate::error::{check_lengths, AnalysisError, Result};
use crate::interpolation::{interpolate_many, OutOfBounds};
use crate::profile::Profile;
use crate::thermo::{self, WaterPhase};
use crate::utility::unpack_all;
use metfor::Meters;
use optional::{none, some, Optioned};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// The profile variables that are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ComparedField {
    /// Temperature, K.
    Temperature,
    /// Potential temperature, K.
    PotentialTemperature,
    /// Pressure, hPa.
    Pressure,
    /// Potential temperature gradient, K / km.
    ThetaGradient,
    /// Squared Brunt-Väisälä frequency, s⁻².
    BruntVaisalaSquared,
    /// Specific humidity, kg / kg.
    SpecificHumidity,
    /// Relative humidity in the mixed phase, as a fraction.
    RelativeHumidity,
    /// Specific humidity gradient, kg / kg / km.
    SpecificHumidityGradient,
    /// Specific humidity gradient over specific humidity, 1 / km.
    FractionalHumidityGradient,
}

impl ComparedField {
    fn values(self, prof: &Profile) -> Vec<f64> {
        use ComparedField::*;

        match self {
            Temperature => unpack_all(prof.temperature_profile()),
            PotentialTemperature => unpack_all(prof.theta_profile()),
            Pressure => unpack_all(prof.pressure_profile()),
            ThetaGradient => raw(thermo::theta_gradient(prof)),
            BruntVaisalaSquared => raw(thermo::brunt_vaisala_squared(prof)),
            SpecificHumidity => raw(thermo::specific_humidity_profile(prof)),
            RelativeHumidity => raw(thermo::relative_humidity_profile(prof, WaterPhase::Mixed)),
            SpecificHumidityGradient => raw(thermo::specific_humidity_gradient(prof)),
            FractionalHumidityGradient => raw(thermo::fractional_humidity_gradient(prof)),
        }
    }
}

fn raw(vals: Vec<Optioned<f64>>) -> Vec<f64> {
    vals.into_iter().map(|v| v.unpack()).collect()
}

/// How one value differs from its reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDifference {
    /// The value minus the reference.
    pub difference: Optioned<f64>,
    /// The difference as a fraction of the reference.
    pub fractional: Optioned<f64>,
    /// The difference over the l2 norm of the value and the reference, between -√2 and √2.
    pub normalized: Optioned<f64>,
}

fn finite(val: f64) -> Optioned<f64> {
    if val.is_finite() {
        some(val)
    } else {
        none()
    }
}

/// Difference `values` against `reference` level by level.
///
/// A missing (`NaN`) input gives missing differences. The fractional difference is missing where
/// the reference is zero, and the normalized difference where both are.
pub fn field_differences(values: &[f64], reference: &[f64]) -> Result<Vec<FieldDifference>> {
    check_lengths(reference.len(), &[values.len()])?;

    Ok(values
        .iter()
        .zip(reference)
        .map(|(&val, &refr)| {
            let diff = val - refr;
            FieldDifference {
                difference: finite(diff),
                fractional: finite(diff / refr),
                normalized: finite(diff / (val * val + refr * refr).sqrt()),
            }
        })
        .collect())
}

/// The differences between a model and a reference profile, on the reference heights.
#[derive(Debug, Clone)]
pub struct ProfileDifferences {
    height: Vec<Meters>,
    fields: HashMap<ComparedField, Vec<FieldDifference>>,
}

impl ProfileDifferences {
    /// The heights the differences are valid at.
    pub fn height_profile(&self) -> &[Meters] {
        &self.height
    }

    /// The differences for one field, one per level.
    pub fn field(&self, field: ComparedField) -> &[FieldDifference] {
        self.fields.get(&field).map(|v| &v[..]).unwrap_or(&[])
    }
}

/// Difference every `ComparedField` of `model` against `reference`.
///
/// Both profiles need their potential temperature calculated.
pub fn profile_differences(model: &Profile, reference: &Profile) -> Result<ProfileDifferences> {
    if model.theta_profile().is_empty() || reference.theta_profile().is_empty() {
        return Err(AnalysisError::MissingValue);
    }

    let model_vals: Vec<Vec<f64>> = ComparedField::iter().map(|f| f.values(model)).collect();
    let columns: Vec<&[f64]> = model_vals.iter().map(|col| &col[..]).collect();

    let ref_height = unpack_all(reference.height_profile());
    let on_ref = interpolate_many(
        &unpack_all(model.height_profile()),
        &columns,
        &ref_height,
        OutOfBounds::Missing,
    )?;

    let fields = ComparedField::iter()
        .zip(on_ref)
        .map(|(field, vals)| Ok((field, field_differences(&vals, &field.values(reference))?)))
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(ProfileDifferences {
        height: reference.height_profile().to_vec(),
        fields,
    })
}

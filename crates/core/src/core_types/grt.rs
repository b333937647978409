//! Mapping of GRT-style propellant data onto the Vieille-law model
//!
//! GRT describes a powder by its explosion heat `Qex`, specific-heat ratio
//! `k`, vivacity `Ba`, progressivity `Bp` and the three-phase curve
//! parameters. This module converts those numbers into a
//! [`PropellantRecord`]; parsing the vendor file format is left to callers.

use serde::{Deserialize, Serialize};

use crate::core_types::propellant::PropellantRecord;
use crate::physics::combustion::flame_temperature;

/// Mean molar mass of nitrocellulose combustion gas (kg/mol)
pub const GAS_MOLAR_MASS: f64 = 0.026;

/// Reference pressure at which vivacity is matched to Vieille's law (Pa)
const VIVACITY_REFERENCE_PRESSURE: f64 = 250e6;

/// Empirical scale aligning vivacity units with `a1` (m/s per unit vivacity)
const VIVACITY_SCALE: f64 = 1.0e-9;

/// Raw GRT propellant parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrtPropellant {
    pub name: String,
    pub qex: f64, // kJ/kg
    pub k: f64,   // ratio of specific heats
    pub ba: f64,  // vivacity
    pub bp: f64,  // progressivity
    pub br: Option<f64>,
    pub brp: Option<f64>,
    pub z1: Option<f64>,
    pub z2: Option<f64>,
    pub eta: f64, // covolume, cm³/g
    pub pc: f64,  // solid density, kg/m³
}

/// Vieille exponent estimated from the progressivity-to-vivacity ratio
///
/// `n = clamp(0.82 + 0.15·Bp/Ba, 0.75, 0.95)`, or 0.85 without a vivacity.
pub fn burn_rate_exponent(ba: f64, bp: f64) -> f64 {
    if ba > 0.0 {
        (0.82 + 0.15 * bp / ba).clamp(0.75, 0.95)
    } else {
        0.85
    }
}

/// Vieille coefficient matched to vivacity at the reference pressure
///
/// `a1 = Ba·scale / P_ref^(n−1)`
pub fn burn_rate_coefficient(ba: f64, exponent: f64) -> f64 {
    ba * VIVACITY_SCALE / VIVACITY_REFERENCE_PRESSURE.powf(exponent - 1.0)
}

impl GrtPropellant {
    /// Convert to a propellant record
    ///
    /// Force is `Qex·1000·(k − 1)` and the flame temperature follows from it.
    /// A non-positive `Ba` or `Bp` is treated as absent, so a GRT entry with
    /// curve data but no progressivity surfaces later as a partial curve.
    pub fn to_record(&self) -> PropellantRecord {
        let force = self.qex * 1000.0 * (self.k - 1.0);
        let exponent = burn_rate_exponent(self.ba, self.bp);

        PropellantRecord {
            name: self.name.trim().to_string(),
            force_j_kg: force,
            covolume_m3_kg: self.eta / 1000.0,
            burn_rate_coeff: burn_rate_coefficient(self.ba, exponent),
            burn_rate_exp: exponent,
            gamma: self.k,
            density_g_cm3: self.pc / 1000.0,
            flame_temp_k: flame_temperature(force, GAS_MOLAR_MASS),
            web_thickness_m: None,
            theta: None,
            ba: (self.ba > 0.0).then_some(self.ba),
            bp: (self.bp > 0.0).then_some(self.bp),
            br: self.br,
            brp: self.brp,
            z1: self.z1,
            z2: self.z2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::propellant::{BurnCurve, PropellantParams};
    use crate::error::InputError;
    use approx::assert_relative_eq;

    fn sample() -> GrtPropellant {
        GrtPropellant {
            name: " Sample 140 ".to_string(),
            qex: 3950.0,
            k: 1.2385,
            ba: 0.5,
            bp: 0.1995,
            br: Some(0.1310),
            brp: Some(0.1688),
            z1: Some(0.4296),
            z2: Some(0.8867),
            eta: 1.0,
            pc: 1600.0,
        }
    }

    #[test]
    fn test_thermochemistry_mapping() {
        let record = sample().to_record();
        assert_eq!(record.name, "Sample 140");
        assert_relative_eq!(record.force_j_kg, 3950.0 * 1000.0 * 0.2385, max_relative = 1e-12);
        assert_relative_eq!(record.flame_temp_k, record.force_j_kg * 0.026 / 8.314, max_relative = 1e-12);
        assert_relative_eq!(record.covolume_m3_kg, 0.001, max_relative = 1e-12);
        assert_relative_eq!(record.density_g_cm3, 1.6, max_relative = 1e-12);
    }

    #[test]
    fn test_exponent_clamped() {
        assert_relative_eq!(burn_rate_exponent(0.5, 0.1), 0.85, epsilon = 1e-12);
        assert_eq!(burn_rate_exponent(0.1, 1.0), 0.95);
        assert_eq!(burn_rate_exponent(1.0, -2.0), 0.75);
        assert_eq!(burn_rate_exponent(0.0, 0.3), 0.85);
    }

    #[test]
    fn test_coefficient_at_reference_pressure() {
        // At n = 1 the reference pressure drops out
        assert_relative_eq!(burn_rate_coefficient(0.6, 1.0), 0.6e-9, max_relative = 1e-12);
        // Faster (higher vivacity) powder gives a larger coefficient
        assert!(burn_rate_coefficient(0.8, 0.86) > burn_rate_coefficient(0.6, 0.86));
    }

    #[test]
    fn test_full_curve_converts_to_piecewise() {
        let params = PropellantParams::try_from(sample().to_record()).unwrap();
        assert!(matches!(params.curve, BurnCurve::Piecewise(_)));
    }

    #[test]
    fn test_missing_progressivity_is_partial_curve() {
        let grt = GrtPropellant { bp: 0.0, ..sample() };
        let err = PropellantParams::try_from(grt.to_record()).unwrap_err();
        assert_eq!(err, InputError::PartialBurnCurve { missing: vec!["bp"] });
    }
}

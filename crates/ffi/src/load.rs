//! FFI-exposed load description types.
//!
//! A `LoadSpec` carries everything one simulation run needs, in the units
//! handloaders work in (grains, mm, psi, inches). It is converted into the
//! core's `LoadInputs` before every run.

use bore_sim_core::core_types::units::{CubicMeters, Kilograms, Meters, Pascals};
use bore_sim_core::{
    BarrelParams, BulletParams, BurnCurve, ChamberParams, ChargeParams, InputError, LoadInputs,
    PropellantParams, PropellantRecord,
};

use crate::error::{BoreSimErrorCode, DefaultBoreSimError};
use crate::helpers::{clear_last_error, track_error};

/// Propellant form function.
///
/// FFI-safe tagged union (`#[repr(C)]`). Each variant has a discriminant
/// followed by its fields.
///
/// # Example (Conceptual)
/// ```c
/// BurnCurveSpec curve;
/// curve.tag = BurnCurveSpec_Quadratic;
/// curve.quadratic.theta = -0.2;
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BurnCurveSpec {
    /// Single-parameter form function `ψ = (θ+1)·Z − θ·Z²`.
    Quadratic {
        /// Grain form factor (negative is progressive).
        theta: f64,
    },

    /// Three-phase curve from GRT-style data.
    Piecewise {
        /// Vivacity, 1/(MPa·s).
        ba: f64,
        /// Surface growth over phase 1.
        bp: f64,
        /// Surface loss over the tail-off phase.
        br: f64,
        /// Surface growth over the blend phase.
        brp: f64,
        /// First phase boundary.
        z1: f64,
        /// Second phase boundary.
        z2: f64,
    },
}

/// One complete load.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSpec {
    /// Propellant force (impetus), J/kg.
    pub force_j_kg: f64,
    /// Noble-Abel covolume, m³/kg.
    pub covolume_m3_kg: f64,
    /// Vieille burn-rate coefficient, m/(s·Paⁿ).
    pub burn_rate_coeff: f64,
    /// Vieille burn-rate exponent.
    pub burn_rate_exp: f64,
    /// Ratio of specific heats.
    pub gamma: f64,
    /// Solid (not bulk) propellant density, g/cm³.
    pub density_g_cm3: f64,
    /// Adiabatic flame temperature, K.
    pub flame_temp_k: f64,
    /// Full grain web thickness, m.
    pub web_thickness_m: f64,
    /// Form function.
    pub curve: BurnCurveSpec,

    /// Bullet weight, grains.
    pub bullet_mass_gr: f64,
    /// Bullet diameter, mm.
    pub bullet_diameter_mm: f64,

    /// Rated maximum average pressure, psi.
    pub max_pressure_psi: f64,
    /// Usable case volume behind the seated bullet, cm³.
    pub chamber_volume_cm3: f64,
    /// Bore diameter, mm.
    pub bore_diameter_mm: f64,

    /// Barrel length, mm.
    pub barrel_length_mm: f64,
    /// Rifling twist, inches per turn.
    pub twist_in: f64,
    /// Rifle mass for free recoil, kg.
    pub rifle_mass_kg: f64,

    /// Charge weight, grains.
    pub charge_gr: f64,
}

impl LoadSpec {
    /// Convert into core inputs, validating the propellant on the way.
    pub(crate) fn to_inputs(&self) -> Result<LoadInputs, InputError> {
        let mut record = PropellantRecord {
            name: "ffi".to_string(),
            force_j_kg: self.force_j_kg,
            covolume_m3_kg: self.covolume_m3_kg,
            burn_rate_coeff: self.burn_rate_coeff,
            burn_rate_exp: self.burn_rate_exp,
            gamma: self.gamma,
            density_g_cm3: self.density_g_cm3,
            flame_temp_k: self.flame_temp_k,
            web_thickness_m: Some(self.web_thickness_m),
            ..PropellantRecord::default()
        };
        match self.curve {
            BurnCurveSpec::Quadratic { theta } => record.theta = Some(theta),
            BurnCurveSpec::Piecewise {
                ba,
                bp,
                br,
                brp,
                z1,
                z2,
            } => {
                record.ba = Some(ba);
                record.bp = Some(bp);
                record.br = Some(br);
                record.brp = Some(brp);
                record.z1 = Some(z1);
                record.z2 = Some(z2);
            }
        }

        Ok(LoadInputs {
            propellant: PropellantParams::try_from(&record)?,
            bullet: BulletParams::from_grains(self.bullet_mass_gr, self.bullet_diameter_mm),
            chamber: ChamberParams {
                max_pressure: Pascals::from_psi(self.max_pressure_psi),
                chamber_volume: CubicMeters::from_cm3(self.chamber_volume_cm3),
                bore_diameter: Meters::from_mm(self.bore_diameter_mm),
            },
            barrel: BarrelParams {
                barrel_length: Meters::from_mm(self.barrel_length_mm),
                twist: Meters::from_inches(self.twist_in),
                rifle_mass: Kilograms::new(self.rifle_mass_kg),
            },
            charge: ChargeParams::from_grains(self.charge_gr),
        })
    }
}

impl From<&LoadInputs> for LoadSpec {
    fn from(inputs: &LoadInputs) -> Self {
        let p = &inputs.propellant;
        let curve = match p.curve {
            BurnCurve::Quadratic { theta } => BurnCurveSpec::Quadratic { theta },
            BurnCurve::Piecewise(c) => {
                let (z1, z2) = c.boundaries();
                BurnCurveSpec::Piecewise {
                    ba: c.ba(),
                    bp: c.bp(),
                    br: c.br(),
                    brp: c.brp(),
                    z1,
                    z2,
                }
            }
        };
        Self {
            force_j_kg: *p.force,
            covolume_m3_kg: p.covolume,
            burn_rate_coeff: p.burn_rate_coeff,
            burn_rate_exp: p.burn_rate_exp,
            gamma: p.gamma,
            density_g_cm3: p.solid_density.to_g_per_cm3(),
            flame_temp_k: *p.flame_temperature,
            web_thickness_m: *p.web_half_thickness * 2.0,
            curve,
            bullet_mass_gr: inputs.bullet.mass.to_grains(),
            bullet_diameter_mm: inputs.bullet.diameter.to_mm(),
            max_pressure_psi: inputs.chamber.max_pressure.to_psi(),
            chamber_volume_cm3: inputs.chamber.chamber_volume.to_cm3(),
            bore_diameter_mm: inputs.chamber.bore_diameter.to_mm(),
            barrel_length_mm: inputs.barrel.barrel_length.to_mm(),
            twist_in: inputs.barrel.twist.to_inches(),
            rifle_mass_kg: *inputs.barrel.rifle_mass,
            charge_gr: inputs.charge.mass.to_grains(),
        }
    }
}

/// Fill `out_load` with the .308 Winchester reference load.
///
/// 168 gr bullet over 44 gr of a Varget-class powder in a 24" barrel. Useful
/// as a starting point that callers then modify field by field.
///
/// Returns
/// - `BoreSimErrorCode::Ok` (0) on success
/// - `BoreSimErrorCode::NullPointer` if `out_load` is null
///
/// # Safety
/// `out_load` must be null or a valid pointer to writable `LoadSpec` memory.
#[no_mangle]
pub unsafe extern "C" fn bore_sim_load_reference_308(out_load: *mut LoadSpec) -> BoreSimErrorCode {
    if out_load.is_null() {
        return track_error(&DefaultBoreSimError::null_pointer("out_load"));
    }
    unsafe {
        *out_load = LoadSpec::from(&LoadInputs::reference_308());
    }
    clear_last_error();
    BoreSimErrorCode::Ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_load_round_trips() {
        let reference = LoadInputs::reference_308();
        let spec = LoadSpec::from(&reference);
        let back = spec.to_inputs().unwrap();

        assert_eq!(back.propellant.curve, reference.propellant.curve);
        assert!((spec.charge_gr - 44.0).abs() < 1e-9);
        assert!((*back.charge.mass - *reference.charge.mass).abs() < 1e-12);
        assert!((*back.chamber.max_pressure - *reference.chamber.max_pressure).abs() < 1e-3);
    }

    #[test]
    fn test_bad_piecewise_curve_is_rejected() {
        let mut spec = LoadSpec::from(&LoadInputs::reference_308());
        spec.curve = BurnCurveSpec::Piecewise {
            ba: 0.2,
            bp: 0.2,
            br: 0.13,
            brp: 0.17,
            z1: 0.9,
            z2: 0.4,
        };
        assert!(matches!(spec.to_inputs(), Err(InputError::InvalidBurnCurve(_))));
    }
}

//! Run configuration
//!
//! Every model constant that is a calibration choice rather than a physical
//! input lives here. `SimulationConfig::default()` reproduces the calibrated
//! reference behavior; changing any value (the primer seed in particular)
//! changes every calibrated result.

use serde::{Deserialize, Serialize};

use crate::core_types::grt::GAS_MOLAR_MASS;
use crate::error::{require_positive, InputError};

/// Integrator and ODE right-hand-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Relative error tolerance
    pub rtol: f64,

    /// Absolute error tolerance
    pub atol: f64,

    /// Initial step size (s)
    pub initial_step: f64,

    /// Maximum step size (s). Keeps the controller from stepping over ignition
    pub max_step: f64,

    /// Simulated-time ceiling if the bullet never exits (s)
    pub time_limit: f64,

    /// Step budget, accepted plus rejected
    pub max_steps: u64,

    /// Points per output curve
    pub sample_count: usize,

    /// Normalized burn depth at t = 0 standing in for primer ignition.
    /// Vieille's law is zero at zero pressure, so Z = 0 never ignites
    pub primer_seed: f64,

    /// Base pressure the bullet must see before it starts moving (Pa)
    pub engraving_pressure: f64,

    /// Bore friction as a fraction of the base-pressure force
    pub friction_coefficient: f64,

    /// Chamber and throat length not available as bullet travel (m)
    pub chamber_offset: f64,

    /// Floor on the Noble-Abel denominator (m³)
    pub volume_floor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            initial_step: 1e-8,
            max_step: 1e-6,
            time_limit: 0.01,
            max_steps: 500_000,
            sample_count: 200,
            primer_seed: 0.01,
            engraving_pressure: 25e6,
            friction_coefficient: 0.05,
            chamber_offset: 0.051,
            volume_floor: 1e-12,
        }
    }
}

/// Convective wall heat loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatLossConfig {
    /// Film coefficient (W/m²/K)
    pub h_coeff: f64,

    /// Bore wall temperature (K)
    pub wall_temperature: f64,

    /// Mean molar mass of the combustion gas (kg/mol)
    pub molar_mass: f64,
}

impl Default for HeatLossConfig {
    fn default() -> Self {
        Self {
            h_coeff: 2000.0,
            wall_temperature: 300.0,
            molar_mass: GAS_MOLAR_MASS,
        }
    }
}

/// Material and geometry assumptions for the post-processing analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    // Cartridge case (cartridge brass)
    pub case_youngs_modulus: f64, // Pa
    pub case_poisson_ratio: f64,
    pub case_wall_thickness: f64, // m

    // Throat erosion
    pub erosivity: f64,
    pub activation_energy: f64, // J/mol

    // Barrel vibration (chrome-moly steel, cantilevered at the action)
    pub barrel_youngs_modulus: f64, // Pa
    pub barrel_density: f64,        // kg/m³
    pub barrel_outer_diameter: f64, // m
    pub vibration_mode: usize,
    pub obt_nodes: usize,
    pub obt_tolerance: f64, // s
    pub deflection_modes: usize,

    /// Propellant gas velocity as a multiple of muzzle velocity
    pub gas_ejecta_multiplier: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            case_youngs_modulus: 110e9,
            case_poisson_ratio: 0.31,
            case_wall_thickness: 0.0015,
            erosivity: 80.0,
            activation_energy: 500e3,
            barrel_youngs_modulus: 200e9,
            barrel_density: 7850.0,
            barrel_outer_diameter: 0.025,
            vibration_mode: 2,
            obt_nodes: 6,
            obt_tolerance: 0.05e-3,
            deflection_modes: 4,
            gas_ejecta_multiplier: 1.75,
        }
    }
}

/// Thresholds of the safety envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Loose-packed bulk density as a fraction of solid density
    pub packing_factor: f64,

    /// Fill ratio above which the load cannot be assembled
    pub fill_ratio_limit: f64,

    /// Fill ratio above which a compressed-load warning is given
    pub fill_ratio_warning: f64,

    /// Loading density × covolume above which pressure is not trusted
    pub covolume_limit: f64,

    /// Fraction of rated maximum pressure that starts the near-max band
    pub near_max_ratio: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            packing_factor: 0.60,
            fill_ratio_limit: 1.05,
            fill_ratio_warning: 0.90,
            covolume_limit: 0.95,
            near_max_ratio: 0.90,
        }
    }
}

/// Complete configuration for [`simulate`](crate::simulation::simulate)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub solver: SolverConfig,
    pub heat_loss: HeatLossConfig,
    pub analytics: AnalyticsConfig,
    pub safety: SafetyConfig,
}

impl SimulationConfig {
    /// Reject settings the solver cannot run with
    ///
    /// # Errors
    /// `InputError::InvalidParameter` naming the first unusable field.
    pub fn validate(&self) -> Result<(), InputError> {
        let s = &self.solver;
        require_positive("solver.rtol", s.rtol)?;
        require_positive("solver.atol", s.atol)?;
        require_positive("solver.initial_step", s.initial_step)?;
        require_positive("solver.max_step", s.max_step)?;
        require_positive("solver.time_limit", s.time_limit)?;
        require_positive("solver.primer_seed", s.primer_seed)?;
        require_positive("solver.volume_floor", s.volume_floor)?;
        if s.sample_count < 2 {
            return Err(InputError::invalid("solver.sample_count", s.sample_count as f64));
        }
        require_positive("heat_loss.molar_mass", self.heat_loss.molar_mass)?;
        require_positive("safety.packing_factor", self.safety.packing_factor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solver.sample_count, 200);
        assert_eq!(config.solver.time_limit, 0.01);
        assert_eq!(config.analytics.vibration_mode, 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "solver": { "primer_seed": 0.02 }, "safety": { "near_max_ratio": 0.85 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.solver.primer_seed, 0.02);
        assert_eq!(config.solver.rtol, 1e-8);
        assert_eq!(config.safety.near_max_ratio, 0.85);
        assert_eq!(config.heat_loss, HeatLossConfig::default());
    }

    #[test]
    fn test_rejects_single_sample() {
        let mut config = SimulationConfig::default();
        config.solver.sample_count = 1;
        assert!(matches!(
            config.validate(),
            Err(InputError::InvalidParameter { name: "solver.sample_count", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_seed() {
        let mut config = SimulationConfig::default();
        config.solver.primer_seed = 0.0;
        assert!(config.validate().is_err());
    }
}

//! Simulation output record

use serde::{Deserialize, Serialize};

use crate::core_types::units::{
    Hertz, Joules, Kelvin, Meters, MetersPerSecond, NewtonSeconds, Pascals, Seconds,
};
use crate::solver::ode::Stats;

/// One time-stamped sample of a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f64,  // s
    pub value: f64, // SI unit of the curve
}

/// Sampled histories, all the same length and on the same time grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Curves {
    pub breech_pressure: Vec<CurvePoint>, // Pa
    pub velocity: Vec<CurvePoint>,        // m/s
    pub travel: Vec<CurvePoint>,          // m
    pub burn_fraction: Vec<CurvePoint>,   // ψ
    pub kinetic_energy: Vec<CurvePoint>,  // J, bullet only
    pub gas_temperature: Vec<CurvePoint>, // K
    pub heat_loss: Vec<CurvePoint>,       // J, cumulative
    pub recoil_impulse: Vec<CurvePoint>,  // N·s, bullet plus gas momentum so far
}

impl Curves {
    /// Points per curve (0 for a failed run)
    pub fn len(&self) -> usize {
        self.breech_pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breech_pressure.is_empty()
    }
}

/// Everything one run produces
///
/// Immutable once returned. Warnings are the channel for anomalies;
/// `is_safe` is the go/no-go verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    // Headline
    pub peak_pressure: Pascals, // breech, maximum over the samples
    pub peak_pressure_time: Seconds,
    pub muzzle_velocity: MetersPerSecond,
    pub barrel_time: Seconds, // ignition to muzzle exit
    pub exited_barrel: bool,
    pub is_safe: bool,
    pub warnings: Vec<String>,
    pub curves: Curves,

    // Energetics
    pub muzzle_energy: Joules,
    pub efficiency: f64, // muzzle energy per kg of charge (J/kg)
    pub peak_gas_temperature: Kelvin,
    pub spin_rate: f64, // rev/s at the muzzle

    // Structural
    pub hoop_stress: Pascals,
    pub case_expansion: Meters,
    pub erosion_per_shot: Meters,

    // Barrel harmonics
    pub barrel_frequency: Hertz,
    pub optimal_barrel_times: Vec<Seconds>,
    pub obt_match: bool,
    pub muzzle_deflection: f64, // relative, unit modal amplitudes

    // Free recoil
    pub recoil_impulse: NewtonSeconds,
    pub recoil_velocity: MetersPerSecond,
    pub recoil_energy: Joules,

    pub solver_stats: Stats,
}

impl SimulationResult {
    /// Zero-valued unsafe result for a run whose integration failed
    pub fn failed(mut warnings: Vec<String>, message: &str) -> Self {
        warnings.push(format!("Integration failed: {message}"));
        SimulationResult {
            peak_pressure: Pascals::ZERO,
            peak_pressure_time: Seconds::ZERO,
            muzzle_velocity: MetersPerSecond::ZERO,
            barrel_time: Seconds::ZERO,
            exited_barrel: false,
            is_safe: false,
            warnings,
            curves: Curves::default(),
            muzzle_energy: Joules::ZERO,
            efficiency: 0.0,
            peak_gas_temperature: Kelvin::ZERO,
            spin_rate: 0.0,
            hoop_stress: Pascals::ZERO,
            case_expansion: Meters::ZERO,
            erosion_per_shot: Meters::ZERO,
            barrel_frequency: Hertz::ZERO,
            optimal_barrel_times: Vec::new(),
            obt_match: false,
            muzzle_deflection: 0.0,
            recoil_impulse: NewtonSeconds::ZERO,
            recoil_velocity: MetersPerSecond::ZERO,
            recoil_energy: Joules::ZERO,
            solver_stats: Stats::default(),
        }
    }

    /// True when integration failed and the figures are placeholders
    pub fn integration_failed(&self) -> bool {
        self.warnings.iter().any(|w| w.starts_with("Integration failed"))
    }

    /// Index of the peak in the pressure curve
    pub fn peak_index(&self) -> Option<usize> {
        self.curves
            .breech_pressure
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.value.total_cmp(&b.1.value))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_is_zero_and_unsafe() {
        let result = SimulationResult::failed(vec!["earlier".to_string()], "step size too small");
        assert!(!result.is_safe);
        assert!(result.integration_failed());
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.warnings[1], "Integration failed: step size too small");
        assert_eq!(result.peak_pressure, Pascals::ZERO);
        assert!(result.curves.is_empty());
        assert_eq!(result.peak_index(), None);
    }

    #[test]
    fn test_result_serializes() {
        let result = SimulationResult::failed(Vec::new(), "x");
        let json = serde_json::to_string(&result).unwrap();
        let back: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}

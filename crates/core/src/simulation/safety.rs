//! Safety envelope
//!
//! Two checks run on the load before the trajectory is trusted, and one on the
//! computed peak afterwards. The load checks exist because the integrator
//! floors the Noble-Abel denominator: an overcharged case then reports a
//! moderate pressure instead of a runaway one, so the verdict for those loads
//! cannot come from the computed peak.

use crate::core_types::components::LoadInputs;
use crate::core_types::units::Pascals;
use crate::simulation::config::SafetyConfig;

/// Outcome of one safety check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub force_unsafe: bool,
    pub warnings: Vec<String>,
}

impl Verdict {
    fn merge(&mut self, other: Verdict) {
        self.force_unsafe |= other.force_unsafe;
        self.warnings.extend(other.warnings);
    }
}

/// Loose-packed charge volume over chamber volume
///
/// # Formula
/// ```text
/// fill = (ω / (ρ_solid·k_pack)) / V₀
/// ```
pub fn fill_ratio(inputs: &LoadInputs, config: &SafetyConfig) -> f64 {
    let bulk_density = *inputs.propellant.solid_density * config.packing_factor;
    (*inputs.charge.mass / bulk_density) / *inputs.chamber.chamber_volume
}

/// Loading density times covolume, `(ω/V₀)·η`
///
/// Approaches 1 as the burned gas's own molecular volume fills the chamber.
pub fn covolume_saturation(inputs: &LoadInputs) -> f64 {
    let loading_density = *inputs.charge.mass / *inputs.chamber.chamber_volume;
    loading_density * inputs.propellant.covolume
}

/// Bulk fill check
///
/// Above the hard limit the charge does not fit in the case; between the
/// warning level and the limit it is a compressed load.
pub fn check_fill(inputs: &LoadInputs, config: &SafetyConfig) -> Verdict {
    let ratio = fill_ratio(inputs, config);
    if ratio > config.fill_ratio_limit {
        Verdict {
            force_unsafe: true,
            warnings: vec![format!(
                "UNSAFE: Charge fills {:.0}% of case capacity; load is physically impossible to assemble",
                ratio * 100.0
            )],
        }
    } else if ratio > config.fill_ratio_warning {
        Verdict {
            force_unsafe: false,
            warnings: vec![format!(
                "WARNING: Compressed load, charge fills {:.0}% of case capacity",
                ratio * 100.0
            )],
        }
    } else {
        Verdict::default()
    }
}

/// Covolume saturation check
pub fn check_covolume(inputs: &LoadInputs, config: &SafetyConfig) -> Verdict {
    if covolume_saturation(inputs) > config.covolume_limit {
        Verdict {
            force_unsafe: true,
            warnings: vec!["Charge density too high: gas volume approaches zero".to_string()],
        }
    } else {
        Verdict::default()
    }
}

/// Both load checks
pub fn check_load(inputs: &LoadInputs, config: &SafetyConfig) -> Verdict {
    let mut verdict = check_fill(inputs, config);
    verdict.merge(check_covolume(inputs, config));
    verdict
}

/// Peak breech pressure against the rated maximum
///
/// Returns whether the peak is within the rating, plus the over-pressure or
/// near-max warnings. The near-max band is `[near_max_ratio, 1)`.
pub fn check_pressure(peak: Pascals, rated_max: Pascals, config: &SafetyConfig) -> (bool, Vec<String>) {
    let peak_psi = peak.to_psi();
    let max_psi = rated_max.to_psi();
    let mut warnings = Vec::new();

    let within = peak_psi <= max_psi;
    if !within {
        warnings.push(format!(
            "UNSAFE: Peak pressure {peak_psi:.0} psi exceeds SAAMI max {max_psi:.0} psi"
        ));
    }

    let ratio = peak_psi / max_psi;
    if ratio >= config.near_max_ratio && ratio < 1.0 {
        warnings.push(format!("WARNING: Peak pressure at {:.1}% of SAAMI max", ratio * 100.0));
    }

    (within, warnings)
}

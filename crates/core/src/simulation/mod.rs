//! Single-run simulation and the services built on it
//!
//! [`simulate`] is a pure function of its inputs: it validates, runs the
//! safety envelope's load checks, integrates to muzzle exit, resamples the
//! trajectory and evaluates the post-processing analytics. Physics outcomes
//! (overpressure, impossible loads, timeouts, integrator failure) never
//! surface as errors; they arrive as warnings and `is_safe = false`.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod result;
pub mod safety;

pub use batch::{
    ladder, parametric_search, sensitivity, ChargeResult, ChargeSummary, LadderStep,
    PowderSearchResult, SearchReport, SearchRequest, SensitivityResult,
};
pub use catalog::PropellantCatalog;
pub use config::{AnalyticsConfig, HeatLossConfig, SafetyConfig, SimulationConfig, SolverConfig};
pub use result::{CurvePoint, Curves, SimulationResult};

use crate::core_types::components::LoadInputs;
use crate::core_types::units::{
    Hertz, Joules, Kelvin, Meters, MetersPerSecond, NewtonSeconds, Pascals, Seconds,
};
use crate::error::InputError;
use crate::physics::harmonics::{
    annular_section, cantilever_frequency, matches_barrel_time, muzzle_deflection,
    optimal_barrel_times,
};
use crate::physics::recoil::{free_recoil, recoil_impulse, FreeRecoil};
use crate::physics::structural::{case_expansion, lame_hoop_stress, lawton_erosion};
use crate::solver::integrate_load;
use crate::solver::sampling::{sample_uniform, Samples};
use crate::solver::system::{InteriorBallistics, HEAT_LOST, TRAVEL, VELOCITY};
use tracing::{debug, warn};

/// Run one load through the interior-ballistics model
///
/// # Errors
/// `InputError` when the inputs or configuration leave the model undefined.
/// Nothing that happens during integration is an error.
///
/// # Example
/// ```
/// use bore_sim_core::{simulate, LoadInputs, SimulationConfig};
///
/// let result = simulate(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();
/// assert!(result.is_safe);
/// assert_eq!(result.curves.len(), 200);
/// ```
pub fn simulate(inputs: &LoadInputs, config: &SimulationConfig) -> Result<SimulationResult, InputError> {
    inputs.validate()?;
    config.validate()?;

    let load_check = safety::check_load(inputs, &config.safety);
    if load_check.force_unsafe {
        warn!(
            "Load '{}' at {:.1} gr fails the load checks: {}",
            inputs.propellant.name,
            inputs.charge.mass.to_grains(),
            load_check.warnings.join("; ")
        );
    }
    let mut warnings = load_check.warnings;

    let run = match integrate_load(inputs, config) {
        Ok(run) => run,
        Err(e) => {
            warn!("Integration failed for '{}': {}", inputs.propellant.name, e);
            return Ok(SimulationResult::failed(warnings, &e.to_string()));
        }
    };

    if !run.exited() {
        warn!(
            "Bullet did not exit within {:.1} ms for '{}'",
            config.solver.time_limit * 1e3,
            inputs.propellant.name
        );
        warnings.push("Bullet did not exit barrel within integration time".to_string());
    }

    let t_exit = run.exit_time();
    let samples = sample_uniform(&run.solution.dense, t_exit, config.solver.sample_count);
    let curves = build_curves(&run.system, &samples, inputs, config);

    let (peak_index, peak) = curves
        .breech_pressure
        .iter()
        .enumerate()
        .fold((0, 0.0_f64), |best, (i, p)| if p.value > best.1 { (i, p.value) } else { best });
    let peak_pressure = Pascals::new(peak);
    let muzzle_velocity = curves.velocity.last().map_or(0.0, |p| p.value);
    let peak_gas_temperature = curves
        .gas_temperature
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max);

    let (within_rating, pressure_warnings) =
        safety::check_pressure(peak_pressure, inputs.chamber.max_pressure, &config.safety);
    warnings.extend(pressure_warnings);
    let is_safe = within_rating && !load_check.force_unsafe;

    let analytics = Analytics::evaluate(inputs, config, peak, muzzle_velocity, t_exit, peak_gas_temperature);

    let muzzle_energy = 0.5 * *inputs.bullet.mass * muzzle_velocity * muzzle_velocity;

    debug!(
        "Simulated '{}' {:.1} gr: peak {:.0} psi, {:.0} fps, {:.3} ms, safe={}",
        inputs.propellant.name,
        inputs.charge.mass.to_grains(),
        peak_pressure.to_psi(),
        MetersPerSecond::new(muzzle_velocity).to_fps(),
        t_exit * 1e3,
        is_safe
    );

    Ok(SimulationResult {
        peak_pressure,
        peak_pressure_time: Seconds::new(samples.times[peak_index]),
        muzzle_velocity: MetersPerSecond::new(muzzle_velocity),
        barrel_time: Seconds::new(t_exit),
        exited_barrel: run.exited(),
        is_safe,
        warnings,
        curves,
        muzzle_energy: Joules::new(muzzle_energy),
        efficiency: muzzle_energy / *inputs.charge.mass,
        peak_gas_temperature: Kelvin::new(peak_gas_temperature),
        spin_rate: muzzle_velocity / *inputs.barrel.twist,
        hoop_stress: Pascals::new(analytics.hoop_stress),
        case_expansion: Meters::new(analytics.case_expansion),
        erosion_per_shot: Meters::new(analytics.erosion),
        barrel_frequency: Hertz::new(analytics.barrel_frequency),
        optimal_barrel_times: analytics.obt_nodes.iter().copied().map(Seconds::new).collect(),
        obt_match: analytics.obt_match,
        muzzle_deflection: analytics.muzzle_deflection,
        recoil_impulse: NewtonSeconds::new(analytics.recoil.impulse),
        recoil_velocity: MetersPerSecond::new(analytics.recoil.velocity),
        recoil_energy: Joules::new(analytics.recoil.energy),
        solver_stats: run.solution.stats,
    })
}

/// Evaluate the eight curves at every sample
fn build_curves(
    system: &InteriorBallistics,
    samples: &Samples,
    inputs: &LoadInputs,
    config: &SimulationConfig,
) -> Curves {
    let n = samples.len();
    let bullet_mass = *inputs.bullet.mass;
    let charge_mass = *inputs.charge.mass;
    let ejecta = config.analytics.gas_ejecta_multiplier;

    let mut curves = Curves {
        breech_pressure: Vec::with_capacity(n),
        velocity: Vec::with_capacity(n),
        travel: Vec::with_capacity(n),
        burn_fraction: Vec::with_capacity(n),
        kinetic_energy: Vec::with_capacity(n),
        gas_temperature: Vec::with_capacity(n),
        heat_loss: Vec::with_capacity(n),
        recoil_impulse: Vec::with_capacity(n),
    };

    for (&time, y) in samples.times.iter().zip(&samples.states) {
        let gas = system.conditions(y);
        let v = y[VELOCITY];
        let point = |value: f64| CurvePoint { time, value };

        curves.breech_pressure.push(point(gas.breech_pressure));
        curves.velocity.push(point(v));
        curves.travel.push(point(y[TRAVEL]));
        curves.burn_fraction.push(point(gas.psi));
        curves.kinetic_energy.push(point(0.5 * bullet_mass * v * v));
        curves.gas_temperature.push(point(gas.gas_temperature));
        curves.heat_loss.push(point(y[HEAT_LOST]));
        curves
            .recoil_impulse
            .push(point(recoil_impulse(bullet_mass, charge_mass, v, ejecta)));
    }

    curves
}

/// Closed-form analytics evaluated on the headline figures
struct Analytics {
    hoop_stress: f64,
    case_expansion: f64,
    erosion: f64,
    barrel_frequency: f64,
    obt_nodes: Vec<f64>,
    obt_match: bool,
    muzzle_deflection: f64,
    recoil: FreeRecoil,
}

impl Analytics {
    fn evaluate(
        inputs: &LoadInputs,
        config: &SimulationConfig,
        peak_pressure: f64,
        muzzle_velocity: f64,
        barrel_time: f64,
        peak_gas_temperature: f64,
    ) -> Self {
        let ac = &config.analytics;
        let bore_radius = *inputs.chamber.bore_diameter / 2.0;
        let case_outer = bore_radius + ac.case_wall_thickness;

        // Erosion needs a surface temperature; the peak gas temperature is the
        // closest available proxy, with the adiabatic flame temperature behind it
        let erosion_temperature = if peak_gas_temperature > 0.0 {
            peak_gas_temperature
        } else {
            *inputs.propellant.flame_temperature
        };

        let barrel_length = *inputs.barrel.barrel_length;
        let (second_moment, area) = annular_section(ac.barrel_outer_diameter / 2.0, bore_radius);
        let frequency_of = |mode: usize| {
            cantilever_frequency(
                mode,
                barrel_length,
                ac.barrel_youngs_modulus,
                second_moment,
                ac.barrel_density,
                area,
            )
        };
        let barrel_frequency = frequency_of(ac.vibration_mode);
        let obt_nodes = optimal_barrel_times(barrel_frequency, ac.obt_nodes);
        let obt_match = matches_barrel_time(barrel_time, &obt_nodes, ac.obt_tolerance);

        let modal_frequencies: Vec<f64> = (1..=ac.deflection_modes).map(frequency_of).collect();
        let amplitudes = vec![1.0; modal_frequencies.len()];

        let impulse = recoil_impulse(
            *inputs.bullet.mass,
            *inputs.charge.mass,
            muzzle_velocity,
            ac.gas_ejecta_multiplier,
        );

        Analytics {
            hoop_stress: lame_hoop_stress(peak_pressure, bore_radius, case_outer, bore_radius),
            case_expansion: case_expansion(
                peak_pressure,
                bore_radius,
                case_outer,
                ac.case_youngs_modulus,
                ac.case_poisson_ratio,
            ),
            erosion: lawton_erosion(ac.erosivity, barrel_time, ac.activation_energy, erosion_temperature),
            barrel_frequency,
            obt_nodes,
            obt_match,
            muzzle_deflection: muzzle_deflection(&amplitudes, &modal_frequencies, barrel_time),
            recoil: free_recoil(impulse, *inputs.barrel.rifle_mass),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Kilograms;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_load_headline_figures() {
        let result = simulate(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();

        assert!(result.exited_barrel);
        assert!(result.is_safe, "warnings: {:?}", result.warnings);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
        assert_relative_eq!(result.peak_pressure.to_psi(), 52_800.0, max_relative = 0.05);
        assert_relative_eq!(result.muzzle_velocity.to_fps(), 2_950.0, max_relative = 0.05);
        assert_relative_eq!(result.barrel_time.to_ms(), 1.36, max_relative = 0.05);
    }

    #[test]
    fn test_curves_share_time_grid() {
        let result = simulate(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();
        let c = &result.curves;
        for curve in [
            &c.velocity,
            &c.travel,
            &c.burn_fraction,
            &c.kinetic_energy,
            &c.gas_temperature,
            &c.heat_loss,
            &c.recoil_impulse,
        ] {
            assert_eq!(curve.len(), 200);
            for (a, b) in curve.iter().zip(&c.breech_pressure) {
                assert_eq!(a.time, b.time);
            }
        }
        assert_eq!(c.breech_pressure.last().unwrap().time, *result.barrel_time);
    }

    #[test]
    fn test_scalars_match_curve_endpoints() {
        let load = LoadInputs::reference_308();
        let result = simulate(&load, &SimulationConfig::default()).unwrap();
        let c = &result.curves;

        assert_eq!(c.velocity.last().unwrap().value, *result.muzzle_velocity);
        assert_eq!(c.kinetic_energy.last().unwrap().value, *result.muzzle_energy);
        assert_relative_eq!(c.recoil_impulse.last().unwrap().value, *result.recoil_impulse, max_relative = 1e-12);
        assert_eq!(
            c.breech_pressure[result.peak_index().unwrap()].value,
            *result.peak_pressure
        );
        assert_relative_eq!(c.travel.last().unwrap().value, 0.559, max_relative = 1e-6);
        assert_relative_eq!(
            result.efficiency,
            *result.muzzle_energy / *load.charge.mass,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            result.spin_rate,
            *result.muzzle_velocity / *load.barrel.twist,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_analytics_populated() {
        let result = simulate(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();
        assert!(*result.hoop_stress > *result.peak_pressure);
        assert!(*result.case_expansion > 0.0);
        assert!(*result.erosion_per_shot > 0.0);
        assert!(*result.barrel_frequency > 0.0);
        assert_eq!(result.optimal_barrel_times.len(), 6);
        assert!(*result.peak_gas_temperature > 300.0);
        assert!(*result.peak_gas_temperature < 4050.0);
        assert!(result.muzzle_deflection.is_finite());
        assert!(result.solver_stats.accepted_steps > 0);
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let load = LoadInputs::reference_308().with_charge(Kilograms::ZERO);
        assert!(matches!(
            simulate(&load, &SimulationConfig::default()),
            Err(InputError::InvalidParameter { name: "charge.mass", .. })
        ));
    }

    #[test]
    fn test_integration_failure_becomes_zero_result() {
        let mut config = SimulationConfig::default();
        config.solver.max_steps = 10;
        let result = simulate(&LoadInputs::reference_308(), &config).unwrap();
        assert!(!result.is_safe);
        assert!(result.integration_failed());
        assert_eq!(result.peak_pressure, Pascals::ZERO);
        assert!(result.curves.is_empty());
    }

    #[test]
    fn test_short_time_limit_reports_no_exit() {
        let mut config = SimulationConfig::default();
        config.solver.time_limit = 0.5e-3;
        let result = simulate(&LoadInputs::reference_308(), &config).unwrap();
        assert!(!result.exited_barrel);
        assert!(result
            .warnings
            .contains(&"Bullet did not exit barrel within integration time".to_string()));
        assert_eq!(result.curves.len(), 200);
        assert_relative_eq!(result.barrel_time.to_ms(), 0.5, epsilon = 1e-9);
    }
}

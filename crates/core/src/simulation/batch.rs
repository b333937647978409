//! Batch services: charge ladders, sensitivity triples, parametric search
//!
//! Each item is an independent call to [`simulate`], so the batches run on
//! the rayon pool with no shared state. Results come back in input order and
//! one failing item never aborts the rest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core_types::components::LoadInputs;
use crate::core_types::units::{
    CubicMeters, Joules, Kilograms, MetersPerSecond, NewtonSeconds, Pascals, Seconds,
};
use crate::error::{require_positive, InputError};
use crate::simulation::catalog::PropellantCatalog;
use crate::simulation::config::SimulationConfig;
use crate::simulation::result::SimulationResult;
use crate::simulation::simulate;

/// Smallest charge a sensitivity run will go down to (grains)
const MIN_SENSITIVITY_CHARGE_GRAINS: f64 = 0.1;

/// Bulk density of granular powder as a fraction of solid density
const SEARCH_BULK_FACTOR: f64 = 0.58;

/// Fraction of case capacity taken as the estimated maximum charge
const SEARCH_FILL_FACTOR: f64 = 0.85;

/// Largest ladder a single request may expand to
pub const MAX_LADDER_STEPS: usize = 200;

/// One charge weight and its run
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeResult {
    pub charge: Kilograms,
    pub result: Result<SimulationResult, InputError>,
}

impl ChargeResult {
    fn run(inputs: &LoadInputs, config: &SimulationConfig, charge: Kilograms) -> Self {
        ChargeResult {
            charge,
            result: simulate(&inputs.with_charge(charge), config),
        }
    }
}

/// Ladder steps are plain charge results
pub type LadderStep = ChargeResult;

/// Center, upper and lower runs of a sensitivity check
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityResult {
    pub center: ChargeResult,
    pub upper: ChargeResult,
    pub lower: ChargeResult,
}

/// Charges from `start` to `end` inclusive in increments of `step`
///
/// The end charge is included when it lies within half a step of the last
/// increment, so floating-point drift never drops it.
///
/// # Errors
/// `InputError::InvalidParameter` for a non-positive step or start, an end
/// below the start, or a step so small the ladder exceeds
/// [`MAX_LADDER_STEPS`].
pub fn ladder_charges(start: Kilograms, end: Kilograms, step: Kilograms) -> Result<Vec<Kilograms>, InputError> {
    require_positive("ladder.start", *start)?;
    require_positive("ladder.step", *step)?;
    if !end.is_positive() || end < start {
        return Err(InputError::invalid("ladder.end", *end));
    }
    let count = ((*end - *start) / *step + 0.5).floor() + 1.0;
    if count > MAX_LADDER_STEPS as f64 {
        return Err(InputError::invalid("ladder.step", *step));
    }
    let limit = *end + *step / 2.0;
    Ok((0..)
        .map(|i| *start + f64::from(i) * *step)
        .take_while(|&c| c < limit)
        .map(Kilograms::new)
        .collect())
}

/// Run one simulation per ladder increment
///
/// # Errors
/// Only for an unusable ladder definition; per-step failures are inside the
/// returned items.
pub fn ladder(
    inputs: &LoadInputs,
    config: &SimulationConfig,
    start: Kilograms,
    end: Kilograms,
    step: Kilograms,
) -> Result<Vec<LadderStep>, InputError> {
    let charges = ladder_charges(start, end, step)?;
    info!(
        "Running {} step ladder {:.1}-{:.1} gr for '{}'",
        charges.len(),
        start.to_grains(),
        end.to_grains(),
        inputs.propellant.name
    );

    Ok(charges
        .par_iter()
        .map(|&charge| ChargeResult::run(inputs, config, charge))
        .collect())
}

/// Run the current charge and `±delta` around it
///
/// The lower charge is floored at 0.1 gr.
pub fn sensitivity(inputs: &LoadInputs, config: &SimulationConfig, delta: Kilograms) -> SensitivityResult {
    let center = inputs.charge.mass;
    let upper = center + delta;
    let lower = (center - delta).max(Kilograms::from_grains(MIN_SENSITIVITY_CHARGE_GRAINS));

    let (center, (upper, lower)) = rayon::join(
        || ChargeResult::run(inputs, config, center),
        || {
            rayon::join(
                || ChargeResult::run(inputs, config, upper),
                || ChargeResult::run(inputs, config, lower),
            )
        },
    );

    SensitivityResult { center, upper, lower }
}

/// Charge window for a parametric search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Lowest charge as a fraction of the estimated maximum
    pub min_fraction: f64,
    /// Highest charge as a fraction of the estimated maximum
    pub max_fraction: f64,
    /// Charges per propellant, evenly spaced
    pub steps: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            min_fraction: 0.70,
            max_fraction: 1.0,
            steps: 5,
        }
    }
}

impl SearchRequest {
    fn validate(&self) -> Result<(), InputError> {
        require_positive("search.min_fraction", self.min_fraction)?;
        if !(self.max_fraction.is_finite() && self.max_fraction >= self.min_fraction) {
            return Err(InputError::invalid("search.max_fraction", self.max_fraction));
        }
        if self.steps < 2 {
            return Err(InputError::invalid("search.steps", self.steps as f64));
        }
        Ok(())
    }
}

/// Headline figures of one charge in a search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSummary {
    pub charge: Kilograms,
    pub peak_pressure: Pascals,
    pub muzzle_velocity: MetersPerSecond,
    pub is_safe: bool,
}

/// Search outcome for one propellant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowderSearchResult {
    pub propellant: String,
    pub is_viable: bool, // at least one safe charge
    pub optimal_charge: Option<Kilograms>,
    pub peak_pressure: Pascals,
    pub muzzle_velocity: MetersPerSecond,
    pub pressure_percent: f64, // of rated maximum
    pub efficiency: f64,       // muzzle energy ft-lbs per grain of charge
    pub barrel_time: Seconds,
    pub recoil_energy: Joules,
    pub recoil_impulse: NewtonSeconds,
    pub all_results: Vec<ChargeSummary>,
    pub error: Option<String>,
}

impl PowderSearchResult {
    fn empty(propellant: &str) -> Self {
        PowderSearchResult {
            propellant: propellant.to_string(),
            is_viable: false,
            optimal_charge: None,
            peak_pressure: Pascals::ZERO,
            muzzle_velocity: MetersPerSecond::ZERO,
            pressure_percent: 0.0,
            efficiency: 0.0,
            barrel_time: Seconds::ZERO,
            recoil_energy: Joules::ZERO,
            recoil_impulse: NewtonSeconds::ZERO,
            all_results: Vec::new(),
            error: None,
        }
    }
}

/// Parametric search over a whole catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Viable propellants by muzzle velocity descending, then the rest
    pub results: Vec<PowderSearchResult>,
    pub total_tested: usize,
    pub viable: usize,
}

/// Estimated maximum charge for a case: `capacity × ρ_solid × 0.58 × 0.85`
pub fn estimated_max_charge(case_capacity: CubicMeters, solid_density: f64) -> Kilograms {
    Kilograms::new(*case_capacity * solid_density * SEARCH_BULK_FACTOR * SEARCH_FILL_FACTOR)
}

/// Evenly spaced charges between the request's fractions of `max_charge`
pub fn search_charges(max_charge: Kilograms, request: &SearchRequest) -> Vec<Kilograms> {
    let lo = *max_charge * request.min_fraction;
    let hi = *max_charge * request.max_fraction;
    let last = request.steps.saturating_sub(1).max(1) as f64;
    (0..request.steps)
        .map(|i| {
            if i + 1 == request.steps {
                Kilograms::new(hi)
            } else {
                Kilograms::new(lo + (hi - lo) * i as f64 / last)
            }
        })
        .collect()
}

/// Find the best safe charge of every catalog propellant for one rifle
///
/// `base` supplies the bullet, chamber and barrel; its propellant and charge
/// are replaced per item. A propellant whose runs cannot be made is reported
/// with its error string and sorted with the non-viable results.
///
/// # Errors
/// Only for an unusable request or case capacity.
pub fn parametric_search(
    catalog: &PropellantCatalog,
    base: &LoadInputs,
    case_capacity: CubicMeters,
    request: &SearchRequest,
    config: &SimulationConfig,
) -> Result<SearchReport, InputError> {
    request.validate()?;
    require_positive("search.case_capacity", *case_capacity)?;

    let propellants: Vec<_> = catalog.iter().collect();
    info!(
        "Parametric search over {} propellants, {} charges each",
        propellants.len(),
        request.steps
    );

    let results: Vec<PowderSearchResult> = propellants
        .par_iter()
        .map(|prop| {
            let inputs = LoadInputs {
                propellant: (*prop).clone(),
                ..base.clone()
            };
            search_one(&inputs, case_capacity, request, config).unwrap_or_else(|e| {
                warn!("Parametric search failed for powder {}: {}", prop.name, e);
                PowderSearchResult {
                    error: Some(e.to_string()),
                    ..PowderSearchResult::empty(&prop.name)
                }
            })
        })
        .collect();

    let total_tested = results.len();
    let (mut viable, rest): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.is_viable);
    viable.sort_by(|a, b| b.muzzle_velocity.cmp(&a.muzzle_velocity));
    let viable_count = viable.len();
    viable.extend(rest);

    Ok(SearchReport {
        results: viable,
        total_tested,
        viable: viable_count,
    })
}

fn search_one(
    inputs: &LoadInputs,
    case_capacity: CubicMeters,
    request: &SearchRequest,
    config: &SimulationConfig,
) -> Result<PowderSearchResult, InputError> {
    let max_charge = estimated_max_charge(case_capacity, *inputs.propellant.solid_density);
    let mut summary = PowderSearchResult::empty(&inputs.propellant.name);
    let mut best: Option<(Kilograms, SimulationResult)> = None;

    for charge in search_charges(max_charge, request) {
        let result = simulate(&inputs.with_charge(charge), config)?;
        summary.all_results.push(ChargeSummary {
            charge,
            peak_pressure: result.peak_pressure,
            muzzle_velocity: result.muzzle_velocity,
            is_safe: result.is_safe,
        });

        let faster = match &best {
            Some((_, b)) => result.muzzle_velocity > b.muzzle_velocity,
            None => true,
        };
        if result.is_safe && faster {
            best = Some((charge, result));
        }
    }

    if let Some((charge, result)) = best {
        let grains = charge.to_grains();
        summary.is_viable = true;
        summary.optimal_charge = Some(charge);
        summary.peak_pressure = result.peak_pressure;
        summary.muzzle_velocity = result.muzzle_velocity;
        summary.pressure_percent = result.peak_pressure / inputs.chamber.max_pressure * 100.0;
        summary.efficiency = if grains > 0.0 {
            result.muzzle_energy.to_ft_lbs() / grains
        } else {
            0.0
        };
        summary.barrel_time = result.barrel_time;
        summary.recoil_energy = result.recoil_energy;
        summary.recoil_impulse = result.recoil_impulse;
    }

    Ok(summary)
}

//! Adaptive integration of the interior-ballistics system
//!
//! The integrator is generic over any fixed-size ODE; the ballistics right-hand
//! side plugs into it through [`OdeSystem`]. Output curves are produced by
//! resampling the dense interpolant, never from the raw adaptive steps.
//!
//! # Example
//!
//! ```
//! use bore_sim_core::solver::{integrate_load, sample_uniform};
//! use bore_sim_core::{LoadInputs, SimulationConfig};
//!
//! let run = integrate_load(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();
//! let samples = sample_uniform(&run.solution.dense, run.exit_time(), 200);
//! assert_eq!(samples.len(), 200);
//! ```

pub mod ode;
pub mod sampling;
pub mod system;

pub use ode::{
    DenseOutput, Dopri5, IntegrationError, OdeSystem, Solution, Stats, StepController,
    Termination, Tolerances,
};
pub use sampling::{sample_uniform, Samples};
pub use system::{BallisticState, GasConditions, InteriorBallistics};

use crate::core_types::components::LoadInputs;
use crate::simulation::config::SimulationConfig;
use tracing::debug;

/// Integrated trajectory of one load
#[derive(Debug, Clone)]
pub struct BallisticRun {
    pub system: InteriorBallistics,
    pub solution: Solution<4>,
}

impl BallisticRun {
    /// True when the bullet reached the muzzle before the time ceiling
    pub fn exited(&self) -> bool {
        matches!(self.solution.termination, Termination::Event { .. })
    }

    /// Muzzle exit time, or the time ceiling when the bullet never exited (s)
    pub fn exit_time(&self) -> f64 {
        self.solution.termination.time()
    }
}

/// Integrate a load from ignition to muzzle exit or the time ceiling
///
/// # Errors
/// Any [`IntegrationError`] raised by the step loop.
pub fn integrate_load(
    inputs: &LoadInputs,
    config: &SimulationConfig,
) -> Result<BallisticRun, IntegrationError> {
    let system = InteriorBallistics::new(inputs, config);
    let sc = &config.solver;
    let solver = Dopri5::new(Tolerances::new(sc.rtol, sc.atol))
        .with_steps(sc.initial_step, sc.max_step)
        .with_max_steps(sc.max_steps);

    let y0 = system.initial_state();
    let solution = solver.integrate(&system, 0.0, &y0, sc.time_limit, |_t, y| {
        system.muzzle_event(y)
    })?;

    debug!(
        "Integration finished: t={:.4}ms, {} accepted / {} rejected steps, {} RHS evaluations",
        solution.termination.time() * 1e3,
        solution.stats.accepted_steps,
        solution.stats.rejected_steps,
        solution.stats.rhs_evals
    );

    Ok(BallisticRun { system, solution })
}

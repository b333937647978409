//! Dormand-Prince 5(4) integrator with dense output and terminal events
//!
//! A 7-stage embedded RK5(4) pair with the first-same-as-last property and
//! the fourth-order continuous extension of Hairer, Nørsett and Wanner. Every
//! accepted step keeps its interpolation coefficients, so the trajectory can
//! be evaluated at any time inside the integrated span without re-solving.
//!
//! # References
//! - Dormand, J.R., Prince, P.J. (1980). "A family of embedded Runge-Kutta
//!   formulae." J. Comp. Appl. Math. 6(1), 19-26.
//! - Hairer, E., Nørsett, S.P., Wanner, G. (1993). "Solving Ordinary
//!   Differential Equations I", 2nd ed. Springer. Section II.6 (DOPRI5).

use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::fmt;

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [&[f64]; 7] = [
    &[],
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[9017.0 / 3168.0, -355.0 / 33.0, 46732.0 / 5247.0, 49.0 / 176.0, -5103.0 / 18656.0],
    // Fifth-order weights, reused as the last stage (FSAL)
    &[35.0 / 384.0, 0.0, 500.0 / 1113.0, 125.0 / 192.0, -2187.0 / 6784.0, 11.0 / 84.0],
];

/// Difference between the fifth- and fourth-order weights
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

/// Dense-output weights of the continuous extension
const D: [f64; 7] = [
    -12715105075.0 / 11282082432.0,
    0.0,
    87487479700.0 / 32700410799.0,
    -10690763975.0 / 1880347072.0,
    701980252875.0 / 199316789632.0,
    -1453857185.0 / 822651844.0,
    69997945.0 / 29380423.0,
];

/// System of ordinary differential equations `dy/dt = f(t, y)`
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side
    fn rhs(&self, t: f64, y: &SVector<f64, N>) -> SVector<f64, N>;
}

/// Error tolerances, applied uniformly to every component
///
/// The per-component scale is `atol + rtol·max(|y|, |y_new|)` and the step
/// error is the RMS of the scaled component errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerances {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Tolerances { rtol, atol }
    }
}

/// Step-size controller: `h_new = h·clamp(safety·err^(−1/5), min, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepController {
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for StepController {
    fn default() -> Self {
        StepController {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }
}

impl StepController {
    /// Step size multiplier for a normalized error
    pub fn factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        (self.safety * error.powf(-0.2)).clamp(self.min_factor, self.max_factor)
    }
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub rhs_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

/// Errors that stop the integration
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// The state or its derivative stopped being finite
    NonFiniteState { t: f64 },
    /// The controller asked for a step below the minimum
    StepSizeTooSmall { t: f64, h: f64 },
    /// Step budget exhausted
    MaxStepsExceeded { t: f64, steps: u64 },
    /// Bad initial conditions or solver settings
    InvalidInput { message: String },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationError::NonFiniteState { t } => {
                write!(f, "Non-finite state detected at t = {t:e} s")
            }
            IntegrationError::StepSizeTooSmall { t, h } => {
                write!(f, "Step size {h:e} s too small at t = {t:e} s")
            }
            IntegrationError::MaxStepsExceeded { t, steps } => {
                write!(f, "Maximum of {steps} integration steps exceeded at t = {t:e} s")
            }
            IntegrationError::InvalidInput { message } => write!(f, "Invalid input: {message}"),
        }
    }
}

impl std::error::Error for IntegrationError {}

/// Continuous extension over one accepted step
#[derive(Debug, Clone, Copy)]
struct DenseSegment<const N: usize> {
    t0: f64,
    h: f64,
    r: [SVector<f64, N>; 5],
}

impl<const N: usize> DenseSegment<N> {
    fn new(t0: f64, h: f64, y0: &SVector<f64, N>, y1: &SVector<f64, N>, k: &[SVector<f64, N>; 7]) -> Self {
        let r1 = *y0;
        let r2 = y1 - y0;
        let r3 = k[0] * h - r2;
        let r4 = r2 - k[6] * h - r3;
        let mut r5 = SVector::<f64, N>::zeros();
        for (ki, di) in k.iter().zip(D.iter()) {
            r5 += ki * (*di * h);
        }
        DenseSegment {
            t0,
            h,
            r: [r1, r2, r3, r4, r5],
        }
    }

    fn evaluate(&self, t: f64) -> SVector<f64, N> {
        let theta = (t - self.t0) / self.h;
        let theta1 = 1.0 - theta;
        let [r1, r2, r3, r4, r5] = &self.r;
        r1 + (r2 + (r3 + (r4 + r5 * theta1) * theta) * theta1) * theta
    }

    fn end(&self) -> f64 {
        self.t0 + self.h
    }
}

/// Piecewise continuous interpolant over the whole integrated span
#[derive(Debug, Clone)]
pub struct DenseOutput<const N: usize> {
    t_start: f64,
    t_end: f64,
    initial: SVector<f64, N>,
    segments: Vec<DenseSegment<N>>,
}

impl<const N: usize> DenseOutput<N> {
    fn new(t_start: f64, initial: SVector<f64, N>) -> Self {
        DenseOutput {
            t_start,
            t_end: t_start,
            initial,
            segments: Vec::new(),
        }
    }

    /// Interpolated state at `t`, clamped to the integrated span
    pub fn evaluate(&self, t: f64) -> SVector<f64, N> {
        if self.segments.is_empty() {
            return self.initial;
        }
        let t = t.clamp(self.t_start, self.t_end);
        let idx = self
            .segments
            .partition_point(|s| s.end() < t)
            .min(self.segments.len() - 1);
        self.segments[idx].evaluate(t)
    }

    /// Start of the integrated span
    pub fn t_start(&self) -> f64 {
        self.t_start
    }

    /// End of the integrated span (the event time when one fired)
    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    /// Number of accepted steps backing the interpolant
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// How the integration ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// The terminal event fired at `t`
    Event { t: f64 },
    /// The time horizon was reached without the event
    Horizon { t: f64 },
}

impl Termination {
    /// Final time of the trajectory
    pub fn time(&self) -> f64 {
        match *self {
            Termination::Event { t } | Termination::Horizon { t } => t,
        }
    }
}

/// Trajectory produced by [`Dopri5::integrate`]
#[derive(Debug, Clone)]
pub struct Solution<const N: usize> {
    pub termination: Termination,
    pub y_final: SVector<f64, N>,
    pub dense: DenseOutput<N>,
    pub stats: Stats,
}

/// Dormand-Prince 5(4) integrator
///
/// # Example
/// ```
/// use bore_sim_core::solver::ode::{Dopri5, OdeSystem, Termination, Tolerances};
/// use nalgebra::SVector;
///
/// struct Decay;
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, y: &SVector<f64, 1>) -> SVector<f64, 1> {
///         -y
///     }
/// }
///
/// let solver = Dopri5::new(Tolerances::new(1e-10, 1e-12));
/// let y0 = SVector::<f64, 1>::new(1.0);
/// // Stop when y falls to one half
/// let sol = solver
///     .integrate(&Decay, 0.0, &y0, 5.0, |_t, y| 0.5 - y[0])
///     .unwrap();
/// assert!(matches!(sol.termination, Termination::Event { .. }));
/// assert!((sol.termination.time() - std::f64::consts::LN_2).abs() < 1e-8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dopri5 {
    pub tolerances: Tolerances,
    pub controller: StepController,
    pub h_init: f64,
    pub h_min: f64,
    pub h_max: f64,
    pub max_steps: u64,
}

impl Dopri5 {
    pub fn new(tolerances: Tolerances) -> Self {
        Dopri5 {
            tolerances,
            controller: StepController::default(),
            h_init: 1e-8,
            h_min: 1e-15,
            h_max: f64::INFINITY,
            max_steps: 1_000_000,
        }
    }

    /// Set the initial and maximum step sizes
    pub fn with_steps(mut self, h_init: f64, h_max: f64) -> Self {
        self.h_init = h_init;
        self.h_max = h_max;
        self
    }

    /// Set the step budget (accepted plus rejected)
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Integrate from `t0` until `event` crosses zero upward or `t_end` is reached
    ///
    /// The event function is evaluated at accepted step ends. When it goes
    /// from negative to non-negative, the crossing is located by bisection on
    /// the dense interpolant and the trajectory is truncated there.
    ///
    /// # Errors
    /// Returns [`IntegrationError`] when the inputs are unusable, the state
    /// becomes non-finite, the step size collapses or the step budget runs out.
    pub fn integrate<S, G, const N: usize>(
        &self,
        sys: &S,
        t0: f64,
        y0: &SVector<f64, N>,
        t_end: f64,
        event: G,
    ) -> Result<Solution<N>, IntegrationError>
    where
        S: OdeSystem<N>,
        G: Fn(f64, &SVector<f64, N>) -> f64,
    {
        self.validate_inputs(t0, y0, t_end)?;

        let mut stats = Stats::default();
        let mut dense = DenseOutput::new(t0, *y0);
        let mut t = t0;
        let mut y = *y0;
        let mut h = self.h_init;
        let mut g_prev = event(t, &y);

        let mut k = [SVector::<f64, N>::zeros(); 7];
        k[0] = sys.rhs(t, &y);
        stats.rhs_evals += 1;
        if !k[0].iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::NonFiniteState { t });
        }

        let mut steps = 0u64;
        while t_end - t > self.h_min {
            let remaining = t_end - t;
            h = h.min(self.h_max);
            let last = h >= remaining;
            if last {
                h = remaining;
            }
            if h < self.h_min {
                return Err(IntegrationError::StepSizeTooSmall { t, h });
            }

            let y_new = Self::stages(sys, t, &y, h, &mut k);
            stats.rhs_evals += 6;
            if !y_new.iter().all(|v| v.is_finite()) || !k[6].iter().all(|v| v.is_finite()) {
                return Err(IntegrationError::NonFiniteState { t });
            }

            let error = self.error_norm(&y, &y_new, &k, h);
            steps += 1;

            if error <= 1.0 {
                stats.accepted_steps += 1;
                let t_new = if last { t_end } else { t + h };
                let segment = DenseSegment::new(t, t_new - t, &y, &y_new, &k);
                dense.segments.push(segment);
                dense.t_end = t_new;

                let g_new = event(t_new, &y_new);
                if g_prev < 0.0 && g_new >= 0.0 {
                    let t_event = locate_crossing(&segment, &event, t, t_new);
                    dense.t_end = t_event;
                    return Ok(Solution {
                        termination: Termination::Event { t: t_event },
                        y_final: dense.evaluate(t_event),
                        dense,
                        stats,
                    });
                }

                g_prev = g_new;
                t = t_new;
                y = y_new;
                k[0] = k[6];
                h *= self.controller.factor(error);
            } else {
                stats.rejected_steps += 1;
                h *= self.controller.factor(error).min(1.0);
            }

            if steps >= self.max_steps {
                return Err(IntegrationError::MaxStepsExceeded { t, steps });
            }
        }

        Ok(Solution {
            termination: Termination::Horizon { t },
            y_final: y,
            dense,
            stats,
        })
    }

    /// Evaluate stages 2-7 into `k` and return the fifth-order solution
    fn stages<S, const N: usize>(
        sys: &S,
        t: f64,
        y: &SVector<f64, N>,
        h: f64,
        k: &mut [SVector<f64, N>; 7],
    ) -> SVector<f64, N>
    where
        S: OdeSystem<N>,
    {
        for i in 1..6 {
            let yi = y + weighted_sum(&k[..i], A[i]) * h;
            k[i] = sys.rhs(t + C[i] * h, &yi);
        }
        // Last row is the solution itself; its derivative is the FSAL stage
        let y_new = y + weighted_sum(&k[..6], A[6]) * h;
        k[6] = sys.rhs(t + h, &y_new);
        y_new
    }

    /// RMS of the scaled embedded error
    fn error_norm<const N: usize>(
        &self,
        y: &SVector<f64, N>,
        y_new: &SVector<f64, N>,
        k: &[SVector<f64, N>; 7],
        h: f64,
    ) -> f64 {
        let mut err = SVector::<f64, N>::zeros();
        for (ki, ei) in k.iter().zip(E.iter()) {
            err += ki * (*ei * h);
        }
        let Tolerances { rtol, atol } = self.tolerances;
        let sum: f64 = (0..N)
            .map(|j| {
                let scale = atol + rtol * y[j].abs().max(y_new[j].abs());
                (err[j] / scale).powi(2)
            })
            .sum();
        (sum / N as f64).sqrt()
    }

    fn validate_inputs<const N: usize>(
        &self,
        t0: f64,
        y0: &SVector<f64, N>,
        t_end: f64,
    ) -> Result<(), IntegrationError> {
        if !t0.is_finite() || !t_end.is_finite() || t_end < t0 {
            return Err(IntegrationError::InvalidInput {
                message: format!("time span [{t0}, {t_end}] must be finite and ordered"),
            });
        }
        if !(self.h_init.is_finite() && self.h_init > 0.0 && self.h_max > 0.0) {
            return Err(IntegrationError::InvalidInput {
                message: "initial and maximum step must be positive".to_string(),
            });
        }
        let Tolerances { rtol, atol } = self.tolerances;
        if !(atol.is_finite() && atol > 0.0 && rtol.is_finite() && rtol >= 0.0) {
            return Err(IntegrationError::InvalidInput {
                message: format!("tolerances must be finite with atol > 0, got rtol={rtol}, atol={atol}"),
            });
        }
        if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
            return Err(IntegrationError::InvalidInput {
                message: format!("y0[{i}] is not finite"),
            });
        }
        Ok(())
    }
}

/// `Σ wᵢ·kᵢ` over the stages a row of the tableau touches
fn weighted_sum<const N: usize>(k: &[SVector<f64, N>], weights: &[f64]) -> SVector<f64, N> {
    k.iter()
        .zip(weights)
        .fold(SVector::<f64, N>::zeros(), |acc, (ki, wi)| acc + ki * *wi)
}

/// Bisection for the first time in `[lo, hi]` where the event is non-negative
fn locate_crossing<G, const N: usize>(segment: &DenseSegment<N>, event: &G, mut lo: f64, mut hi: f64) -> f64
where
    G: Fn(f64, &SVector<f64, N>) -> f64,
{
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if event(mid, &segment.evaluate(mid)) >= 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

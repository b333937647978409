//! Fixed-count resampling of the dense trajectory

use crate::solver::ode::DenseOutput;
use crate::solver::system::BallisticState;

/// Evenly spaced samples of a trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    pub times: Vec<f64>,
    pub states: Vec<BallisticState>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// State at the final sample
    pub fn last(&self) -> Option<&BallisticState> {
        self.states.last()
    }
}

/// Sample `count` states at evenly spaced times over `[0, t_end]`
///
/// The first and last samples fall exactly on the endpoints, so the output
/// length never depends on how many adaptive steps were taken. Each state
/// component is carried forward as a running maximum: burn depth, travel,
/// velocity and heat loss cannot decrease, and the interpolant may dip by
/// round-off where a component is flat.
pub fn sample_uniform(dense: &DenseOutput<4>, t_end: f64, count: usize) -> Samples {
    let mut times = Vec::with_capacity(count);
    let mut states: Vec<BallisticState> = Vec::with_capacity(count);
    let last = count.saturating_sub(1).max(1) as f64;

    for i in 0..count {
        let t = if i + 1 == count {
            t_end
        } else {
            t_end * i as f64 / last
        };
        let mut y = dense.evaluate(t);
        if let Some(prev) = states.last() {
            y = y.sup(prev);
        }
        times.push(t);
        states.push(y);
    }

    Samples { times, states }
}

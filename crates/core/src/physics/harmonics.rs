//! Barrel vibration: Euler-Bernoulli cantilever modes and optimal barrel times
//!
//! The barrel is modeled as a uniform annular cantilever clamped at the
//! receiver. Optimal barrel times (OBT) are the dwell times at which the
//! muzzle sits at a vibration anti-node, where its velocity and therefore
//! exit-angle sensitivity to small timing changes is smallest.
//!
//! # References
//! - Rao, S.S. (2007). "Vibration of Continuous Systems." Wiley. Section 11.5.
//! - Calfee, D. "Optimal Charge Weight" load development method (OCW).

use std::f64::consts::PI;

/// First four cantilever eigenvalues `λₙ` (clamped-free beam)
const CANTILEVER_EIGENVALUES: [f64; 4] = [1.8751, 4.6941, 7.8548, 10.996];

/// Eigenvalue for a 1-indexed mode; higher modes use `(2n − 1)·π/2`
pub fn eigenvalue(mode: usize) -> f64 {
    match mode {
        1..=4 => CANTILEVER_EIGENVALUES[mode - 1],
        _ => (2.0 * mode as f64 - 1.0) * PI / 2.0,
    }
}

/// Second moment of area and cross-section area of an annular barrel
///
/// # Returns
/// `(I, A)` in m⁴ and m²
pub fn annular_section(outer_radius: f64, inner_radius: f64) -> (f64, f64) {
    let second_moment = PI / 4.0 * (outer_radius.powi(4) - inner_radius.powi(4));
    let area = PI * (outer_radius.powi(2) - inner_radius.powi(2));
    (second_moment, area)
}

/// Natural frequency of a uniform cantilever
///
/// # Formula
/// ```text
/// fₙ = λₙ² / (2π·L²) · √(E·I / (ρ·A))
/// ```
///
/// # Arguments
/// * `mode` - Mode number, 1-indexed
/// * `length` - Free length `L` (m)
/// * `youngs_modulus` - `E` (Pa)
/// * `second_moment` - `I` (m⁴)
/// * `density` - `ρ` (kg/m³)
/// * `area` - `A` (m²)
pub fn cantilever_frequency(
    mode: usize,
    length: f64,
    youngs_modulus: f64,
    second_moment: f64,
    density: f64,
    area: f64,
) -> f64 {
    let lambda = eigenvalue(mode);
    lambda * lambda / (2.0 * PI * length * length) * (youngs_modulus * second_moment / (density * area)).sqrt()
}

/// Optimal barrel times `tₖ = (2k − 1) / (4f)`, k = 1..=n (s)
pub fn optimal_barrel_times(dominant_frequency: f64, n_nodes: usize) -> Vec<f64> {
    (1..=n_nodes)
        .map(|k| (2.0 * k as f64 - 1.0) / (4.0 * dominant_frequency))
        .collect()
}

/// True when `dwell_time` lies within `tolerance` of any node (all in seconds)
pub fn matches_barrel_time(dwell_time: f64, nodes: &[f64], tolerance: f64) -> bool {
    nodes.iter().any(|node| (dwell_time - node).abs() <= tolerance)
}

/// Muzzle deflection as a superposition of modal sine terms
///
/// `δ(t) = Σ Aₙ·sin(2π·fₙ·t)`, assuming the mode shape peaks at the muzzle.
/// Pairs beyond the shorter of the two slices are ignored.
pub fn muzzle_deflection(amplitudes: &[f64], frequencies: &[f64], time: f64) -> f64 {
    amplitudes
        .iter()
        .zip(frequencies)
        .map(|(amp, freq)| amp * (2.0 * PI * freq * time).sin())
        .sum()
}

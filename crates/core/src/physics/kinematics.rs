//! Bore geometry and projectile motion
//!
//! Lumped-parameter kinematics: the gas behind the bullet is treated as a
//! single control volume whose average pressure is related to the breech and
//! bullet-base pressures by the Lagrange gradient.
//!
//! # References
//! - Lagrange ballistic problem, as presented in Corner (1950), Chapter 4
//! - STANAG 4367 (2012), "Thermodynamic Interior Ballistic Model with Global
//!   Parameters"

use std::f64::consts::PI;

/// Bore cross-section area from the bore diameter (m²)
pub fn bore_area(bore_diameter: f64) -> f64 {
    PI * (bore_diameter / 2.0).powi(2)
}

/// Free gas volume behind the bullet
///
/// # Formula
/// ```text
/// V_free = V₀ + A·x − (ω/ρ)·(1 − ψ)
/// ```
///
/// Unburned solid propellant still occupies part of the chamber.
///
/// # Arguments
/// * `chamber_volume` - Chamber volume `V₀` (m³)
/// * `bore_area` - Bore cross-section `A` (m²)
/// * `displacement` - Bullet travel `x` (m)
/// * `charge_mass` - Charge mass `ω` (kg)
/// * `solid_density` - Solid grain density `ρ` (kg/m³)
/// * `psi` - Burned fraction
pub fn free_volume(
    chamber_volume: f64,
    bore_area: f64,
    displacement: f64,
    charge_mass: f64,
    solid_density: f64,
    psi: f64,
) -> f64 {
    chamber_volume + bore_area * displacement - (charge_mass / solid_density) * (1.0 - psi)
}

/// Pressure at the bullet base from the space-averaged pressure
///
/// `P_s = P_avg / (1 + ω/(3m))`
pub fn base_pressure(avg_pressure: f64, charge_mass: f64, bullet_mass: f64) -> f64 {
    avg_pressure / (1.0 + charge_mass / (3.0 * bullet_mass))
}

/// Breech pressure from the bullet-base pressure
///
/// `P_b = P_s·(1 + ω/(2m))`. This is what a chamber transducer reads.
pub fn breech_pressure(base_pressure: f64, charge_mass: f64, bullet_mass: f64) -> f64 {
    base_pressure * (1.0 + charge_mass / (2.0 * bullet_mass))
}

/// Effective moving mass: bullet plus a third of the gas column
pub fn effective_mass(bullet_mass: f64, charge_mass: f64) -> f64 {
    bullet_mass + charge_mass / 3.0
}

/// Bullet acceleration from the net forward force, clamped to ≥ 0
///
/// `a = (P_s·A − F_friction) / m_eff`
pub fn bullet_acceleration(
    base_pressure: f64,
    bore_area: f64,
    friction_force: f64,
    effective_mass: f64,
) -> f64 {
    ((base_pressure * bore_area - friction_force) / effective_mass).max(0.0)
}

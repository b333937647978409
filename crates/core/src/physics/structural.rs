//! Thick-wall case stress and barrel throat erosion
//!
//! # References
//! - Timoshenko, S. (1956). "Strength of Materials, Part II", Lamé solution
//!   for thick-walled cylinders under internal pressure.
//! - Lawton, B. (2001). "Thermo-chemical erosion in gun barrels."
//!   Wear, 251, 827-838.

use super::combustion::R_UNIVERSAL;

/// Lamé hoop stress in a thick-walled cylinder (external pressure zero)
///
/// # Formula
/// ```text
/// σθ(r) = P·rᵢ² / (rₒ² − rᵢ²) · (1 + rₒ²/r²)
/// ```
///
/// # Arguments
/// * `internal_pressure` - Internal pressure `P` (Pa)
/// * `inner_radius` - `rᵢ` (m)
/// * `outer_radius` - `rₒ` (m)
/// * `eval_radius` - Radius `r` at which the stress is evaluated (m)
///
/// # Returns
/// Hoop stress in Pa (maximum at the bore surface `r = rᵢ`)
pub fn lame_hoop_stress(
    internal_pressure: f64,
    inner_radius: f64,
    outer_radius: f64,
    eval_radius: f64,
) -> f64 {
    let ri2 = inner_radius * inner_radius;
    let ro2 = outer_radius * outer_radius;
    let r2 = eval_radius * eval_radius;
    internal_pressure * ri2 / (ro2 - ri2) * (1.0 + ro2 / r2)
}

/// Radial displacement of the outer case wall under internal pressure
///
/// Plane-stress Lamé displacement evaluated at `r = rₒ`:
///
/// ```text
/// u(r) = P·rᵢ² / (E·(rₒ² − rᵢ²)) · ((1 − ν)·r + (1 + ν)·rₒ²/r)
/// ```
///
/// At the outer surface the Poisson terms combine to `2·rₒ`.
pub fn case_expansion(
    internal_pressure: f64,
    inner_radius: f64,
    outer_radius: f64,
    youngs_modulus: f64,
    poisson_ratio: f64,
) -> f64 {
    let ri2 = inner_radius * inner_radius;
    let ro2 = outer_radius * outer_radius;
    let r = outer_radius;
    internal_pressure * ri2 / (youngs_modulus * (ro2 - ri2))
        * ((1.0 - poisson_ratio) * r + (1.0 + poisson_ratio) * ro2 / r)
}

/// Single-shot throat erosion depth from Lawton's Arrhenius model
///
/// # Formula
/// ```text
/// W = E_r·√t·exp(−E_a / (R·T))
/// ```
///
/// # Arguments
/// * `erosivity` - Propellant erosivity constant `E_r` (m/s^0.5)
/// * `exposure_time` - Gas exposure time (s), taken as the barrel dwell time
/// * `activation_energy` - `E_a` (J/mol)
/// * `surface_temperature` - Peak surface temperature (K)
///
/// # Returns
/// Erosion depth in meters; 0 for a non-positive temperature
pub fn lawton_erosion(
    erosivity: f64,
    exposure_time: f64,
    activation_energy: f64,
    surface_temperature: f64,
) -> f64 {
    if surface_temperature <= 0.0 {
        return 0.0;
    }
    erosivity
        * exposure_time.max(0.0).sqrt()
        * (-activation_energy / (R_UNIVERSAL * surface_temperature)).exp()
}

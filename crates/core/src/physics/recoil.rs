//! Free recoil of the rifle
//!
//! Momentum balance between the rifle and everything leaving the muzzle:
//! the bullet at muzzle velocity plus the propellant gas at a multiple of it.
//! Rifle mass enters only here, never in the interior-ballistics solve.
//!
//! # References
//! - SAAMI, "Free Recoil" definitions; gas ejecta velocity factor of 1.5-1.75
//!   for smokeless rifle propellants.

/// Free recoil outcome for one shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeRecoil {
    pub impulse: f64,  // N·s
    pub velocity: f64, // m/s
    pub energy: f64,   // J
}

/// Momentum carried out of the muzzle
///
/// `I = m_bullet·v + m_charge·(k·v)` with `k` the gas-ejecta multiplier.
pub fn recoil_impulse(bullet_mass: f64, charge_mass: f64, velocity: f64, ejecta_multiplier: f64) -> f64 {
    bullet_mass * velocity + charge_mass * ejecta_multiplier * velocity
}

/// Free recoil velocity and energy of a rifle of the given mass
///
/// A non-positive rifle mass yields zero velocity and energy.
pub fn free_recoil(impulse: f64, rifle_mass: f64) -> FreeRecoil {
    if rifle_mass <= 0.0 {
        return FreeRecoil {
            impulse,
            velocity: 0.0,
            energy: 0.0,
        };
    }
    let velocity = impulse / rifle_mass;
    FreeRecoil {
        impulse,
        velocity,
        energy: 0.5 * rifle_mass * velocity * velocity,
    }
}

//! Closed-form physics models for interior ballistics

pub(crate) mod combustion;
pub(crate) mod harmonics;
pub(crate) mod heat_loss;
pub(crate) mod kinematics;
pub(crate) mod recoil;
pub(crate) mod structural;

// ============================================================================
// PUBLIC RE-EXPORTS FOR VALIDATION TESTING
// ============================================================================
// Integration tests check each closed-form model against hand-computed values
// and published behavior, so the pure functions are exposed here.

/// Public re-exports of validation test functions from combustion module
pub mod combustion_validation {
    pub use super::combustion::{
        burn_fraction_piecewise, burn_fraction_quadratic, burn_rate_vieille, flame_temperature,
        pressure_noble_abel,
    };
}

/// Public re-exports of validation test functions from kinematics module
pub mod kinematics_validation {
    pub use super::kinematics::{
        base_pressure, bore_area, breech_pressure, bullet_acceleration, free_volume,
    };
}

/// Public re-exports of validation test functions from heat_loss module
pub mod heat_loss_validation {
    pub use super::heat_loss::{exposed_wall_area, wall_heat_flux};
}

/// Public re-exports of validation test functions from structural module
pub mod structural_validation {
    pub use super::structural::{case_expansion, lame_hoop_stress, lawton_erosion};
}

/// Public re-exports of validation test functions from harmonics module
pub mod harmonics_validation {
    pub use super::harmonics::{
        cantilever_frequency, matches_barrel_time, muzzle_deflection, optimal_barrel_times,
    };
}

/// Public re-exports of validation test functions from recoil module
pub mod recoil_validation {
    pub use super::recoil::{free_recoil, recoil_impulse, FreeRecoil};
}

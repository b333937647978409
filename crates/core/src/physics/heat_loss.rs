//! Convective heat loss to the bore wall (Thornhill-type correction)
//!
//! Heat lost to the barrel is subtracted from the energy available to the
//! gas, which lowers pressure relative to the adiabatic prediction.

use std::f64::consts::PI;

use super::combustion::R_UNIVERSAL;

/// Convective heat flux into the wall, `dQ/dt = h·A·(T_gas − T_wall)` (W)
///
/// Zero when the gas is not hotter than the wall.
pub fn wall_heat_flux(gas_temperature: f64, wall_temperature: f64, h_coeff: f64, wall_area: f64) -> f64 {
    if gas_temperature <= wall_temperature {
        return 0.0;
    }
    h_coeff * wall_area * (gas_temperature - wall_temperature)
}

/// Bore surface exposed to gas behind the bullet, `π·d·x` (m²)
pub fn exposed_wall_area(bore_diameter: f64, bullet_travel: f64) -> f64 {
    if bullet_travel <= 0.0 {
        return 0.0;
    }
    PI * bore_diameter * bullet_travel
}

/// Inputs needed to derive the gas temperature from the pressure state
#[derive(Debug, Clone, Copy)]
pub struct GasState {
    pub avg_pressure: f64, // Pa
    pub free_volume: f64,  // m³
    pub gas_mass: f64,     // kg (ω·ψ)
    pub covolume: f64,     // m³/kg
    pub psi: f64,
}

/// Gas temperature from the heat-loss-adjusted Noble-Abel state
///
/// # Formula
/// ```text
/// T = P·(V_free − m_gas·η)·M / (m_gas·R)
/// ```
///
/// Before any gas exists the temperature is approximated as `T_flame·ψ`; if
/// the covolume-corrected volume collapses the flame temperature is used.
pub fn gas_temperature(state: GasState, flame_temperature: f64, molar_mass: f64) -> f64 {
    if state.gas_mass > 0.0 && state.avg_pressure > 0.0 {
        let corrected = state.free_volume - state.gas_mass * state.covolume;
        if corrected > 0.0 {
            state.avg_pressure * corrected * molar_mass / (state.gas_mass * R_UNIVERSAL)
        } else {
            flame_temperature
        }
    } else {
        flame_temperature * state.psi
    }
}

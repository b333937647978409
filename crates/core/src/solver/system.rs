//! Interior-ballistics ODE system
//!
//! Four state variables advance together:
//!
//! ```text
//! y = [Z, x, v, Q]
//!
//! dZ/dt = a·P_avgⁿ / e₁                  while Z < 1
//! dx/dt = v
//! dv/dt = (P_s·A − F_fric) / m_eff       once P_s > P_engrave or v > 0
//! dQ/dt = h·π·d·x·(T_gas − T_wall)
//! ```
//!
//! The average pressure comes from the Noble-Abel equation with the
//! cumulative wall heat loss `Q` taken out of the combustion energy:
//!
//! ```text
//! P_avg = max(f·ω·ψ − Q, 0) / max(V_free − ω·ψ·η, floor)
//! ```
//!
//! Flooring the denominator keeps the solver finite for overcharged loads but
//! under-reports their pressure. The safety envelope flags that regime
//! independently of the computed peak.

use nalgebra::SVector;

use crate::core_types::components::LoadInputs;
use crate::core_types::propellant::BurnCurve;
use crate::physics::combustion::burn_rate_vieille;
use crate::physics::heat_loss::{exposed_wall_area, gas_temperature, wall_heat_flux, GasState};
use crate::physics::kinematics::{
    base_pressure, bore_area, breech_pressure, bullet_acceleration, effective_mass, free_volume,
};
use crate::simulation::config::SimulationConfig;
use crate::solver::ode::OdeSystem;

/// Burn depth, travel, velocity, cumulative heat loss
pub type BallisticState = SVector<f64, 4>;

pub const BURN_DEPTH: usize = 0;
pub const TRAVEL: usize = 1;
pub const VELOCITY: usize = 2;
pub const HEAT_LOST: usize = 3;

/// Quantities derived from a state vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasConditions {
    pub psi: f64,
    pub free_volume: f64,      // m³
    pub avg_pressure: f64,     // Pa
    pub base_pressure: f64,    // Pa
    pub breech_pressure: f64,  // Pa
    pub gas_temperature: f64,  // K
}

/// Right-hand side for one load, with every input reduced to SI scalars
#[derive(Debug, Clone)]
pub struct InteriorBallistics {
    curve: BurnCurve,
    force: f64,
    covolume: f64,
    solid_density: f64,
    burn_rate_coeff: f64,
    burn_rate_exp: f64,
    web: f64,
    flame_temperature: f64,

    charge_mass: f64,
    bullet_mass: f64,
    effective_mass: f64,
    chamber_volume: f64,
    bore_diameter: f64,
    bore_area: f64,
    bore_length: f64,

    engraving_pressure: f64,
    friction_coefficient: f64,
    volume_floor: f64,
    primer_seed: f64,

    h_coeff: f64,
    wall_temperature: f64,
    molar_mass: f64,
}

impl InteriorBallistics {
    pub fn new(inputs: &LoadInputs, config: &SimulationConfig) -> Self {
        let prop = &inputs.propellant;
        let charge_mass = *inputs.charge.mass;
        let bullet_mass = *inputs.bullet.mass;
        let bore_diameter = *inputs.chamber.bore_diameter;

        InteriorBallistics {
            curve: prop.curve,
            force: *prop.force,
            covolume: prop.covolume,
            solid_density: *prop.solid_density,
            burn_rate_coeff: prop.burn_rate_coeff,
            burn_rate_exp: prop.burn_rate_exp,
            web: *prop.web_half_thickness,
            flame_temperature: *prop.flame_temperature,
            charge_mass,
            bullet_mass,
            effective_mass: effective_mass(bullet_mass, charge_mass),
            chamber_volume: *inputs.chamber.chamber_volume,
            bore_diameter,
            bore_area: bore_area(bore_diameter),
            bore_length: bore_length(*inputs.barrel.barrel_length, config.solver.chamber_offset),
            engraving_pressure: config.solver.engraving_pressure,
            friction_coefficient: config.solver.friction_coefficient,
            volume_floor: config.solver.volume_floor,
            primer_seed: config.solver.primer_seed,
            h_coeff: config.heat_loss.h_coeff,
            wall_temperature: config.heat_loss.wall_temperature,
            molar_mass: config.heat_loss.molar_mass,
        }
    }

    /// Bullet travel at which it leaves the muzzle (m)
    pub fn bore_length(&self) -> f64 {
        self.bore_length
    }

    /// Bore cross-section (m²)
    pub fn bore_area(&self) -> f64 {
        self.bore_area
    }

    /// State at t = 0: primer-seeded burn depth, bullet at rest
    pub fn initial_state(&self) -> BallisticState {
        BallisticState::new(self.primer_seed, 0.0, 0.0, 0.0)
    }

    /// Terminal event, non-negative once the bullet reaches the muzzle
    pub fn muzzle_event(&self, y: &BallisticState) -> f64 {
        y[TRAVEL] - self.bore_length
    }

    /// Pressures and temperature implied by a state
    pub fn conditions(&self, y: &BallisticState) -> GasConditions {
        let z = y[BURN_DEPTH].clamp(0.0, 1.0);
        let psi = self.curve.burn_fraction(z);
        let v_free = free_volume(
            self.chamber_volume,
            self.bore_area,
            y[TRAVEL],
            self.charge_mass,
            self.solid_density,
            psi,
        );

        let gas_mass = self.charge_mass * psi;
        let energy = (self.force * gas_mass - y[HEAT_LOST]).max(0.0);
        let mut denominator = v_free - gas_mass * self.covolume;
        if denominator <= 0.0 {
            denominator = self.volume_floor;
        }
        let avg_pressure = energy / denominator;
        let p_base = base_pressure(avg_pressure, self.charge_mass, self.bullet_mass);

        let temperature = gas_temperature(
            GasState {
                avg_pressure,
                free_volume: v_free,
                gas_mass,
                covolume: self.covolume,
                psi,
            },
            self.flame_temperature,
            self.molar_mass,
        );

        GasConditions {
            psi,
            free_volume: v_free,
            avg_pressure,
            base_pressure: p_base,
            breech_pressure: breech_pressure(p_base, self.charge_mass, self.bullet_mass),
            gas_temperature: temperature,
        }
    }
}

impl OdeSystem<4> for InteriorBallistics {
    fn rhs(&self, _t: f64, y: &BallisticState) -> BallisticState {
        let gas = self.conditions(y);
        let velocity = y[VELOCITY];

        let dz = if y[BURN_DEPTH] < 1.0 {
            burn_rate_vieille(gas.avg_pressure, self.burn_rate_coeff, self.burn_rate_exp) / self.web
        } else {
            0.0
        };

        // Bullet stays seated until the base pressure overcomes engraving
        let dv = if gas.base_pressure > self.engraving_pressure || velocity > 0.0 {
            let friction = self.friction_coefficient * gas.base_pressure * self.bore_area;
            bullet_acceleration(gas.base_pressure, self.bore_area, friction, self.effective_mass)
        } else {
            0.0
        };

        let area = exposed_wall_area(self.bore_diameter, y[TRAVEL]);
        let dq = wall_heat_flux(gas.gas_temperature, self.wall_temperature, self.h_coeff, area);

        BallisticState::new(dz, velocity, dv, dq)
    }
}

/// Usable bullet travel: barrel length less the chamber and throat
///
/// Falls back to 90% of the barrel when the offset would consume all of it.
pub fn bore_length(barrel_length: f64, chamber_offset: f64) -> f64 {
    let travel = barrel_length - chamber_offset;
    if travel > 0.0 {
        travel
    } else {
        0.9 * barrel_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> InteriorBallistics {
        InteriorBallistics::new(&LoadInputs::reference_308(), &SimulationConfig::default())
    }

    #[test]
    fn test_bore_length_fallback() {
        assert_relative_eq!(bore_length(0.610, 0.051), 0.559, epsilon = 1e-12);
        assert_relative_eq!(bore_length(0.040, 0.051), 0.036, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_state_is_seeded() {
        let sys = reference();
        let y0 = sys.initial_state();
        assert_eq!(y0, BallisticState::new(0.01, 0.0, 0.0, 0.0));
        assert!(sys.muzzle_event(&y0) < 0.0);
    }

    #[test]
    fn test_seed_ignites_without_moving_bullet() {
        let sys = reference();
        let y0 = sys.initial_state();
        let gas = sys.conditions(&y0);
        assert!(gas.psi > 0.0);
        // A 1% seed is far below engraving pressure
        assert!(gas.base_pressure > 0.0 && gas.base_pressure < 25e6);

        let dy = sys.rhs(0.0, &y0);
        assert!(dy[BURN_DEPTH] > 0.0);
        assert_eq!(dy[TRAVEL], 0.0);
        assert_eq!(dy[VELOCITY], 0.0);
        assert_eq!(dy[HEAT_LOST], 0.0);
    }

    #[test]
    fn test_zero_burn_depth_is_a_fixed_point() {
        let sys = reference();
        let dy = sys.rhs(0.0, &BallisticState::zeros());
        assert_eq!(dy, BallisticState::zeros());
    }

    #[test]
    fn test_moving_bullet_keeps_accelerating_and_losing_heat() {
        let sys = reference();
        let y = BallisticState::new(0.3, 0.05, 300.0, 0.0);
        let gas = sys.conditions(&y);
        assert!(gas.breech_pressure > gas.base_pressure);
        assert!(gas.avg_pressure > gas.base_pressure);

        let dy = sys.rhs(0.0, &y);
        assert_eq!(dy[TRAVEL], 300.0);
        assert!(dy[VELOCITY] > 0.0);
        assert!(dy[HEAT_LOST] > 0.0);
    }

    #[test]
    fn test_burnout_stops_burn_rate() {
        let sys = reference();
        let dy = sys.rhs(0.0, &BallisticState::new(1.0, 0.2, 600.0, 10.0));
        assert_eq!(dy[BURN_DEPTH], 0.0);
        let gas = sys.conditions(&BallisticState::new(1.2, 0.2, 600.0, 10.0));
        assert_relative_eq!(gas.psi, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_heat_loss_lowers_pressure() {
        let sys = reference();
        let dry = sys.conditions(&BallisticState::new(0.5, 0.1, 500.0, 0.0));
        let lossy = sys.conditions(&BallisticState::new(0.5, 0.1, 500.0, 50.0));
        assert!(lossy.avg_pressure < dry.avg_pressure);
    }

    #[test]
    fn test_floored_denominator_stays_finite() {
        let mut load = LoadInputs::reference_308();
        // Enormous covolume: burned gas cannot fit
        load.propellant.covolume = 1.0;
        let sys = InteriorBallistics::new(&load, &SimulationConfig::default());
        let gas = sys.conditions(&BallisticState::new(0.5, 0.0, 0.0, 0.0));
        assert!(gas.avg_pressure.is_finite());
        assert!(gas.avg_pressure > 0.0);
    }
}

//! Closed-form model validation
//!
//! Each model is checked against hand-computed values or the limiting
//! behavior found in the literature.
//!
//! # References
//!
//! - Corner, J. (1950). Theory of the Interior Ballistics of Guns. Wiley.
//! - Timoshenko & Goodier (1951). Theory of Elasticity, thick-walled cylinders.
//! - Lawton, B. (2001). "Thermo-chemical erosion in gun barrels." Wear 251.
//! - Blevins, R. D. (1979). Formulas for Natural Frequency and Mode Shape.
//!
//! Run tests with: cargo test --test `physics_validation`

use std::f64::consts::PI;

use approx::assert_relative_eq;
use bore_sim_core::physics::{
    combustion_validation::{burn_rate_vieille, flame_temperature, pressure_noble_abel},
    harmonics_validation::{cantilever_frequency, matches_barrel_time, optimal_barrel_times},
    heat_loss_validation::{exposed_wall_area, wall_heat_flux},
    kinematics_validation::{base_pressure, bore_area, breech_pressure, free_volume},
    recoil_validation::{free_recoil, recoil_impulse},
    structural_validation::{case_expansion, lame_hoop_stress, lawton_erosion},
};

// ═══════════════════════════════════════════════════════════════════════════════
// Gas state
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_noble_abel_reduces_to_ideal_gas_without_covolume() {
    // p·V = ω·ψ·f when η = 0
    let p = pressure_noble_abel(0.00285, 3.0e-6, 0.0, 950e3, 0.5);
    assert_relative_eq!(p, 0.00285 * 0.5 * 950e3 / 3.0e-6, max_relative = 1e-12);
}

#[test]
fn test_covolume_raises_pressure() {
    let ideal = pressure_noble_abel(0.00285, 3.0e-6, 0.0, 950e3, 0.5);
    let real = pressure_noble_abel(0.00285, 3.0e-6, 0.001, 950e3, 0.5);
    assert!(real > ideal);
    assert_eq!(pressure_noble_abel(0.00285, 3.0e-6, 0.001, 950e3, 0.0), 0.0);
}

#[test]
fn test_vieille_law() {
    assert_eq!(burn_rate_vieille(0.0, 1.6e-8, 0.86), 0.0);
    assert_eq!(burn_rate_vieille(-5.0, 1.6e-8, 0.86), 0.0);
    // Doubling pressure multiplies the rate by 2ⁿ
    let r1 = burn_rate_vieille(100e6, 1.6e-8, 0.86);
    let r2 = burn_rate_vieille(200e6, 1.6e-8, 0.86);
    assert_relative_eq!(r2 / r1, 2f64.powf(0.86), max_relative = 1e-12);
}

#[test]
fn test_flame_temperature_from_force() {
    // 950 kJ/kg at 26 g/mol: T = f·M/R ≈ 2971 K
    assert_relative_eq!(flame_temperature(950e3, 0.026), 2970.8, max_relative = 1e-3);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Kinematics
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_lagrange_gradient_ordering() {
    let avg = 300e6;
    let base = base_pressure(avg, 0.00285, 0.01089);
    let breech = breech_pressure(base, 0.00285, 0.01089);
    assert!(base < avg);
    assert!(breech > avg);

    // Vanishing charge: no gradient
    assert_relative_eq!(base_pressure(avg, 0.0, 0.01089), avg);
    assert_relative_eq!(breech_pressure(avg, 0.0, 0.01089), avg);
}

#[test]
fn test_free_volume_grows_with_travel_and_burn() {
    let area = bore_area(0.00762);
    assert_relative_eq!(area, PI * 0.00381 * 0.00381, max_relative = 1e-12);

    let v0 = free_volume(3.63e-6, area, 0.0, 0.00285, 1600.0, 0.0);
    let burned = free_volume(3.63e-6, area, 0.0, 0.00285, 1600.0, 1.0);
    let traveled = free_volume(3.63e-6, area, 0.1, 0.00285, 1600.0, 0.0);

    assert_relative_eq!(v0, 3.63e-6 - 0.00285 / 1600.0, max_relative = 1e-12);
    assert_relative_eq!(burned, 3.63e-6, max_relative = 1e-12);
    assert_relative_eq!(traveled - v0, area * 0.1, max_relative = 1e-12);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Heat loss
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_wall_heat_flux_is_one_way() {
    let area = exposed_wall_area(0.00762, 0.3);
    assert_relative_eq!(area, PI * 0.00762 * 0.3, max_relative = 1e-12);
    assert_eq!(exposed_wall_area(0.00762, 0.0), 0.0);

    assert_eq!(wall_heat_flux(300.0, 300.0, 2000.0, area), 0.0);
    assert_eq!(wall_heat_flux(250.0, 300.0, 2000.0, area), 0.0);
    assert_relative_eq!(
        wall_heat_flux(2300.0, 300.0, 2000.0, area),
        2000.0 * area * 2000.0,
        max_relative = 1e-12
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Structural
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_lame_bore_surface_stress() {
    // At r = ri: σθ = p·(ro² + ri²)/(ro² − ri²)
    let (p, ri, ro) = (360e6, 0.004, 0.006);
    let expected = p * (ro * ro + ri * ri) / (ro * ro - ri * ri);
    assert_relative_eq!(lame_hoop_stress(p, ri, ro, ri), expected, max_relative = 1e-12);

    // Stress decays through the wall
    assert!(lame_hoop_stress(p, ri, ro, ro) < lame_hoop_stress(p, ri, ro, ri));
}

#[test]
fn test_case_expansion_scales_with_pressure() {
    let e1 = case_expansion(200e6, 0.004, 0.0055, 110e9, 0.31);
    let e2 = case_expansion(400e6, 0.004, 0.0055, 110e9, 0.31);
    assert!(e1 > 0.0);
    assert_relative_eq!(e2, 2.0 * e1, max_relative = 1e-12);

    // Stiffer material expands less
    assert!(case_expansion(200e6, 0.004, 0.0055, 200e9, 0.31) < e1);
}

#[test]
fn test_lawton_erosion_sensitivity() {
    let base = lawton_erosion(80.0, 1.4e-3, 500e3, 3000.0);
    assert!(base > 0.0);
    assert!(lawton_erosion(80.0, 1.4e-3, 500e3, 3200.0) > base);
    assert_relative_eq!(
        lawton_erosion(80.0, 4.0 * 1.4e-3, 500e3, 3000.0),
        2.0 * base,
        max_relative = 1e-12
    );
    assert_eq!(lawton_erosion(80.0, 1.4e-3, 500e3, 0.0), 0.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Barrel harmonics
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_cantilever_frequency_scales_with_length() {
    let (i, a) = (1.9e-8, 4.4e-4);
    let short = cantilever_frequency(1, 0.5, 200e9, i, 7850.0, a);
    let long = cantilever_frequency(1, 1.0, 200e9, i, 7850.0, a);
    assert_relative_eq!(short / long, 4.0, max_relative = 1e-12);

    // Mode 2 / mode 1 = (4.6941 / 1.8751)²
    let m2 = cantilever_frequency(2, 0.5, 200e9, i, 7850.0, a);
    assert_relative_eq!(m2 / short, (4.6941 / 1.8751_f64).powi(2), max_relative = 1e-3);
}

#[test]
fn test_optimal_barrel_time_nodes() {
    let nodes = optimal_barrel_times(500.0, 3);
    assert_eq!(nodes.len(), 3);
    assert_relative_eq!(nodes[0], 0.5e-3, max_relative = 1e-12);
    assert_relative_eq!(nodes[1], 1.5e-3, max_relative = 1e-12);
    assert_relative_eq!(nodes[2], 2.5e-3, max_relative = 1e-12);

    assert!(matches_barrel_time(1.52e-3, &nodes, 0.05e-3));
    assert!(!matches_barrel_time(1.0e-3, &nodes, 0.05e-3));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Recoil
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_free_recoil_conserves_momentum() {
    let impulse = recoil_impulse(0.01089, 0.00285, 900.0, 1.75);
    assert_relative_eq!(impulse, 0.01089 * 900.0 + 0.00285 * 1.75 * 900.0, max_relative = 1e-12);

    let recoil = free_recoil(impulse, 3.5);
    assert_relative_eq!(recoil.velocity * 3.5, impulse, max_relative = 1e-12);
    assert_relative_eq!(recoil.energy, impulse * impulse / 7.0, max_relative = 1e-12);

    let pinned = free_recoil(impulse, 0.0);
    assert_eq!(pinned.velocity, 0.0);
    assert_eq!(pinned.energy, 0.0);
}

//! Property checks for the form functions
//!
//! Randomized three-phase parameter sets drawn from the accepted ranges must
//! always give a continuous, non-decreasing curve pinned at both ends.
//!
//! Run tests with: cargo test --test `burn_curve_properties`

use approx::assert_relative_eq;
use bore_sim_core::physics::combustion_validation::{burn_fraction_piecewise, burn_fraction_quadratic};
use bore_sim_core::{BurnCurve, InputError, PiecewiseBurn, PropellantRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRID: usize = 2000;

fn random_curve(rng: &mut StdRng) -> PiecewiseBurn {
    let z1 = rng.random_range(0.05..0.7);
    let z2 = rng.random_range((z1 + 0.02)..0.98);
    PiecewiseBurn::new(
        rng.random_range(0.01..0.3),
        rng.random_range(-0.9..1.5),
        rng.random_range(0.0..=1.0),
        rng.random_range(-0.9..1.5),
        z1,
        z2,
    )
    .expect("parameters drawn from the accepted ranges")
}

#[test]
fn test_piecewise_endpoints_are_pinned() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let curve = random_curve(&mut rng);
        assert_eq!(curve.burn_fraction(0.0), 0.0);
        assert_relative_eq!(curve.burn_fraction(1.0), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_piecewise_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let curve = random_curve(&mut rng);
        let mut prev = 0.0;
        for i in 0..=GRID {
            let psi = curve.burn_fraction(i as f64 / GRID as f64);
            assert!(psi >= prev - 1e-14, "{curve:?} decreases at step {i}");
            prev = psi;
        }
    }
}

#[test]
fn test_piecewise_is_continuous_at_phase_boundaries() {
    let mut rng = StdRng::seed_from_u64(23);
    let eps = 1e-9;
    for _ in 0..200 {
        let curve = random_curve(&mut rng);
        let (z1, z2) = curve.boundaries();
        for z in [z1, z2] {
            let jump = curve.burn_fraction(z + eps) - curve.burn_fraction(z - eps);
            assert!(jump.abs() < 1e-6, "{curve:?} jumps by {jump} at {z}");
        }
    }
}

#[test]
fn test_piecewise_clamps_outside_unit_interval() {
    let mut rng = StdRng::seed_from_u64(31);
    let curve = random_curve(&mut rng);
    assert_eq!(curve.burn_fraction(-0.5), 0.0);
    assert_relative_eq!(curve.burn_fraction(1.7), 1.0, epsilon = 1e-12);
}

#[test]
fn test_cached_curve_matches_free_function() {
    let mut rng = StdRng::seed_from_u64(43);
    for _ in 0..50 {
        let curve = random_curve(&mut rng);
        let (z1, z2) = curve.boundaries();
        for _ in 0..20 {
            let z = rng.random_range(0.0..=1.0);
            let direct = burn_fraction_piecewise(z, z1, z2, curve.bp(), curve.br(), curve.brp());
            assert_relative_eq!(curve.burn_fraction(z), direct, epsilon = 1e-14);
        }
    }
}

#[test]
fn test_quadratic_endpoints_for_any_theta() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let theta = rng.random_range(-0.9..0.9);
        assert_eq!(burn_fraction_quadratic(0.0, theta), 0.0);
        assert_relative_eq!(burn_fraction_quadratic(1.0, theta), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_record_with_partial_curve_names_missing_fields() {
    let record = PropellantRecord {
        name: "Partial".to_string(),
        force_j_kg: 950e3,
        covolume_m3_kg: 0.001,
        burn_rate_coeff: 1.5e-8,
        burn_rate_exp: 0.86,
        gamma: 1.24,
        density_g_cm3: 1.6,
        flame_temp_k: 4050.0,
        bp: Some(0.2),
        br: Some(0.13),
        z1: Some(0.43),
        ..Default::default()
    };

    match bore_sim_core::PropellantParams::try_from(&record) {
        Err(InputError::PartialBurnCurve { missing }) => {
            assert_eq!(missing, vec!["ba", "brp", "z2"]);
        }
        other => panic!("expected PartialBurnCurve, got {other:?}"),
    }
}

#[test]
fn test_record_without_curve_selects_quadratic() {
    let record = PropellantRecord {
        name: "Plain".to_string(),
        force_j_kg: 950e3,
        covolume_m3_kg: 0.001,
        burn_rate_coeff: 1.6e-8,
        burn_rate_exp: 0.86,
        gamma: 1.24,
        density_g_cm3: 1.6,
        flame_temp_k: 4050.0,
        ..Default::default()
    };

    let params = bore_sim_core::PropellantParams::try_from(&record).unwrap();
    assert!(matches!(params.curve, BurnCurve::Quadratic { .. }));
    assert_eq!(params.curve.mode_name(), "quadratic");
}

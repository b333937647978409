//! Batch services: ladders, sensitivity checks and parametric search
//!
//! Every item in a batch is an independent run; a failing item must never
//! abort or poison the rest of the batch.
//!
//! Run tests with: cargo test --test `batch_services`

use approx::assert_relative_eq;
use bore_sim_core::core_types::units::{CubicMeters, Kilograms};
use bore_sim_core::{
    ladder, parametric_search, sensitivity, LoadInputs, PropellantCatalog, PropellantParams,
    SearchRequest, SimulationConfig,
};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_ladder_velocity_rises_with_charge() {
    let steps = ladder(
        &LoadInputs::reference_308(),
        &SimulationConfig::default(),
        Kilograms::from_grains(40.0),
        Kilograms::from_grains(44.0),
        Kilograms::from_grains(1.0),
    )
    .unwrap();

    assert_eq!(steps.len(), 5);
    assert_relative_eq!(steps[0].charge.to_grains(), 40.0, epsilon = 1e-9);
    assert_relative_eq!(steps[4].charge.to_grains(), 44.0, epsilon = 1e-9);

    let results: Vec<_> = steps.iter().map(|s| s.result.as_ref().unwrap()).collect();
    for pair in results.windows(2) {
        assert!(pair[1].muzzle_velocity > pair[0].muzzle_velocity);
        assert!(pair[1].peak_pressure > pair[0].peak_pressure);
    }
}

#[test]
fn test_ladder_items_fail_independently() {
    let mut inputs = LoadInputs::reference_308();
    inputs.bullet.mass = Kilograms::ZERO;

    let steps = ladder(
        &inputs,
        &SimulationConfig::default(),
        Kilograms::from_grains(40.0),
        Kilograms::from_grains(41.0),
        Kilograms::from_grains(0.5),
    )
    .unwrap();

    assert_eq!(steps.len(), 3);
    assert!(steps.iter().all(|s| s.result.is_err()));
}

#[test]
fn test_sensitivity_brackets_center() {
    let report = sensitivity(
        &LoadInputs::reference_308(),
        &SimulationConfig::default(),
        Kilograms::from_grains(1.0),
    );

    let center = report.center.result.unwrap();
    let upper = report.upper.result.unwrap();
    let lower = report.lower.result.unwrap();

    assert_relative_eq!(report.upper.charge.to_grains(), 45.0, epsilon = 1e-9);
    assert_relative_eq!(report.lower.charge.to_grains(), 43.0, epsilon = 1e-9);
    assert!(upper.peak_pressure > center.peak_pressure);
    assert!(center.peak_pressure > lower.peak_pressure);
    assert!(upper.muzzle_velocity > center.muzzle_velocity);
    assert!(center.muzzle_velocity > lower.muzzle_velocity);
}

#[test]
fn test_sensitivity_lower_charge_is_floored() {
    let inputs = LoadInputs::reference_308().with_charge(Kilograms::from_grains(0.5));
    let report = sensitivity(&inputs, &SimulationConfig::default(), Kilograms::from_grains(1.0));
    assert_relative_eq!(report.lower.charge.to_grains(), 0.1, epsilon = 1e-9);
}

#[test]
fn test_parametric_search_over_builtin_catalog() {
    let report = parametric_search(
        &PropellantCatalog::builtin(),
        &LoadInputs::reference_308(),
        CubicMeters::from_cm3(3.63),
        &SearchRequest::default(),
        &SimulationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.total_tested, 4);
    assert_eq!(report.results.len(), 4);
    assert!(report.viable >= 1);

    let (viable, rest) = report.results.split_at(report.viable);
    assert!(viable.iter().all(|r| r.is_viable && r.error.is_none()));
    assert!(rest.iter().all(|r| !r.is_viable));
    for pair in viable.windows(2) {
        assert!(pair[0].muzzle_velocity >= pair[1].muzzle_velocity);
    }

    for r in viable {
        assert_eq!(r.all_results.len(), 5);
        assert!(r.pressure_percent > 0.0 && r.pressure_percent <= 100.0);
        assert!(r.efficiency > 0.0);
        let best = r.optimal_charge.unwrap();
        let chosen = r.all_results.iter().find(|s| s.charge == best).unwrap();
        assert!(chosen.is_safe);
        assert!(r
            .all_results
            .iter()
            .filter(|s| s.is_safe)
            .all(|s| s.muzzle_velocity <= chosen.muzzle_velocity));
    }
}

#[test]
fn test_parametric_search_isolates_broken_propellant() {
    let mut catalog = PropellantCatalog::builtin();
    catalog.insert(PropellantParams {
        name: "Broken".to_string(),
        burn_rate_coeff: 0.0,
        ..PropellantParams::varget_like()
    });

    let report = parametric_search(
        &catalog,
        &LoadInputs::reference_308(),
        CubicMeters::from_cm3(3.63),
        &SearchRequest::default(),
        &SimulationConfig::default(),
    )
    .unwrap();

    assert_eq!(report.total_tested, 5);
    let broken = report
        .results
        .iter()
        .find(|r| r.propellant == "Broken")
        .unwrap();
    assert!(!broken.is_viable);
    assert!(broken.error.as_deref().unwrap().contains("burn_rate_coeff"));

    // The rest of the sweep still ran
    let varget = report
        .results
        .iter()
        .find(|r| r.propellant == "Varget-like")
        .unwrap();
    assert!(varget.is_viable);
    assert!(varget.error.is_none());
}

#[test]
fn test_parametric_search_rejects_bad_request() {
    let request = SearchRequest {
        steps: 0,
        ..SearchRequest::default()
    };
    let result = parametric_search(
        &PropellantCatalog::builtin(),
        &LoadInputs::reference_308(),
        CubicMeters::from_cm3(3.63),
        &request,
        &SimulationConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_catalog_aliases_feed_simulation() {
    let catalog = PropellantCatalog::builtin();
    let inputs = LoadInputs {
        propellant: catalog.get("AR2208").unwrap().clone(),
        ..LoadInputs::reference_308()
    };
    let via_alias = bore_sim_core::simulate(&inputs, &SimulationConfig::default()).unwrap();
    let direct =
        bore_sim_core::simulate(&LoadInputs::reference_308(), &SimulationConfig::default()).unwrap();
    assert_eq!(via_alias.muzzle_velocity, direct.muzzle_velocity);
}

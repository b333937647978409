//! Interior Ballistics Simulation Core Library
//!
//! A lumped-parameter interior-ballistics engine for handloading. Given a
//! propellant, bullet, chamber, barrel and charge weight it integrates the
//! coupled burn/gas/projectile equations from primer ignition to muzzle exit
//! and reports pressure and velocity histories, muzzle velocity, peak
//! pressure and a safety verdict.
//!
//! ## Models
//!
//! - Noble-Abel equation of state with Vieille's burn-rate law
//! - Quadratic or three-phase (GRT-style) form functions
//! - Lagrange pressure gradient between breech and bullet base
//! - Convective wall heat loss (Thornhill-type correction)
//! - Dormand-Prince 5(4) integration with dense output and muzzle-exit event
//! - Post-processing: Lamé case stress, Lawton throat erosion, cantilever
//!   barrel harmonics with optimal barrel times, free recoil

// Core types and utilities
pub mod core_types;
pub mod error;

// Closed-form models, integrator, and the run pipeline
pub mod physics;
pub mod simulation;
pub mod solver;

// Re-export core types
pub use core_types::{
    BarrelParams, BulletParams, BurnCurve, ChamberParams, ChargeParams, GrtPropellant,
    LoadInputs, PiecewiseBurn, PropellantParams, PropellantRecord,
};
pub use error::InputError;

// Re-export the run pipeline
pub use simulation::{
    ladder, parametric_search, sensitivity, simulate, PropellantCatalog, SearchRequest,
    SimulationConfig, SimulationResult,
};
pub use solver::IntegrationError;

//! Core types and utilities

pub mod components;
pub mod grt;
pub mod propellant;
pub mod units;

pub use components::*;
pub use grt::GrtPropellant;
pub use propellant::*;
pub use units::*;

//! Boundary errors raised before a simulation is attempted
//!
//! Physics outcomes (overpressure, impossible loads, timeouts, integrator
//! failure) are never errors: they come back as a `SimulationResult` with
//! warnings and an unsafe verdict. Only inputs that leave the model undefined
//! are rejected here.

use std::fmt;

/// Errors detected while turning caller data into model parameters
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Some, but not all, of the six piecewise burn-curve fields were supplied
    PartialBurnCurve {
        /// Names of the fields that were missing
        missing: Vec<&'static str>,
    },
    /// All piecewise fields were supplied but they do not describe a usable curve
    InvalidBurnCurve(String),
    /// A parameter the model divides by (or takes a power of) is unusable
    InvalidParameter {
        /// Parameter name as it appears on the parameter struct
        name: &'static str,
        /// Offending value
        value: f64,
    },
}

impl InputError {
    /// Shorthand for a non-finite or non-positive parameter
    pub(crate) fn invalid(name: &'static str, value: f64) -> Self {
        InputError::InvalidParameter { name, value }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::PartialBurnCurve { missing } => write!(
                f,
                "Piecewise burn curve is incomplete, missing: {}",
                missing.join(", ")
            ),
            InputError::InvalidBurnCurve(msg) => write!(f, "Invalid piecewise burn curve: {msg}"),
            InputError::InvalidParameter { name, value } => {
                write!(f, "Parameter '{name}' must be finite and positive, got {value}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Check that a value is finite and strictly positive
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InputError::invalid(name, value))
    }
}

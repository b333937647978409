//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers keep SI quantities from being mixed up at the API boundary
//! (a charge mass is not a bullet mass in grains, a chamber pressure is not a
//! rated maximum in psi). Handloading data arrives in grains, psi, feet per
//! second and grains of water capacity, so every type carries explicit
//! conversions for the customary units it is published in.
//!
//! # Design Philosophy
//! - All quantities are `f64`: the integrator runs at 1e-8 relative tolerance
//! - Inner value is reachable through `Deref` for use inside formulas
//! - Total ordering via `Ord` (NaN sorts greater than all values)
//! - Serde support for serialization
//!
//! # Usage
//! ```
//! use bore_sim_core::core_types::units::{Kilograms, Pascals};
//!
//! let charge = Kilograms::from_grains(44.0);
//! assert!((charge.to_grains() - 44.0).abs() < 1e-9);
//!
//! let saami = Pascals::from_psi(62_000.0);
//! assert!((*saami / 1e6 - 427.47).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Deref, Div, Mul, Sub};

/// Kilograms per grain (avoirdupois)
pub const KG_PER_GRAIN: f64 = 0.00006479891;

/// Pascals per pound-force per square inch
pub const PA_PER_PSI: f64 = 6894.757;

/// Feet per meter
pub const FEET_PER_METER: f64 = 3.28084;

/// Foot-pounds per joule
pub const FT_LBS_PER_JOULE: f64 = 0.737562;

/// Density of water used for grains-of-water case capacity (kg/m³)
const WATER_DENSITY: f64 = 1000.0;

/// Generates a transparent `f64` quantity newtype with the shared trait set.
macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Zero value
            pub const ZERO: $name = $name(0.0);

            /// Create from a raw SI value
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Raw SI value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// True when the value is finite and strictly positive
            #[inline]
            #[must_use]
            pub fn is_positive(self) -> bool {
                self.0.is_finite() && self.0 > 0.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(q: $name) -> f64 {
                q.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        /// Ratio of two quantities of the same kind
        impl Div for $name {
            type Output = f64;
            fn div(self, rhs: $name) -> f64 {
                self.0 / rhs.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.4} {}", self.0, $suffix)
            }
        }
    };
}

quantity!(
    /// Mass in kilograms
    Kilograms,
    "kg"
);
quantity!(
    /// Length in meters
    Meters,
    "m"
);
quantity!(
    /// Volume in cubic meters
    CubicMeters,
    "m³"
);
quantity!(
    /// Pressure in pascals
    Pascals,
    "Pa"
);
quantity!(
    /// Speed in meters per second
    MetersPerSecond,
    "m/s"
);
quantity!(
    /// Duration in seconds
    Seconds,
    "s"
);
quantity!(
    /// Absolute temperature in kelvin
    Kelvin,
    "K"
);
quantity!(
    /// Density in kilograms per cubic meter
    KgPerCubicMeter,
    "kg/m³"
);
quantity!(
    /// Specific energy in joules per kilogram (propellant force / impetus)
    JoulesPerKg,
    "J/kg"
);
quantity!(
    /// Energy in joules
    Joules,
    "J"
);
quantity!(
    /// Frequency in hertz
    Hertz,
    "Hz"
);
quantity!(
    /// Impulse in newton-seconds
    NewtonSeconds,
    "N·s"
);

impl Kilograms {
    /// Create from grains (7000 gr = 1 lb)
    #[inline]
    #[must_use]
    pub fn from_grains(grains: f64) -> Self {
        Kilograms(grains * KG_PER_GRAIN)
    }

    /// Create from grams
    #[inline]
    #[must_use]
    pub fn from_grams(grams: f64) -> Self {
        Kilograms(grams * 1e-3)
    }

    /// Convert to grains
    #[inline]
    #[must_use]
    pub fn to_grains(self) -> f64 {
        self.0 / KG_PER_GRAIN
    }

    /// Convert to grams
    #[inline]
    #[must_use]
    pub fn to_grams(self) -> f64 {
        self.0 * 1e3
    }
}

impl Meters {
    /// Create from millimeters
    #[inline]
    #[must_use]
    pub fn from_mm(mm: f64) -> Self {
        Meters(mm * 1e-3)
    }

    /// Create from inches
    #[inline]
    #[must_use]
    pub fn from_inches(inches: f64) -> Self {
        Meters(inches * 0.0254)
    }

    /// Convert to millimeters
    #[inline]
    #[must_use]
    pub fn to_mm(self) -> f64 {
        self.0 * 1e3
    }

    /// Convert to inches
    #[inline]
    #[must_use]
    pub fn to_inches(self) -> f64 {
        self.0 / 0.0254
    }
}

impl CubicMeters {
    /// Create from cubic centimeters
    #[inline]
    #[must_use]
    pub fn from_cm3(cm3: f64) -> Self {
        CubicMeters(cm3 * 1e-6)
    }

    /// Create from cubic millimeters
    #[inline]
    #[must_use]
    pub fn from_mm3(mm3: f64) -> Self {
        CubicMeters(mm3 * 1e-9)
    }

    /// Create from a case capacity quoted in grains of water
    #[inline]
    #[must_use]
    pub fn from_grains_h2o(grains: f64) -> Self {
        CubicMeters(grains * KG_PER_GRAIN / WATER_DENSITY)
    }

    /// Convert to cubic centimeters
    #[inline]
    #[must_use]
    pub fn to_cm3(self) -> f64 {
        self.0 * 1e6
    }
}

impl Pascals {
    /// Create from psi
    #[inline]
    #[must_use]
    pub fn from_psi(psi: f64) -> Self {
        Pascals(psi * PA_PER_PSI)
    }

    /// Create from megapascals
    #[inline]
    #[must_use]
    pub fn from_mpa(mpa: f64) -> Self {
        Pascals(mpa * 1e6)
    }

    /// Convert to psi
    #[inline]
    #[must_use]
    pub fn to_psi(self) -> f64 {
        self.0 / PA_PER_PSI
    }

    /// Convert to megapascals
    #[inline]
    #[must_use]
    pub fn to_mpa(self) -> f64 {
        self.0 * 1e-6
    }
}

impl MetersPerSecond {
    /// Create from feet per second
    #[inline]
    #[must_use]
    pub fn from_fps(fps: f64) -> Self {
        MetersPerSecond(fps / FEET_PER_METER)
    }

    /// Convert to feet per second
    #[inline]
    #[must_use]
    pub fn to_fps(self) -> f64 {
        self.0 * FEET_PER_METER
    }
}

impl Seconds {
    /// Create from milliseconds
    #[inline]
    #[must_use]
    pub fn from_ms(ms: f64) -> Self {
        Seconds(ms * 1e-3)
    }

    /// Convert to milliseconds
    #[inline]
    #[must_use]
    pub fn to_ms(self) -> f64 {
        self.0 * 1e3
    }
}

impl KgPerCubicMeter {
    /// Create from grams per cubic centimeter
    #[inline]
    #[must_use]
    pub fn from_g_per_cm3(g_cm3: f64) -> Self {
        KgPerCubicMeter(g_cm3 * 1e3)
    }

    /// Convert to grams per cubic centimeter
    #[inline]
    #[must_use]
    pub fn to_g_per_cm3(self) -> f64 {
        self.0 * 1e-3
    }
}

impl Joules {
    /// Convert to foot-pounds
    #[inline]
    #[must_use]
    pub fn to_ft_lbs(self) -> f64 {
        self.0 * FT_LBS_PER_JOULE
    }
}

/// Mass divided by volume gives density
impl Div<CubicMeters> for Kilograms {
    type Output = KgPerCubicMeter;
    fn div(self, rhs: CubicMeters) -> KgPerCubicMeter {
        KgPerCubicMeter(self.0 / rhs.0)
    }
}

/// Mass divided by density gives volume
impl Div<KgPerCubicMeter> for Kilograms {
    type Output = CubicMeters;
    fn div(self, rhs: KgPerCubicMeter) -> CubicMeters {
        CubicMeters(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grain_round_trip_is_exact_enough() {
        let m = Kilograms::from_grains(168.0);
        assert!((*m - 0.0108862169).abs() < 1e-9);
        assert!((m.to_grains() - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_capacity_in_grains_of_water() {
        // .308 Winchester holds about 56 gr of water
        let v = CubicMeters::from_grains_h2o(56.0);
        assert!((v.to_cm3() - 3.6287).abs() < 1e-3);
    }

    #[test]
    fn test_pressure_conversions() {
        let p = Pascals::from_psi(62_000.0);
        assert!((p.to_psi() - 62_000.0).abs() < 1e-6);
        assert!((p.to_mpa() - 427.4749).abs() < 1e-3);
        assert_eq!(Pascals::from_mpa(25.0), Pascals::new(25e6));
    }

    #[test]
    fn test_velocity_and_time_conversions() {
        let v = MetersPerSecond::new(800.0);
        assert!((v.to_fps() - 2624.672).abs() < 1e-3);
        assert!((MetersPerSecond::from_fps(v.to_fps()).value() - 800.0).abs() < 1e-9);
        assert_eq!(Seconds::from_ms(1.5).to_ms(), 1.5);
    }

    #[test]
    fn test_density_and_volume_division() {
        let charge = Kilograms::new(0.0029);
        let volume = CubicMeters::new(3.63e-6);
        let loading = charge / volume;
        assert!((*loading - 798.898).abs() < 1e-2);

        let solid = charge / KgPerCubicMeter::new(1600.0);
        assert!((*solid - 1.8125e-6).abs() < 1e-12);
    }

    #[test]
    fn test_total_ordering_handles_nan() {
        let a = Pascals::new(1.0);
        let nan = Pascals::new(f64::NAN);
        assert!(a.max(nan).value().is_nan());
        assert_eq!(Pascals::new(2.0).min(a), a);
    }

    #[test]
    fn test_same_kind_ratio() {
        let r = Pascals::from_psi(55_800.0) / Pascals::from_psi(62_000.0);
        assert!((r - 0.9).abs() < 1e-12);
    }
}

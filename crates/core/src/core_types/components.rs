//! Bullet, chamber, barrel and charge parameter groups
//!
//! Values are plain SI quantities. Range validation (plausible masses,
//! densities, pressures) belongs to the caller; [`LoadInputs::validate`] only
//! rejects values that leave the model undefined.

use serde::{Deserialize, Serialize};

use crate::core_types::propellant::PropellantParams;
use crate::core_types::units::{CubicMeters, Kilograms, Meters, Pascals};
use crate::error::{require_positive, InputError};

/// Rifle mass assumed when none is supplied (~7.7 lb bolt action)
pub const DEFAULT_RIFLE_MASS: f64 = 3.5;

/// Projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletParams {
    pub mass: Kilograms,
    pub diameter: Meters, // bore-engaging
}

impl BulletParams {
    /// Build from handloading units
    pub fn from_grains(grains: f64, diameter_mm: f64) -> Self {
        BulletParams {
            mass: Kilograms::from_grains(grains),
            diameter: Meters::from_mm(diameter_mm),
        }
    }
}

/// Cartridge chamber
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamberParams {
    pub max_pressure: Pascals,       // rated maximum average pressure (SAAMI/CIP)
    pub chamber_volume: CubicMeters, // usable free volume behind the seated bullet
    pub bore_diameter: Meters,
}

impl ChamberParams {
    /// .308 Winchester: 62,000 psi, 3.63 cm³ usable volume, 7.62 mm bore
    pub fn winchester_308() -> Self {
        ChamberParams {
            max_pressure: Pascals::from_psi(62_000.0),
            chamber_volume: CubicMeters::new(3.63e-6),
            bore_diameter: Meters::from_mm(7.62),
        }
    }
}

/// Barrel and the rifle it is fitted to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrelParams {
    pub barrel_length: Meters, // breech face to muzzle
    pub twist: Meters,         // length per rifling turn
    pub rifle_mass: Kilograms, // recoiling assembly, recoil stage only
}

impl BarrelParams {
    /// Barrel of the given length (mm) with a 1:10" twist on a default-weight rifle
    pub fn from_mm(barrel_length_mm: f64) -> Self {
        BarrelParams {
            barrel_length: Meters::from_mm(barrel_length_mm),
            twist: Meters::from_inches(10.0),
            rifle_mass: Kilograms::new(DEFAULT_RIFLE_MASS),
        }
    }
}

/// Propellant charge for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeParams {
    pub mass: Kilograms,
}

impl ChargeParams {
    /// Charge weight in grains
    pub fn from_grains(grains: f64) -> Self {
        ChargeParams {
            mass: Kilograms::from_grains(grains),
        }
    }
}

/// The five parameter groups of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadInputs {
    pub propellant: PropellantParams,
    pub bullet: BulletParams,
    pub chamber: ChamberParams,
    pub barrel: BarrelParams,
    pub charge: ChargeParams,
}

impl LoadInputs {
    /// .308 Winchester reference load
    ///
    /// 168 gr bullet over 44 gr of a Varget-class powder in a 610 mm barrel.
    pub fn reference_308() -> Self {
        LoadInputs {
            propellant: PropellantParams::varget_like(),
            bullet: BulletParams::from_grains(168.0, 7.82),
            chamber: ChamberParams::winchester_308(),
            barrel: BarrelParams::from_mm(610.0),
            charge: ChargeParams::from_grains(44.0),
        }
    }

    /// Same load with a different charge mass
    pub fn with_charge(&self, charge: Kilograms) -> Self {
        LoadInputs {
            charge: ChargeParams { mass: charge },
            ..self.clone()
        }
    }

    /// Reject values that would make the model undefined
    ///
    /// Rifle mass is not checked: a zero rifle mass yields zero recoil.
    ///
    /// # Errors
    /// `InputError::InvalidParameter` naming the first unusable field.
    pub fn validate(&self) -> Result<(), InputError> {
        self.propellant.validate()?;
        require_positive("bullet.mass", *self.bullet.mass)?;
        require_positive("chamber.max_pressure", *self.chamber.max_pressure)?;
        require_positive("chamber.chamber_volume", *self.chamber.chamber_volume)?;
        require_positive("chamber.bore_diameter", *self.chamber.bore_diameter)?;
        require_positive("barrel.barrel_length", *self.barrel.barrel_length)?;
        require_positive("barrel.twist", *self.barrel.twist)?;
        require_positive("charge.mass", *self.charge.mass)?;
        Ok(())
    }
}

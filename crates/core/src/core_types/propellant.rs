use serde::{Deserialize, Serialize};

use crate::core_types::units::{JoulesPerKg, KgPerCubicMeter, Kelvin, Meters};
use crate::error::{require_positive, InputError};
use crate::physics::combustion::{burn_fraction_quadratic, piecewise_raw};

/// Grain form factor used when a record carries none (slightly progressive)
pub const DEFAULT_THETA: f64 = -0.2;

/// Full web thickness used when a record carries none (m)
pub const DEFAULT_WEB_THICKNESS: f64 = 0.0004;

/// Six-parameter three-phase burn curve
///
/// Constructed only through [`PiecewiseBurn::new`], which rejects parameter
/// sets that would make `ψ(Z)` non-monotonic or leave a phase empty. The
/// accumulation at `Z = 1` is computed once and reused for every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PiecewiseFields", into = "PiecewiseFields")]
pub struct PiecewiseBurn {
    ba: f64,
    bp: f64,
    br: f64,
    brp: f64,
    z1: f64,
    z2: f64,
    total: f64,
}

/// Plain field set used for (de)serializing [`PiecewiseBurn`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PiecewiseFields {
    ba: f64,
    bp: f64,
    br: f64,
    brp: f64,
    z1: f64,
    z2: f64,
}

impl PiecewiseBurn {
    /// Validate and build a piecewise curve
    ///
    /// # Arguments
    /// * `ba` - Vivacity (1/(MPa·s)), kept for reference and GRT round-trips
    /// * `bp` - Surface growth over phase 1, must exceed −1
    /// * `br` - Surface loss over the tail-off phase, in [0, 1]
    /// * `brp` - Surface growth over the blend phase, must exceed −1
    /// * `z1`, `z2` - Phase boundaries, `0 < z1 < z2 < 1`
    ///
    /// # Errors
    /// `InputError::InvalidBurnCurve` when any value is non-finite or outside
    /// the ranges above.
    pub fn new(ba: f64, bp: f64, br: f64, brp: f64, z1: f64, z2: f64) -> Result<Self, InputError> {
        if ![ba, bp, br, brp, z1, z2].iter().all(|v| v.is_finite()) {
            return Err(InputError::InvalidBurnCurve(
                "all parameters must be finite".to_string(),
            ));
        }
        if !(0.0 < z1 && z1 < z2 && z2 < 1.0) {
            return Err(InputError::InvalidBurnCurve(format!(
                "phase boundaries must satisfy 0 < z1 < z2 < 1, got z1={z1}, z2={z2}"
            )));
        }
        if bp <= -1.0 || brp <= -1.0 {
            return Err(InputError::InvalidBurnCurve(format!(
                "bp and brp must exceed -1, got bp={bp}, brp={brp}"
            )));
        }
        if !(0.0..=1.0).contains(&br) {
            return Err(InputError::InvalidBurnCurve(format!(
                "br must lie in [0, 1], got {br}"
            )));
        }

        let total = piecewise_raw(1.0, z1, z2, bp, br, brp);
        Ok(PiecewiseBurn {
            ba,
            bp,
            br,
            brp,
            z1,
            z2,
            total,
        })
    }

    /// Burned fraction at normalized burn depth `z`
    pub fn burn_fraction(&self, z: f64) -> f64 {
        piecewise_raw(z, self.z1, self.z2, self.bp, self.br, self.brp) / self.total
    }

    /// Vivacity
    pub fn ba(&self) -> f64 {
        self.ba
    }

    /// Phase 1 surface growth
    pub fn bp(&self) -> f64 {
        self.bp
    }

    /// Tail-off surface loss
    pub fn br(&self) -> f64 {
        self.br
    }

    /// Blend-phase surface growth
    pub fn brp(&self) -> f64 {
        self.brp
    }

    /// Phase boundaries `(z1, z2)`
    pub fn boundaries(&self) -> (f64, f64) {
        (self.z1, self.z2)
    }
}

impl TryFrom<PiecewiseFields> for PiecewiseBurn {
    type Error = InputError;

    fn try_from(f: PiecewiseFields) -> Result<Self, Self::Error> {
        PiecewiseBurn::new(f.ba, f.bp, f.br, f.brp, f.z1, f.z2)
    }
}

impl From<PiecewiseBurn> for PiecewiseFields {
    fn from(p: PiecewiseBurn) -> Self {
        PiecewiseFields {
            ba: p.ba,
            bp: p.bp,
            br: p.br,
            brp: p.brp,
            z1: p.z1,
            z2: p.z2,
        }
    }
}

/// Form function selected once per propellant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BurnCurve {
    /// `ψ = (θ+1)·Z − θ·Z²`
    Quadratic { theta: f64 },
    /// Three-phase curve from GRT-style data
    Piecewise(PiecewiseBurn),
}

impl BurnCurve {
    /// Burned fraction `ψ` at normalized burn depth `z` (clamped to [0, 1])
    #[inline]
    pub fn burn_fraction(&self, z: f64) -> f64 {
        match self {
            BurnCurve::Quadratic { theta } => burn_fraction_quadratic(z, *theta),
            BurnCurve::Piecewise(curve) => curve.burn_fraction(z),
        }
    }

    /// Mode name as reported in summaries
    pub fn mode_name(&self) -> &'static str {
        match self {
            BurnCurve::Quadratic { .. } => "quadratic",
            BurnCurve::Piecewise(_) => "piecewise",
        }
    }
}

/// Propellant model parameters consumed by the solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropellantParams {
    pub name: String,

    // Thermochemistry
    pub force: JoulesPerKg,           // impetus f
    pub covolume: f64,                // m³/kg (η)
    pub gamma: f64,                   // ratio of specific heats
    pub flame_temperature: Kelvin,    // adiabatic
    pub solid_density: KgPerCubicMeter, // grain material, not bulk

    // Burn law r = a·Pⁿ
    pub burn_rate_coeff: f64, // m/(s·Paⁿ)
    pub burn_rate_exp: f64,

    // Grain geometry
    pub web_half_thickness: Meters, // e1
    pub curve: BurnCurve,
}

impl PropellantParams {
    /// Medium-rate extruded rifle powder (Varget class)
    ///
    /// Calibrated against published .308 Winchester data: 44 gr under a
    /// 168 gr bullet in a 24" barrel gives roughly 2900-3000 fps at about
    /// 53,000 psi.
    pub fn varget_like() -> Self {
        PropellantParams {
            name: "Varget-like".to_string(),
            force: JoulesPerKg::new(950e3),
            covolume: 0.001,
            gamma: 1.24,
            flame_temperature: Kelvin::new(4050.0),
            solid_density: KgPerCubicMeter::new(1600.0),
            burn_rate_coeff: 1.6e-8,
            burn_rate_exp: 0.86,
            web_half_thickness: Meters::new(DEFAULT_WEB_THICKNESS / 2.0),
            curve: BurnCurve::Quadratic { theta: DEFAULT_THETA },
        }
    }

    /// Slower extruded powder for magnum and heavy-bullet loads (H4350 class)
    pub fn h4350_like() -> Self {
        PropellantParams {
            name: "H4350-like".to_string(),
            burn_rate_coeff: 1.4e-8,
            force: JoulesPerKg::new(960e3),
            flame_temperature: Kelvin::new(4000.0),
            ..Self::varget_like()
        }
    }

    /// Faster extruded powder for medium cartridges (IMR 4064 class)
    pub fn imr4064_like() -> Self {
        PropellantParams {
            name: "IMR4064-like".to_string(),
            burn_rate_coeff: 1.75e-8,
            force: JoulesPerKg::new(940e3),
            flame_temperature: Kelvin::new(3950.0),
            curve: BurnCurve::Quadratic { theta: -0.1 },
            ..Self::varget_like()
        }
    }

    /// Burned fraction at normalized burn depth `z`
    #[inline]
    pub fn burn_fraction(&self, z: f64) -> f64 {
        self.curve.burn_fraction(z)
    }

    /// Check the values the model divides by or raises to a power
    ///
    /// # Errors
    /// `InputError::InvalidParameter` naming the first unusable field.
    pub fn validate(&self) -> Result<(), InputError> {
        require_positive("force", *self.force)?;
        require_positive("solid_density", *self.solid_density)?;
        require_positive("burn_rate_coeff", self.burn_rate_coeff)?;
        require_positive("burn_rate_exp", self.burn_rate_exp)?;
        require_positive("web_half_thickness", *self.web_half_thickness)?;
        require_positive("flame_temperature", *self.flame_temperature)?;
        require_positive("gamma", self.gamma)?;
        if !(self.covolume.is_finite() && self.covolume >= 0.0) {
            return Err(InputError::invalid("covolume", self.covolume));
        }
        if let BurnCurve::Quadratic { theta } = self.curve {
            if !theta.is_finite() {
                return Err(InputError::invalid("theta", theta));
            }
        }
        Ok(())
    }
}

/// Propellant as it arrives from a data store or import pipeline
///
/// The piecewise fields are optional individually, but the model accepts
/// them only all together. Conversion into [`PropellantParams`] enforces this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropellantRecord {
    pub name: String,
    pub force_j_kg: f64,
    pub covolume_m3_kg: f64,
    pub burn_rate_coeff: f64,
    pub burn_rate_exp: f64,
    pub gamma: f64,
    pub density_g_cm3: f64, // solid
    pub flame_temp_k: f64,
    pub web_thickness_m: Option<f64>, // full web
    pub theta: Option<f64>,

    // Three-phase curve (all or none)
    pub ba: Option<f64>,
    pub bp: Option<f64>,
    pub br: Option<f64>,
    pub brp: Option<f64>,
    pub z1: Option<f64>,
    pub z2: Option<f64>,
}

impl PropellantRecord {
    fn resolve_curve(&self) -> Result<BurnCurve, InputError> {
        let fields = [
            ("ba", self.ba),
            ("bp", self.bp),
            ("br", self.br),
            ("brp", self.brp),
            ("z1", self.z1),
            ("z2", self.z2),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();

        match (self.ba, self.bp, self.br, self.brp, self.z1, self.z2) {
            (Some(ba), Some(bp), Some(br), Some(brp), Some(z1), Some(z2)) => {
                Ok(BurnCurve::Piecewise(PiecewiseBurn::new(ba, bp, br, brp, z1, z2)?))
            }
            _ if missing.len() == fields.len() => Ok(BurnCurve::Quadratic {
                theta: self.theta.unwrap_or(DEFAULT_THETA),
            }),
            _ => Err(InputError::PartialBurnCurve { missing }),
        }
    }
}

impl TryFrom<&PropellantRecord> for PropellantParams {
    type Error = InputError;

    fn try_from(record: &PropellantRecord) -> Result<Self, Self::Error> {
        let curve = record.resolve_curve()?;
        let web = record.web_thickness_m.unwrap_or(DEFAULT_WEB_THICKNESS);
        let params = PropellantParams {
            name: record.name.clone(),
            force: JoulesPerKg::new(record.force_j_kg),
            covolume: record.covolume_m3_kg,
            gamma: record.gamma,
            flame_temperature: Kelvin::new(record.flame_temp_k),
            solid_density: KgPerCubicMeter::from_g_per_cm3(record.density_g_cm3),
            burn_rate_coeff: record.burn_rate_coeff,
            burn_rate_exp: record.burn_rate_exp,
            web_half_thickness: Meters::new(web / 2.0),
            curve,
        };
        params.validate()?;
        Ok(params)
    }
}

impl TryFrom<PropellantRecord> for PropellantParams {
    type Error = InputError;

    fn try_from(record: PropellantRecord) -> Result<Self, Self::Error> {
        PropellantParams::try_from(&record)
    }
}

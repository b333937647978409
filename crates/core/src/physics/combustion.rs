//! Propellant combustion: form functions, Noble-Abel equation of state and
//! Vieille's burn-rate law
//!
//! The form function maps the normalized burn depth `Z` (fraction of the
//! grain web that has regressed) to the burned mass fraction `ψ`. Two shapes
//! are supported: the classical single-parameter quadratic and a three-phase
//! piecewise curve of the kind published for GRT-style propellant data.
//!
//! # References
//! - Corner, J. (1950). "Theory of the Interior Ballistics of Guns." Wiley.
//! - Carlucci, D.E., Jacobson, S.S. (2018). "Ballistics: Theory and Design of
//!   Guns and Ammunition", 3rd ed. CRC Press. Chapters 2-4.

/// Universal gas constant (J/(mol·K))
pub const R_UNIVERSAL: f64 = 8.314;

/// Burned fraction from the quadratic form function
///
/// # Formula
/// ```text
/// ψ(Z) = (θ + 1)·Z − θ·Z²
/// ```
///
/// `Z` is clamped to [0, 1] and the result to [0, 1]. `θ < 0` is a
/// progressive grain, `θ > 0` regressive, `θ = 0` neutral (`ψ = Z`).
pub fn burn_fraction_quadratic(z: f64, theta: f64) -> f64 {
    let z = z.clamp(0.0, 1.0);
    ((theta + 1.0) * z - theta * z * z).clamp(0.0, 1.0)
}

/// Unnormalized accumulation of the piecewise burn curve
///
/// The local burning surface `g(s)` is linear within each phase and
/// continuous at the boundaries:
///
/// ```text
/// phase 1  [0,  z1]: g = 1 + bp·s/z1
/// phase 2  [z1, z2]: g = g1·(1 + brp·(s − z1)/(z2 − z1)),  g1 = 1 + bp
/// phase 3  [z2, 1 ]: g = g2·(1 − br·(s − z2)/(1 − z2)),   g2 = g1·(1 + brp)
/// ```
///
/// The returned value is `∫₀ᶻ g(s) ds`, evaluated in closed form. Phase
/// offsets are computed by the same expressions used inside each phase so the
/// curve carries no seam at `z1` or `z2`.
pub fn piecewise_raw(z: f64, z1: f64, z2: f64, bp: f64, br: f64, brp: f64) -> f64 {
    let z = z.clamp(0.0, 1.0);

    let phase1 = |s: f64| s + bp * s * s / (2.0 * z1);
    let g1 = 1.0 + bp;
    let span2 = z2 - z1;
    let phase2 = |s: f64| {
        let d = s - z1;
        g1 * (d + brp * d * d / (2.0 * span2))
    };
    let g2 = g1 * (1.0 + brp);
    let span3 = 1.0 - z2;
    let phase3 = |s: f64| {
        let d = s - z2;
        g2 * (d - br * d * d / (2.0 * span3))
    };

    if z <= z1 {
        phase1(z)
    } else if z <= z2 {
        phase1(z1) + phase2(z)
    } else {
        phase1(z1) + phase2(z2) + phase3(z)
    }
}

/// Burned fraction from the three-phase piecewise form function
///
/// Normalized by the accumulation at `Z = 1`, so `ψ(0) = 0` and `ψ(1) = 1`
/// exactly. Callers evaluating many points should use
/// [`crate::core_types::PiecewiseBurn`], which computes the normalizer once.
///
/// # Arguments
/// * `z` - Normalized burn depth (clamped to [0, 1])
/// * `z1`, `z2` - Phase boundaries, `0 < z1 < z2 < 1`
/// * `bp` - Relative surface growth over phase 1
/// * `br` - Relative surface loss over the tail-off phase
/// * `brp` - Relative surface growth over the blend phase
pub fn burn_fraction_piecewise(z: f64, z1: f64, z2: f64, bp: f64, br: f64, brp: f64) -> f64 {
    let total = piecewise_raw(1.0, z1, z2, bp, br, brp);
    if total <= 0.0 {
        return 0.0;
    }
    piecewise_raw(z, z1, z2, bp, br, brp) / total
}

/// Noble-Abel gas pressure
///
/// # Formula
/// ```text
/// P = f·ω·ψ / (V_free − ω·ψ·η)
/// ```
///
/// # Returns
/// Pressure in Pa; `0` when nothing has burned and `f64::INFINITY` when the
/// covolume of the burned gas fills the free volume. The integrator floors
/// the denominator instead of calling this for the in-flight state.
pub fn pressure_noble_abel(
    charge_mass: f64,
    free_volume: f64,
    covolume: f64,
    force: f64,
    psi: f64,
) -> f64 {
    if psi <= 0.0 {
        return 0.0;
    }
    let denominator = free_volume - charge_mass * psi * covolume;
    if denominator <= 0.0 {
        return f64::INFINITY;
    }
    force * charge_mass * psi / denominator
}

/// Linear burn rate from Vieille's (Saint-Robert's) law, `r = a·Pⁿ` (m/s)
pub fn burn_rate_vieille(pressure: f64, coeff: f64, exponent: f64) -> f64 {
    if pressure <= 0.0 {
        return 0.0;
    }
    coeff * pressure.powf(exponent)
}

/// Adiabatic flame temperature from propellant force, `T = f·M/R` (K)
pub fn flame_temperature(force: f64, molar_mass: f64) -> f64 {
    force * molar_mass / R_UNIVERSAL
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [(f64, f64, f64, f64, f64); 4] = [
        (0.0936, 0.0794, 0.0868, 0.4804, 0.8363),
        (0.1717, 0.1259, 0.1506, 0.3391, 0.4215),
        (0.1238, 0.0892, 0.1079, 0.6264, 0.6890),
        (0.1995, 0.1310, 0.1688, 0.4296, 0.8867),
    ];

    #[test]
    fn test_quadratic_endpoints_independent_of_theta() {
        for theta in [-0.5, -0.2, 0.0, 0.3] {
            assert_eq!(burn_fraction_quadratic(0.0, theta), 0.0);
            assert!((burn_fraction_quadratic(1.0, theta) - 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn test_quadratic_shape() {
        // Progressive grain burns slower than linear at first
        assert!(burn_fraction_quadratic(0.3, -0.2) < 0.3);
        assert!(burn_fraction_quadratic(0.3, 0.2) > 0.3);
        assert!((burn_fraction_quadratic(0.3, 0.0) - 0.3).abs() < 1e-15);
        // Clamping
        assert_eq!(burn_fraction_quadratic(-1.0, -0.2), 0.0);
        assert!((burn_fraction_quadratic(2.0, -0.2) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_piecewise_endpoints() {
        for (bp, br, brp, z1, z2) in CURVES {
            assert_eq!(burn_fraction_piecewise(0.0, z1, z2, bp, br, brp), 0.0);
            assert_eq!(burn_fraction_piecewise(1.0, z1, z2, bp, br, brp), 1.0);
        }
    }

    #[test]
    fn test_piecewise_continuous_at_boundaries() {
        let eps = 1e-12;
        for (bp, br, brp, z1, z2) in CURVES {
            for boundary in [z1, z2] {
                let below = burn_fraction_piecewise(boundary - eps, z1, z2, bp, br, brp);
                let above = burn_fraction_piecewise(boundary + eps, z1, z2, bp, br, brp);
                assert!((above - below).abs() < 1e-9, "jump at {boundary}");
            }
        }
    }

    #[test]
    fn test_piecewise_monotonic() {
        for (bp, br, brp, z1, z2) in CURVES {
            let mut prev = 0.0;
            for i in 0..=2000 {
                let psi = burn_fraction_piecewise(f64::from(i) / 2000.0, z1, z2, bp, br, brp);
                assert!(psi >= prev);
                prev = psi;
            }
        }
    }

    #[test]
    fn test_piecewise_midpoint_is_reasonable() {
        let psi = burn_fraction_piecewise(0.5, 0.4, 0.8, 0.15, 0.10, 0.12);
        assert!((0.3..=0.7).contains(&psi));
    }

    #[test]
    fn test_noble_abel() {
        assert_eq!(pressure_noble_abel(0.003, 3e-6, 1e-3, 950e3, 0.0), 0.0);

        let p = pressure_noble_abel(0.003, 3e-6, 1e-3, 950e3, 0.5);
        let expected = 950e3 * 0.003 * 0.5 / (3e-6 - 0.003 * 0.5 * 1e-3);
        assert!((p - expected).abs() / expected < 1e-12);

        // Covolume fills the space
        assert!(pressure_noble_abel(0.003, 1e-6, 1e-3, 950e3, 1.0).is_infinite());
    }

    #[test]
    fn test_vieille() {
        assert_eq!(burn_rate_vieille(0.0, 1.6e-8, 0.86), 0.0);
        assert_eq!(burn_rate_vieille(-5.0, 1.6e-8, 0.86), 0.0);
        let r = burn_rate_vieille(300e6, 1.6e-8, 0.86);
        assert!((r - 1.6e-8 * 300e6_f64.powf(0.86)).abs() < 1e-15);
        assert!(burn_rate_vieille(400e6, 1.6e-8, 0.86) > r);
    }

    #[test]
    fn test_flame_temperature() {
        // 1 MJ/kg at 26 g/mol
        let t = flame_temperature(1.0e6, 0.026);
        assert!((t - 3127.26).abs() < 0.01);
    }
}

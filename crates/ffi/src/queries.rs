use bore_sim_core::simulation::{CurvePoint, SimulationResult};
use std::os::raw::c_char;
use std::ptr;

use crate::error::{BoreSimErrorCode, DefaultBoreSimError};
use crate::helpers::{handle_ffi_result_error, run_from_ptr, track_error};
use crate::instance::BoreSimRun;

#[repr(C)]
/// FFI-friendly headline figures of a run, in handloading units.
/// Keep this layout stable for C/C++/C# consumers.
pub struct RunSummary {
    /// Peak breech pressure (psi).
    pub peak_pressure_psi: f64,
    /// Time of the peak after ignition (ms).
    pub peak_pressure_time_ms: f64,
    /// Muzzle velocity (fps).
    pub muzzle_velocity_fps: f64,
    /// Ignition to muzzle exit (ms).
    pub barrel_time_ms: f64,
    /// Muzzle energy (ft-lbs).
    pub muzzle_energy_ft_lbs: f64,
    /// Free recoil energy (ft-lbs).
    pub recoil_energy_ft_lbs: f64,
    /// Recoil impulse (N·s).
    pub recoil_impulse_ns: f64,
    /// Case hoop stress at the inner wall (psi).
    pub hoop_stress_psi: f64,
    /// Throat erosion per shot (m).
    pub erosion_per_shot_m: f64,
    /// Dominant barrel frequency (Hz).
    pub barrel_frequency_hz: f64,
    /// Whether the barrel time lands on an optimal barrel time node.
    pub obt_match: bool,
    /// Whether the bullet left the barrel within the time limit.
    pub exited_barrel: bool,
    /// Overall safety verdict.
    pub is_safe: bool,
    /// Number of warnings, readable with `bore_sim_run_warning`.
    pub warning_count: usize,
    /// Points per curve (0 when integration failed).
    pub sample_count: usize,
}

impl From<&SimulationResult> for RunSummary {
    fn from(r: &SimulationResult) -> Self {
        Self {
            peak_pressure_psi: r.peak_pressure.to_psi(),
            peak_pressure_time_ms: r.peak_pressure_time.to_ms(),
            muzzle_velocity_fps: r.muzzle_velocity.to_fps(),
            barrel_time_ms: r.barrel_time.to_ms(),
            muzzle_energy_ft_lbs: r.muzzle_energy.to_ft_lbs(),
            recoil_energy_ft_lbs: r.recoil_energy.to_ft_lbs(),
            recoil_impulse_ns: *r.recoil_impulse,
            hoop_stress_psi: r.hoop_stress.to_psi(),
            erosion_per_shot_m: *r.erosion_per_shot,
            barrel_frequency_hz: *r.barrel_frequency,
            obt_match: r.obt_match,
            exited_barrel: r.exited_barrel,
            is_safe: r.is_safe,
            warning_count: r.warnings.len(),
            sample_count: r.curves.len(),
        }
    }
}

/// Output curve selector. Values are copied in SI units.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Breech pressure (Pa).
    BreechPressure = 0,
    /// Bullet velocity (m/s).
    Velocity = 1,
    /// Bullet travel from seating (m).
    Travel = 2,
    /// Burned fraction ψ.
    BurnFraction = 3,
    /// Bullet kinetic energy (J).
    KineticEnergy = 4,
    /// Mean gas temperature (K).
    GasTemperature = 5,
    /// Cumulative wall heat loss (J).
    HeatLoss = 6,
    /// Recoil impulse so far (N·s).
    RecoilImpulse = 7,
}

impl TryFrom<u32> for CurveKind {
    type Error = DefaultBoreSimError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => CurveKind::BreechPressure,
            1 => CurveKind::Velocity,
            2 => CurveKind::Travel,
            3 => CurveKind::BurnFraction,
            4 => CurveKind::KineticEnergy,
            5 => CurveKind::GasTemperature,
            6 => CurveKind::HeatLoss,
            7 => CurveKind::RecoilImpulse,
            other => {
                return Err(DefaultBoreSimError::invalid_parameter(format!(
                    "unknown curve kind {other}"
                )))
            }
        })
    }
}

fn curve(result: &SimulationResult, kind: CurveKind) -> &[CurvePoint] {
    let c = &result.curves;
    match kind {
        CurveKind::BreechPressure => &c.breech_pressure,
        CurveKind::Velocity => &c.velocity,
        CurveKind::Travel => &c.travel,
        CurveKind::BurnFraction => &c.burn_fraction,
        CurveKind::KineticEnergy => &c.kinetic_energy,
        CurveKind::GasTemperature => &c.gas_temperature,
        CurveKind::HeatLoss => &c.heat_loss,
        CurveKind::RecoilImpulse => &c.recoil_impulse,
    }
}

#[no_mangle]
/// Fill `out_summary` with the run's headline figures.
///
/// Returns
/// - `BoreSimErrorCode::Ok` (0) on success
/// - `BoreSimErrorCode::NullPointer` if `run` or `out_summary` is null
///
/// # Safety
///
/// - `run` must be null or a live pointer returned by `bore_sim_run`.
/// - `out_summary` must be null or point to writable `RunSummary` memory.
pub unsafe extern "C" fn bore_sim_run_summary(
    run: *const BoreSimRun,
    out_summary: *mut RunSummary,
) -> BoreSimErrorCode {
    if out_summary.is_null() {
        return track_error(&DefaultBoreSimError::null_pointer("out_summary"));
    }

    handle_ffi_result_error(|| {
        let run = unsafe { run_from_ptr(run) }?;
        unsafe {
            *out_summary = RunSummary::from(&run.result);
        }
        Ok(())
    })
}

#[no_mangle]
/// Copy one curve into caller-owned buffers.
///
/// `kind` is a `CurveKind` value passed as its integer discriminant.
/// `out_times` and `out_values` each receive `summary.sample_count` doubles.
/// `out_len` always receives the required length, so callers can size their
/// buffers with a first call passing `capacity = 0`.
///
/// Returns
/// - `BoreSimErrorCode::Ok` (0) on success
/// - `BoreSimErrorCode::NullPointer` if `run` or `out_len` is null, or a buffer
///   is null while `capacity > 0`
/// - `BoreSimErrorCode::InvalidParameter` if `kind` is not a `CurveKind`
/// - `BoreSimErrorCode::BufferTooSmall` if `capacity` is below the curve length
///
/// # Safety
///
/// - `run` must be null or a live pointer returned by `bore_sim_run`.
/// - `out_times` and `out_values` must each be valid for `capacity` writes.
/// - `out_len` must be null or point to a writable `usize`.
///
/// # Example Usage (C++)
/// ```cpp
/// uintptr_t n = 0;
/// auto kind = static_cast<uint32_t>(CurveKind::BreechPressure);
/// bore_sim_run_copy_curve(run, kind, nullptr, nullptr, 0, &n);
/// std::vector<double> t(n), p(n);
/// bore_sim_run_copy_curve(run, kind, t.data(), p.data(), n, &n);
/// ```
pub unsafe extern "C" fn bore_sim_run_copy_curve(
    run: *const BoreSimRun,
    kind: u32,
    out_times: *mut f64,
    out_values: *mut f64,
    capacity: usize,
    out_len: *mut usize,
) -> BoreSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultBoreSimError::null_pointer("out_len"));
    }

    handle_ffi_result_error(|| {
        let run = unsafe { run_from_ptr(run) }?;
        let kind = match CurveKind::try_from(kind) {
            Ok(kind) => kind,
            Err(e) => {
                unsafe {
                    *out_len = 0;
                }
                return Err(e);
            }
        };
        let points = curve(&run.result, kind);
        unsafe {
            *out_len = points.len();
        }

        if capacity < points.len() {
            return Err(DefaultBoreSimError::buffer_too_small(points.len(), capacity));
        }
        if points.is_empty() {
            return Ok(());
        }
        if out_times.is_null() {
            return Err(DefaultBoreSimError::null_pointer("out_times"));
        }
        if out_values.is_null() {
            return Err(DefaultBoreSimError::null_pointer("out_values"));
        }

        // SAFETY: both buffers are non-null and valid for `capacity >= len` writes
        let (times, values) = unsafe {
            (
                std::slice::from_raw_parts_mut(out_times, points.len()),
                std::slice::from_raw_parts_mut(out_values, points.len()),
            )
        };
        for ((t, v), p) in times.iter_mut().zip(values.iter_mut()).zip(points) {
            *t = p.time;
            *v = p.value;
        }
        Ok(())
    })
}

#[no_mangle]
/// Borrow the warning at `index` as a null-terminated C string.
///
/// The pointer is owned by the run and stays valid until
/// `bore_sim_run_destroy`. **DO NOT FREE THIS POINTER**.
///
/// Returns
/// - `BoreSimErrorCode::Ok` (0) on success
/// - `BoreSimErrorCode::NullPointer` if `run` or `out_message` is null
/// - `BoreSimErrorCode::IndexOutOfRange` if `index >= warning_count`
///
/// # Safety
///
/// - `run` must be null or a live pointer returned by `bore_sim_run`.
/// - `out_message` must be null or point to a writable `*const c_char`.
pub unsafe extern "C" fn bore_sim_run_warning(
    run: *const BoreSimRun,
    index: usize,
    out_message: *mut *const c_char,
) -> BoreSimErrorCode {
    if out_message.is_null() {
        return track_error(&DefaultBoreSimError::null_pointer("out_message"));
    }

    let result = handle_ffi_result_error(|| {
        let run = unsafe { run_from_ptr(run) }?;
        let warning = run.warnings.get(index).ok_or_else(|| {
            DefaultBoreSimError::index_out_of_range("warning", index, run.warnings.len())
        })?;
        unsafe {
            *out_message = warning.as_ptr();
        }
        Ok(())
    });

    if result != BoreSimErrorCode::Ok {
        unsafe {
            *out_message = ptr::null();
        }
    }

    result
}

use bore_sim_core::{simulate, SimulationConfig, SimulationResult};
use std::ffi::CString;
use std::ptr;

use crate::error::{BoreSimErrorCode, DefaultBoreSimError};
use crate::helpers::{track_error, track_result};
use crate::load::LoadSpec;

/// A completed simulation run.
///
/// Opaque to C callers. Results are immutable once created, so a handle can
/// be read from any number of threads at once without locking.
///
/// # Usage
/// ```cpp
/// LoadSpec load;
/// bore_sim_load_reference_308(&load);
/// load.charge_gr = 45.0;
///
/// BoreSimRun* run = nullptr;
/// if (bore_sim_run(&load, 0, &run) != BoreSimErrorCode::Ok) {
///     fprintf(stderr, "%s\n", bore_sim_get_last_error());
///     return;
/// }
///
/// RunSummary summary;
/// bore_sim_run_summary(run, &summary);
/// printf("%.0f fps at %.0f psi\n", summary.muzzle_velocity_fps, summary.peak_pressure_psi);
///
/// bore_sim_run_destroy(run);
/// ```
pub struct BoreSimRun {
    pub(crate) result: SimulationResult,
    /// Warnings converted once so borrowed pointers stay valid for the handle's lifetime.
    pub(crate) warnings: Vec<CString>,
}

impl BoreSimRun {
    /// Run one load through the core.
    ///
    /// # Errors
    ///
    /// Returns `BoreSimErrorCode::InvalidParameter` or
    /// `BoreSimErrorCode::InvalidBurnCurve` when the load cannot be modeled.
    pub(crate) fn new(load: &LoadSpec, sample_count: usize) -> Result<Box<Self>, DefaultBoreSimError> {
        let inputs = load.to_inputs()?;

        let mut config = SimulationConfig::default();
        if sample_count > 0 {
            config.solver.sample_count = sample_count;
        }

        let result = simulate(&inputs, &config)?;
        let warnings = result
            .warnings
            .iter()
            .map(|w| {
                CString::new(w.as_str()).map_err(|_| {
                    DefaultBoreSimError::invalid_parameter(format!("warning contains NUL: {w}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(Self { result, warnings }))
    }
}

/// Simulate a load and return the run via out-parameter.
///
/// Parameters
/// - `load`: The load to simulate. Read only; the caller keeps ownership.
/// - `sample_count`: Points per output curve, or 0 for the default (200).
///   Must be at least 2 when non-zero.
/// - `out_run`: Pointer to receive the run. Must be non-null.
///   - On success: set to a valid `BoreSimRun` pointer
///   - On failure: set to null
///
/// Returns
/// - `BoreSimErrorCode::Ok` (0): success. Unsafe or failed physics still
///   succeed here; check `RunSummary::is_safe` and the warnings.
/// - `BoreSimErrorCode::NullPointer`: `load` or `out_run` is null
/// - `BoreSimErrorCode::InvalidParameter`: a load value the model cannot use
/// - `BoreSimErrorCode::InvalidBurnCurve`: an out-of-range piecewise curve
///
/// # Safety
///
/// - `load` must be null or point to a valid `LoadSpec`.
/// - `out_run` must be null or point to writable memory.
/// - The caller takes ownership of the returned run and MUST call
///   `bore_sim_run_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn bore_sim_run(
    load: *const LoadSpec,
    sample_count: usize,
    out_run: *mut *mut BoreSimRun,
) -> BoreSimErrorCode {
    if out_run.is_null() {
        return track_error(&DefaultBoreSimError::null_pointer("out_run"));
    }

    let Some(load) = (unsafe { load.as_ref() }) else {
        unsafe {
            *out_run = ptr::null_mut();
        }
        return track_error(&DefaultBoreSimError::null_pointer("load"));
    };

    match track_result(BoreSimRun::new(load, sample_count)) {
        Ok(run) => {
            unsafe {
                *out_run = Box::into_raw(run);
            }
            BoreSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_run = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroys a run previously created by `bore_sim_run`.
///
/// If `run` is null, this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `bore_sim_run` and not freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn bore_sim_run_destroy(run: *mut BoreSimRun) {
    if run.is_null() {
        return;
    }

    // SAFETY: the pointer came from `Box::into_raw` in `bore_sim_run` and is
    // freed exactly once here.
    unsafe {
        drop(Box::from_raw(run));
    }
}

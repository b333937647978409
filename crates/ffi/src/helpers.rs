use crate::error::{with_last_error_mut, BoreSimError, BoreSimErrorCode, DefaultBoreSimError};
use crate::instance::BoreSimRun;
use std::ffi::CString;

/// Set the thread-local error message and code.
/// Accepts any type implementing `BoreSimError` trait.
pub(crate) fn set_last_error(error: &impl BoreSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl BoreSimError) -> BoreSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, passing successes through.
pub(crate) fn track_result<T, E: BoreSimError>(result: Result<T, E>) -> Result<T, BoreSimErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(e) => Err(track_error(&e)),
    }
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = BoreSimErrorCode::Ok;
    });
}

/// Run a fallible FFI body and convert its outcome into an error code.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> BoreSimErrorCode
where
    F: FnOnce() -> Result<(), DefaultBoreSimError>,
{
    match track_result(f()) {
        Ok(()) => BoreSimErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow a run handle, rejecting null.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `bore_sim_run`.
pub(crate) unsafe fn run_from_ptr<'a>(ptr: *const BoreSimRun) -> Result<&'a BoreSimRun, DefaultBoreSimError> {
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultBoreSimError::null_pointer("run"))
}

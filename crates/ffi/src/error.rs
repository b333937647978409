use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use bore_sim_core::InputError;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait BoreSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> BoreSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `BoreSimError` for the FFI error scenarios.
///
/// Wraps a `BoreSimErrorCode` with a message and provides a constructor for
/// each error kind (except Ok, which represents success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBoreSimError {
    code: BoreSimErrorCode,
    msg: String,
}

impl DefaultBoreSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_run"`, `"load"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: BoreSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: BoreSimErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for a caller buffer that cannot hold the output.
    ///
    /// # Arguments
    /// * `needed` - Element count the output requires
    /// * `capacity` - Element count the caller supplied
    pub fn buffer_too_small(needed: usize, capacity: usize) -> Self {
        Self {
            code: BoreSimErrorCode::BufferTooSmall,
            msg: format!("Output buffer holds {capacity} elements, {needed} required"),
        }
    }

    /// Create error for an index past the end of a collection.
    pub fn index_out_of_range(what: &str, index: usize, len: usize) -> Self {
        Self {
            code: BoreSimErrorCode::IndexOutOfRange,
            msg: format!("{what} index {index} out of range (len {len})"),
        }
    }
}

impl From<InputError> for DefaultBoreSimError {
    fn from(error: InputError) -> Self {
        let code = match error {
            InputError::PartialBurnCurve { .. } | InputError::InvalidBurnCurve(_) => {
                BoreSimErrorCode::InvalidBurnCurve
            }
            InputError::InvalidParameter { .. } => BoreSimErrorCode::InvalidParameter,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl BoreSimError for DefaultBoreSimError {
    fn code(&self) -> BoreSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by the simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoreSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// A load parameter is non-finite or non-positive where the model needs it positive.
    InvalidParameter = 2,

    /// The piecewise burn curve is incomplete or its parameters are out of range.
    InvalidBurnCurve = 3,

    /// A caller-provided output buffer is too small.
    BufferTooSmall = 4,

    /// An index argument is past the end of the queried collection.
    IndexOutOfRange = 5,
}

impl From<DefaultBoreSimError> for BoreSimErrorCode {
    fn from(error: DefaultBoreSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// Allows callers to retrieve diagnostic information after a failed call.
    static LAST_ERROR: RefCell<(Option<CString>, BoreSimErrorCode)> = const { RefCell::new((None, BoreSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, BoreSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, BoreSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own
/// independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// BoreSimRun* run = nullptr;
/// BoreSimErrorCode err = bore_sim_run(&load, 0, &run);
/// if (err != BoreSimErrorCode::Ok) {
///     const char* error = bore_sim_get_last_error();
///     if (error) {
///         printf("Simulation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn bore_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `BoreSimErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn bore_sim_get_last_error_code() -> BoreSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}

//! C ABI over the interior-ballistics core.
//!
//! A caller fills a [`LoadSpec`], runs it with [`bore_sim_run`], reads the
//! headline figures, curves and warnings from the returned handle and frees it
//! with [`bore_sim_run_destroy`]. Every entry point returns a
//! [`BoreSimErrorCode`]; the message for the last failure on the calling
//! thread is available from [`bore_sim_get_last_error`].

#![allow(unsafe_code)]

mod error;
mod helpers;
mod instance;
mod load;
mod queries;

pub use error::{bore_sim_get_last_error, bore_sim_get_last_error_code, BoreSimErrorCode};
pub use instance::{bore_sim_run, bore_sim_run_destroy, BoreSimRun};
pub use load::{bore_sim_load_reference_308, BurnCurveSpec, LoadSpec};
pub use queries::{
    bore_sim_run_copy_curve, bore_sim_run_summary, bore_sim_run_warning, CurveKind, RunSummary,
};

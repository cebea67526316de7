#![warn(clippy::pedantic)]
// Noisy doc/signature lints
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference: format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// The code/message table is one long exhaustive match
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]

pub mod boundary;
pub mod cli;
pub mod config;
pub mod errors;
pub mod http;
pub(crate) mod utils;

pub use errors::{AppError, AppResult, ErrorBand, ErrorCode};
pub use http::{ApiClient, RequestBody, RequestConfig};

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    pub use crate::errors::classify::parse_error_envelope;
    pub use crate::http::error_from_status;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Error types for Carve

use thiserror::Error;

/// Result type alias using Carve's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Carve operations
///
/// Field queries themselves never fail: degenerate geometry resolves to
/// fallback values and non-convergence is reported as a miss. Malformed
/// programs are rejected by `carve_sdf` when they are built.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

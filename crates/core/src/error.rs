//! Error types for yardplan.

use thiserror::Error;

/// Result type alias using the yardplan [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can cross a yardplan API boundary.
///
/// Most runtime conditions of an optimization (small lots, infeasible vehicle
/// mixes, solver timeouts) are reported through a status on the result value.
/// Only misuse of a call contract becomes an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// Lot boundary is malformed (too few points, non-finite coordinates).
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// Entry or exit point is malformed.
    #[error("invalid entry point: {0}")]
    InvalidEntryPoint(String),

    /// A vehicle type key is not in the catalog.
    #[error("unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    /// JSON encoding or decoding failed.
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

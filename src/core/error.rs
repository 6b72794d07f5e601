//! Estimator error types.

use thiserror::Error;

/// Errors returned by [`estimate`](crate::core::estimate) before any slot is counted.
///
/// A request that is valid but fits nowhere is not an error; it comes back as
/// a [`MatchResult`](crate::core::MatchResult) with `feasible == false`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EstimateError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("degenerate request: no cores, memory, GPUs or disk requested")]
    DegenerateRequest,
}

pub type EstimateResult<T> = Result<T, EstimateError>;

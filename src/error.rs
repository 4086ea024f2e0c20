//! Error taxonomy shared by arms, problems, and the evaluation harness.

use thiserror::Error;

/// Errors raised by `bandidos`.
///
/// Every error is raised at the point of violation and nothing is retried: a
/// misbehaving arm aborts the run instead of silently corrupting the record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed caller input (non-positive horizon, out-of-range arm index, bad config value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An arm broke the capability contract (e.g. a malformed density).
    #[error("arm {arm} violated the arm contract: {reason}")]
    ContractViolation { arm: usize, reason: String },

    /// An arm produced a sample that cannot be read as an `f64`.
    #[error("arm {arm} returned a sample that is not a number: {found}")]
    TypeMismatch { arm: usize, found: String },

    /// The operation needs a lifecycle milestone that has not been reached.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

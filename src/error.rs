//! Error taxonomy for the signing pipeline.

use thiserror::Error;

/// Failure reported by a [`HashService`](crate::service::HashService) implementation.
#[derive(Error, Debug)]
#[error("digest failed: {0}")]
pub struct DigestError(pub String);

/// Central error type for the signing pipeline.
///
/// A run either returns the complete combined string or exactly one of these;
/// partial results are never surfaced.
#[derive(Error, Debug)]
pub enum SignError {
    /// Seed item is neither a recognized integer nor a string.
    #[error("unsupported input type: {0}")]
    UnsupportedInput(String),

    /// A fast or slow digest call failed.
    #[error("hash service error: {0}")]
    HashService(#[from] DigestError),

    /// A stage failed; the payload is the first error recorded during the run.
    #[error("pipeline aborted: {0}")]
    Aborted(Box<SignError>),

    /// A stage thread panicked instead of returning.
    #[error("{0} stage panicked")]
    StagePanicked(&'static str),

    /// A per-item task spawned by a stage panicked.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

impl SignError {
    /// Wrap the first recorded failure as the error surfaced to the caller.
    pub fn into_aborted(self) -> SignError {
        match self {
            already @ SignError::Aborted(_) => already,
            other => SignError::Aborted(Box::new(other)),
        }
    }
}

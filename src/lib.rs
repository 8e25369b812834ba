//! Datasign: concurrent multi-stage data-signing pipeline.
//!
//! Each seed item fans out over a cheap digest and a globally rate-limited
//! one, fans out again over a fixed width of keyed digests, and the results
//! are combined into a single deterministic string. The digest algorithms
//! live behind the [`service::HashService`] trait; the crate ships
//! [`service::Crc32Md5`] as the reference implementation.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use serde_json::Value;
use std::sync::Arc;

pub use error::{DigestError, SignError};
use pipeline::{Combine, MultiHash, SingleHash, Stage, StageContext, execute_pipeline};
use service::HashService;

/// Result alias used by the public datasign API
pub type Result<T> = std::result::Result<T, SignError>;

/// Single entry point: sign `seed` through the three-stage pipeline using
/// `service` for all digest calls, and return the combined string.
///
/// Blocks until every stage has drained and every spawned task has joined.
/// On any failure the run is cancelled and a single
/// [`SignError::Aborted`] is returned; partial results are never surfaced.
pub fn sign_items(seed: Vec<WorkItem>, service: Arc<dyn HashService>) -> Result<String> {
    let ctx = Arc::new(StageContext::new(service));
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(SingleHash),
        Box::new(MultiHash),
        Box::new(Combine),
    ];

    let mut results = execute_pipeline(stages, seed, ctx)?;
    debug!("pipeline drained, {} combined result(s)", results.len());
    Ok(results.pop().unwrap_or_default())
}

/// [`sign_items`] over loosely typed seed values (e.g. a parsed JSON array).
///
/// Items are resolved once at entry; a value that is neither an integer nor a
/// string fails with [`SignError::UnsupportedInput`] before any stage runs.
pub fn sign_values(values: &[Value], service: Arc<dyn HashService>) -> Result<String> {
    let seed = values
        .iter()
        .map(WorkItem::from_value)
        .collect::<Result<Vec<_>>>()?;
    sign_items(seed, service)
}

//! The digest collaborator consumed by the pipeline.
//!
//! The algorithms themselves are opaque to the pipeline; it only relies on the
//! concurrency contracts stated on [`HashService`]. Retry or backoff policy,
//! if any, belongs to the implementation, never to the pipeline.

use md5::{Digest, Md5};

use crate::error::DigestError;

/// Pair of pure digest functions the pipeline is built around.
pub trait HashService: Send + Sync {
    /// Cheap digest. Pure and deterministic; safe under unbounded concurrent invocation.
    fn fast_digest(&self, input: &str) -> Result<String, DigestError>;

    /// Rate-limited digest. Pure and deterministic, but the caller must
    /// guarantee at most one in-flight call process-wide. The pipeline
    /// enforces this with the shared lock in
    /// [`StageContext`](crate::pipeline::StageContext).
    fn slow_digest(&self, input: &str) -> Result<String, DigestError>;
}

/// Reference service: CRC32 as the fast digest, MD5 as the slow one.
///
/// `fast_digest` renders the IEEE CRC32 checksum as a decimal string;
/// `slow_digest` renders the MD5 digest as lowercase hex. These match the
/// documented golden output for the seed sequence `0..N`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Crc32Md5;

impl HashService for Crc32Md5 {
    fn fast_digest(&self, input: &str) -> Result<String, DigestError> {
        Ok(crc32fast::hash(input.as_bytes()).to_string())
    }

    fn slow_digest(&self, input: &str) -> Result<String, DigestError> {
        let mut hasher = Md5::new();
        hasher.update(input.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

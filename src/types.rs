//! Public and internal types for the datasign API and pipeline.

use serde_json::Value;

use crate::error::SignError;

/// Fan-out width of the multi-hash stage: sub-digests per item, concatenated in slot order.
pub const MULTIHASH_WIDTH: usize = 6;

/// Default seed length when none is given: items `0..7`.
pub const DEFAULT_SEED_COUNT: u64 = 7;

/// Separator between the two digests a single-hash item produces.
pub const SINGLE_HASH_SEPARATOR: &str = "~";

/// Separator joining the sorted per-item results into the combined output.
pub const COMBINE_SEPARATOR: &str = "_";

/// A seed value entering the pipeline. Resolved to its text form exactly once
/// at the pipeline entry; every stage downstream carries plain strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkItem {
    Int(i64),
    Str(String),
}

impl WorkItem {
    /// Build a work item from a loosely typed seed value. Only integers and
    /// strings are recognized; anything else fails the run before any stage starts.
    pub fn from_value(value: &Value) -> Result<WorkItem, SignError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(WorkItem::Int)
                .ok_or_else(|| SignError::UnsupportedInput(value.to_string())),
            Value::String(s) => Ok(WorkItem::Str(s.clone())),
            other => Err(SignError::UnsupportedInput(other.to_string())),
        }
    }

    /// Canonical string form fed into the digest stages (decimal for integers).
    pub fn as_text(&self) -> String {
        match self {
            WorkItem::Int(n) => n.to_string(),
            WorkItem::Str(s) => s.clone(),
        }
    }
}

impl From<i64> for WorkItem {
    fn from(n: i64) -> Self {
        WorkItem::Int(n)
    }
}

impl From<&str> for WorkItem {
    fn from(s: &str) -> Self {
        WorkItem::Str(s.to_string())
    }
}

/// Default seed sequence: integers `0..count`.
pub fn default_seed(count: u64) -> Vec<WorkItem> {
    (0..count as i64).map(WorkItem::Int).collect()
}

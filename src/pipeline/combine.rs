//! Final stage: blocking collect, canonical sort, single joined result.

use crossbeam_channel::{Receiver, Sender};
use log::debug;

use crate::error::SignError;
use crate::pipeline::{Stage, StageContext};
use crate::types::COMBINE_SEPARATOR;

/// Accumulates every upstream result, sorts ascending byte-wise, and emits
/// exactly one `"_"`-joined string. The sort is what makes the end-to-end
/// output deterministic despite unordered upstream completion.
pub struct Combine;

impl Stage for Combine {
    fn name(&self) -> &'static str {
        "combine"
    }

    fn run(
        &self,
        input: Receiver<String>,
        output: Sender<String>,
        _ctx: &StageContext,
    ) -> Result<(), SignError> {
        let mut results: Vec<String> = input.iter().collect();
        debug!("combine: input drained, {} results", results.len());

        results.sort_unstable();
        let _ = output.send(results.join(COMBINE_SEPARATOR));
        Ok(())
    }
}

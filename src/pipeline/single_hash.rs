//! First stage: per item, a fast digest of the original raced against the
//! slow digest, then a fast digest of the slow result.

use crossbeam_channel::{Receiver, Sender};
use std::thread;

use crate::error::SignError;
use crate::pipeline::executor::join_item_tasks;
use crate::pipeline::{Stage, StageContext};
use crate::types::SINGLE_HASH_SEPARATOR;

const STAGE_NAME: &str = "single_hash";

/// Emits `fast(item) + "~" + fast(slow(item))` for every input item, one
/// unbounded concurrent task per item. Output order across items is
/// unspecified; the combine stage restores a canonical order.
pub struct SingleHash;

impl Stage for SingleHash {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn run(
        &self,
        input: Receiver<String>,
        output: Sender<String>,
        ctx: &StageContext,
    ) -> Result<(), SignError> {
        thread::scope(|scope| {
            let mut tasks = Vec::new();
            for item in input.iter() {
                if ctx.is_cancelled() {
                    break;
                }
                let output = output.clone();
                tasks.push(scope.spawn(move || -> Result<(), SignError> {
                    let signed = sign_item(&item, ctx)?;
                    // Send fails only when the run is already aborting.
                    let _ = output.send(signed);
                    Ok(())
                }));
            }
            join_item_tasks(tasks, STAGE_NAME)
        })
    }
}

/// Digest one item. The slow digest holds the shared lock for exactly the
/// duration of its call; both fast digests run outside it, the first
/// concurrently with the slow call and the second concurrently with the first.
fn sign_item(data: &str, ctx: &StageContext) -> Result<String, SignError> {
    thread::scope(|scope| {
        let fast_task = scope.spawn(|| ctx.service.fast_digest(data));

        let slow = {
            let _serial = ctx.lock_slow_lane();
            ctx.service.slow_digest(data)?
        };
        // Happens-after the slow result; the fast digest of the original may
        // still be in flight.
        let fast_of_slow = ctx.service.fast_digest(&slow)?;

        let fast = fast_task
            .join()
            .map_err(|_| SignError::TaskPanicked(STAGE_NAME))??;
        Ok(format!("{fast}{SINGLE_HASH_SEPARATOR}{fast_of_slow}"))
    })
}

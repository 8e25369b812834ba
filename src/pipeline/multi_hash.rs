//! Second stage: fixed-width fan-out per item into index-owned slots.

use crossbeam_channel::{Receiver, Sender};
use std::thread;

use crate::error::{DigestError, SignError};
use crate::pipeline::executor::join_item_tasks;
use crate::pipeline::{Stage, StageContext};
use crate::types::MULTIHASH_WIDTH;

const STAGE_NAME: &str = "multi_hash";

/// For each input string, spawns [`MULTIHASH_WIDTH`] sub-tasks, sub-task *k*
/// computing `fast(k + input)` into slot *k*, then emits the slots joined in
/// index order. Slot order is fixed by index, never by completion order.
pub struct MultiHash;

impl Stage for MultiHash {
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
                    let joined = fan_out_item(&item, ctx)?;
                    let _ = output.send(joined);
                    Ok(())
                }));
            }
            join_item_tasks(tasks, STAGE_NAME)
        })
    }
}

/// Run the fixed-width fan-out for one item and join the slots in index order.
/// Each slot is exclusively owned by one sub-task for its lifetime, so the
/// writes need no lock.
fn fan_out_item(data: &str, ctx: &StageContext) -> Result<String, SignError> {
    let mut slots: Vec<Option<Result<String, DigestError>>> =
        (0..MULTIHASH_WIDTH).map(|_| None).collect();

    thread::scope(|scope| {
        for (k, slot) in slots.iter_mut().enumerate() {
            let service = &ctx.service;
            scope.spawn(move || {
                *slot = Some(service.fast_digest(&format!("{k}{data}")));
            });
        }
    });

    let mut joined = String::new();
    for slot in &mut slots {
        // Every slot is written before its scope ends; None means the writer
        // unwound without storing a result.
        let digest = slot.take().ok_or(SignError::TaskPanicked(STAGE_NAME))??;
        joined.push_str(&digest);
    }
    Ok(joined)
}

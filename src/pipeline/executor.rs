//! Pipeline executor: wires stages together with bounded channels and joins them.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::thread;

use crate::error::SignError;
use crate::pipeline::{STAGE_CHANNEL_CAP, StageContext};
use crate::types::WorkItem;

/// One unit of pipeline work: drain `input`, emit onto `output`, return when
/// every sub-task spawned while draining has emitted. The executor drops the
/// output sender only after `run` returns, so the channel closing is the
/// downstream completion signal and never fires early.
pub trait Stage: Send {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        input: Receiver<String>,
        output: Sender<String>,
        ctx: &StageContext,
    ) -> Result<(), SignError>;
}

/// Run `stages` concurrently, stage *i*'s output feeding stage *i+1*'s input.
///
/// The seed is resolved to text once at entry and fed into the first stage;
/// dropping the seed sender is its completion signal. Returns the drained
/// output of the last stage after every stage thread has joined. If any stage
/// failed, the first recorded error is surfaced as [`SignError::Aborted`] and
/// no output is returned.
pub fn execute_pipeline(
    stages: Vec<Box<dyn Stage>>,
    seed: Vec<WorkItem>,
    ctx: Arc<StageContext>,
) -> Result<Vec<String>, SignError> {
    let (seed_tx, mut input_rx) = bounded::<String>(STAGE_CHANNEL_CAP);

    let mut handles = Vec::with_capacity(stages.len());
    for stage in stages {
        let (out_tx, out_rx) = bounded::<String>(STAGE_CHANNEL_CAP);
        let name = stage.name();
        let stage_ctx = Arc::clone(&ctx);
        let input = input_rx;
        let handle = thread::spawn(move || {
            debug!("{name}: draining input");
            // out_tx moves into run and drops when it returns, closing the
            // channel for the stage downstream.
            if let Err(err) = stage.run(input, out_tx, &stage_ctx) {
                stage_ctx.record_error(err);
            }
            debug!("{name}: output closed");
        });
        handles.push((name, handle));
        input_rx = out_rx;
    }

    for item in seed {
        if ctx.is_cancelled() {
            break;
        }
        if seed_tx.send(item.as_text()).is_err() {
            break;
        }
    }
    drop(seed_tx);

    let mut results = Vec::new();
    while let Ok(item) = input_rx.recv() {
        results.push(item);
    }

    // Join barrier: every stage thread must finish before the call returns.
    for (name, handle) in handles {
        if handle.join().is_err() {
            ctx.record_error(SignError::StagePanicked(name));
        }
    }

    if let Some(err) = ctx.take_error() {
        return Err(err.into_aborted());
    }
    Ok(results)
}

/// Harvest per-item task results for a stage: first error wins, a panicked
/// task maps into the taxonomy instead of unwinding through the stage thread.
pub(crate) fn join_item_tasks<'scope>(
    tasks: Vec<thread::ScopedJoinHandle<'scope, Result<(), SignError>>>,
    stage: &'static str,
) -> Result<(), SignError> {
    let mut first: Result<(), SignError> = Ok(());
    for task in tasks {
        let outcome = task
            .join()
            .unwrap_or_else(|_| Err(SignError::TaskPanicked(stage)));
        if let Err(err) = outcome
            && first.is_ok()
        {
            first = Err(err);
        }
    }
    first
}

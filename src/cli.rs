//! CLI surface: parse the seed, run the pipeline, print the combined string.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::sync::Arc;

use crate::service::Crc32Md5;
use crate::types::{DEFAULT_SEED_COUNT, WorkItem, default_seed};
use crate::utils::setup_logging;

/// Sign a seed sequence through the concurrent hashing pipeline.
#[derive(Clone, Parser)]
#[command(name = "datasign")]
#[command(about = "Sign a seed sequence through the concurrent hashing pipeline.")]
pub struct Cli {
    /// Number of integer seed items 0..N-1. Ignored when --seed is given.
    #[arg(long, short = 'n', value_name = "N", default_value_t = DEFAULT_SEED_COUNT)]
    pub count: u64,

    /// Seed as a JSON array of integers and strings, e.g. '[0,1,"abc"]'.
    #[arg(long, short = 's')]
    pub seed: Option<String>,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Seed sequence for the run: parsed from --seed, or integers 0..count.
    pub fn seed_items(&self) -> Result<Vec<WorkItem>> {
        match &self.seed {
            Some(raw) => {
                let values: Vec<serde_json::Value> =
                    serde_json::from_str(raw).context("--seed must be a JSON array")?;
                let items = values
                    .iter()
                    .map(WorkItem::from_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            }
            None => Ok(default_seed(self.count)),
        }
    }
}

/// Run the pipeline over the CLI seed with the reference digest service and
/// print the combined string. The caller sees the full result or one error.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);

    let seed = cli.seed_items()?;
    debug!("signing {} seed items", seed.len());

    let combined = crate::sign_items(seed, Arc::new(Crc32Md5))?;
    println!("{combined}");
    Ok(())
}

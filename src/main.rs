//! Datasign CLI: sign a seed sequence and print the combined result.

use anyhow::Result;
use clap::Parser;
use datasign::cli::{Cli, handle_run};
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Initialize logging: dependencies stay at warn, this crate logs at info
/// (debug when `verbose`). `RUST_LOG` still overrides both.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let tag = match record.level() {
                Level::Error => "ERROR".red(),
                Level::Warn => "WARN".yellow(),
                Level::Info => "INFO".green(),
                Level::Debug | Level::Trace => "DEBUG".dimmed(),
            };
            writeln!(
                buf,
                "[{} {}] {}",
                env!("CARGO_PKG_NAME").cyan(),
                tag,
                record.args()
            )
        })
        .init();
}

//! Logger initialization.
//!
//! Diagnostics go to stderr through `env_logger`. `RUST_LOG` is read first so
//! per-module directives keep working; the verbosity flags then set the global
//! level and the level for this crate.

use log::LevelFilter;
use std::io::Write;

/// Map `-v`/`-q` counts to a level filter. Quiet wins over verbose.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger. Fails only if a logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("tickmerge", level);
    builder.target(env_logger::Target::Stderr);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    builder.try_init()
}

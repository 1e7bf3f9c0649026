use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use log::{error, info, warn};

use tickmerge::cli::{Cli, StatsFormat};
use tickmerge::logging::{init_logger, level_from_verbosity};
use tickmerge::platform::{termination_exit_code, Ctrl, ExitCode, SignalHandler};
use tickmerge::report::write_reports;
use tickmerge::stats::ProcessingStats;
use tickmerge::{AppConfig, Collector};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            if e.use_stderr() {
                ExitCode::InvalidUsage.exit();
            }
            // --help and --version
            ExitCode::Success.exit();
        }
    };

    if let Err(e) = init_logger(level_from_verbosity(cli.verbose, cli.quiet)) {
        eprintln!("tickmerge: failed to initialize logging: {}", e);
        ExitCode::GeneralError.exit();
    }

    // Broadcast channel for shutdown requests from the signal handler
    let (ctrl_tx, ctrl_rx) = unbounded::<Ctrl>();
    let _signal_handler = match SignalHandler::new(ctrl_tx) {
        Ok(handler) => handler,
        Err(e) => {
            error!("Failed to initialize signal handling: {}", e);
            ExitCode::GeneralError.exit();
        }
    };

    match run(&cli, &ctrl_rx) {
        Ok(code) => code.exit(),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::GeneralError.exit();
        }
    }
}

fn run(cli: &Cli, ctrl_rx: &Receiver<Ctrl>) -> Result<ExitCode> {
    let config = AppConfig::from_cli(cli)?;

    let collector = Collector::new(config.parallel_config());
    info!(
        "Starting ingestion of {} files with {} workers",
        config.input.files.len(),
        collector.config().worker_count()
    );

    let collection = collector
        .collect_with_stats(&config.input.files)
        .context("Ingestion failed")?;

    if let Some(format) = config.output.stats {
        print_stats(&collection.stats, format)?;
    }

    if SignalHandler::should_terminate() {
        let requests = ctrl_rx.try_iter().count();
        warn!(
            "Shutdown requested ({} signal(s)); skipping {} report(s)",
            requests,
            config.output.reports.len()
        );
        return Ok(termination_exit_code());
    }

    write_reports(&config.output.reports, &collection.records, &config.output.dir)?;

    Ok(ExitCode::Success)
}

fn print_stats(stats: &ProcessingStats, format: StatsFormat) -> Result<()> {
    match format {
        StatsFormat::Table => eprintln!("{}", stats.format_stats()),
        StatsFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&stats.to_json())?),
    }
    Ok(())
}

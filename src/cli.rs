// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::Parser;
use std::path::PathBuf;

use crate::report::ReportKind;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    Table,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportArg {
    Median,
    Min,
    Max,
}

impl From<ReportArg> for ReportKind {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Median => ReportKind::Median,
            ReportArg::Min => ReportKind::Min,
            ReportArg::Max => ReportKind::Max,
        }
    }
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "tickmerge")]
#[command(about = "Merge market-data CSV logs into one timeline and compute price reports")]
#[command(
    long_about = "Merge market-data CSV logs into one timeline and compute price reports\n\nInput files are split into chunks and parsed by a pool of worker threads.\nThe merged records are sorted by receive timestamp, then running median,\nminimum and maximum price reports are written to the output directory.\n\nCOMMON EXAMPLES:\n  tickmerge                         Use ./config.ini\n  tickmerge --cfg prod.ini -j 8\n  tickmerge day1_level.csv day1_trade.csv -o out --report median"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Input files (replaces directory discovery from the config file)
    pub files: Vec<PathBuf>,

    /// Configuration file (default: config.ini)
    #[arg(
        short = 'c',
        long = "config",
        visible_alias = "cfg",
        value_name = "PATH",
        help_heading = "Input Options"
    )]
    pub config: Option<PathBuf>,

    /// Output directory for reports (default: ./output)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help_heading = "Output Options"
    )]
    pub output: Option<PathBuf>,

    /// Reports to write
    #[arg(
        short = 'r',
        long = "report",
        value_enum,
        value_delimiter = ',',
        help_heading = "Output Options",
        conflicts_with = "no_report"
    )]
    pub reports: Vec<ReportArg>,

    /// Skip writing reports
    #[arg(long = "no-report", help_heading = "Output Options")]
    pub no_report: bool,

    /// Number of worker threads (0 = one per CPU, at least 2)
    #[arg(short = 'j', long = "threads", help_heading = "Performance Options")]
    pub threads: Option<usize>,

    /// Target chunk size in bytes
    #[arg(
        long = "chunk-size",
        value_name = "BYTES",
        value_parser = clap::value_parser!(u64).range(1..),
        help_heading = "Performance Options"
    )]
    pub chunk_size: Option<u64>,

    /// Print processing statistics to stderr. Use -s for default (table), or --stats=FORMAT for explicit format.
    #[arg(
        short = 's',
        long = "stats",
        value_enum,
        value_name = "FORMAT",
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = "table",
        help_heading = "Metrics and Stats"
    )]
    pub stats: Option<StatsFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Logging")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short = 'q', long = "quiet", help_heading = "Logging")]
    pub quiet: bool,
}

impl Cli {
    /// Reports selected on the command line, all of them when none were named
    pub fn selected_reports(&self) -> Vec<ReportKind> {
        if self.no_report {
            return Vec::new();
        }
        if self.reports.is_empty() {
            return ReportKind::ALL.to_vec();
        }
        let mut kinds: Vec<ReportKind> = Vec::new();
        for arg in &self.reports {
            let kind = ReportKind::from(*arg);
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

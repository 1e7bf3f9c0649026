use log::debug;
use std::path::{Path, PathBuf};

use crate::chunker::DEFAULT_CHUNK_SIZE;
use crate::cli::{Cli, StatsFormat};
use crate::config_file::{resolve_output_dir, ConfigFile, DEFAULT_CONFIG_PATH};
use crate::error::IngestError;
use crate::parallel::ParallelConfig;
use crate::report::ReportKind;

/// Main configuration struct for tickmerge
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub files: Vec<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub reports: Vec<ReportKind>,
    pub stats: Option<StatsFormat>,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// 0 selects the detected hardware parallelism
    pub threads: usize,
    pub chunk_size: usize,
}

impl AppConfig {
    /// Merge the command line with the configuration file.
    ///
    /// Positional files replace directory discovery, which makes the
    /// configuration file optional. Otherwise the file named by `--config`
    /// (or `config.ini`) must exist and name an input directory.
    pub fn from_cli(cli: &Cli) -> Result<Self, IngestError> {
        let file_config = load_file_config(cli)?;

        let files = if cli.files.is_empty() {
            file_config.discover_inputs()?
        } else {
            cli.files.clone()
        };

        let output_dir = cli.output.as_deref().or(file_config.output.as_deref());
        let dir = resolve_output_dir(output_dir)?;

        let chunk_size = cli
            .chunk_size
            .map(|size| usize::try_from(size).unwrap_or(usize::MAX))
            .or(file_config.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        Ok(Self {
            input: InputConfig { files },
            output: OutputConfig {
                dir,
                reports: cli.selected_reports(),
                stats: cli.stats,
            },
            performance: PerformanceConfig {
                threads: cli.threads.or(file_config.threads).unwrap_or(0),
                chunk_size,
            },
        })
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig::new(self.performance.threads, self.performance.chunk_size)
    }
}

fn load_file_config(cli: &Cli) -> Result<ConfigFile, IngestError> {
    if let Some(path) = &cli.config {
        debug!("loading configuration from {}", path.display());
        return ConfigFile::load_from_path(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if cli.files.is_empty() || default_path.is_file() {
        debug!("loading configuration from {}", default_path.display());
        return ConfigFile::load_from_path(default_path);
    }

    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tickmerge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_config_file_drives_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("x_trade.csv"), "").unwrap();
        fs::write(input.join("y_level.csv"), "").unwrap();

        let cfg = dir.path().join("run.ini");
        fs::write(
            &cfg,
            format!(
                "[main]\ninput = {}\noutput = {}\nfilename_mask = trade\n\n[performance]\nthreads = 3\nchunk_size = 512\n",
                input.display(),
                output.display()
            ),
        )
        .unwrap();

        let config = AppConfig::from_cli(&cli(&["--cfg", cfg.to_str().unwrap()])).unwrap();

        assert_eq!(config.input.files, vec![input.join("x_trade.csv")]);
        assert_eq!(config.output.dir, output);
        assert!(output.is_dir());
        assert_eq!(config.performance.threads, 3);
        assert_eq!(config.performance.chunk_size, 512);
        assert_eq!(config.output.reports, ReportKind::ALL.to_vec());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir(&input).unwrap();
        let cfg = dir.path().join("run.ini");
        fs::write(
            &cfg,
            format!(
                "[main]\ninput = {}\noutput = {}\n[performance]\nthreads = 3\n",
                input.display(),
                dir.path().join("cfg_out").display()
            ),
        )
        .unwrap();
        let out = dir.path().join("cli_out");

        let config = AppConfig::from_cli(&cli(&[
            "-c",
            cfg.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "-j",
            "1",
            "--chunk-size",
            "64",
            "a.csv",
        ]))
        .unwrap();

        assert_eq!(config.input.files, vec![PathBuf::from("a.csv")]);
        assert_eq!(config.output.dir, out);
        assert_eq!(config.performance.threads, 1);
        assert_eq!(config.performance.chunk_size, 64);
        assert_eq!(config.parallel_config().worker_count(), 1);
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ini");
        let result = AppConfig::from_cli(&cli(&[
            "--config",
            missing.to_str().unwrap(),
            "-o",
            dir.path().to_str().unwrap(),
            "a.csv",
        ]));
        assert!(matches!(result, Err(IngestError::Config(_))));
    }

    #[test]
    fn test_config_without_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("run.ini");
        fs::write(&cfg, "[performance]\nthreads = 2\n").unwrap();

        let result = AppConfig::from_cli(&cli(&["--cfg", cfg.to_str().unwrap()]));
        assert!(matches!(result, Err(IngestError::Config(_))));
    }
}

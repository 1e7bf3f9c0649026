use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IngestError;

/// Configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

/// Output directory used when the configuration names none
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Configuration file handler for tickmerge
///
/// ```ini
/// [main]
/// input = /data/logs
/// output = ./output
/// filename_mask = level trade
///
/// [performance]
/// threads = 8
/// chunk_size = 4096
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub filename_masks: Vec<String>,
    pub threads: Option<usize>,
    pub chunk_size: Option<usize>,
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, IngestError> {
    unquote(value).parse::<usize>().map_err(|_| {
        IngestError::config(format!(
            "invalid value for '{}': '{}' is not a non-negative integer",
            key, value
        ))
    })
}

impl ConfigFile {
    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, IngestError> {
        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_ini_content(&content)
    }

    /// Parse INI content from string
    pub fn parse_ini_content(content: &str) -> Result<Self, IngestError> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(IngestError::config(format!(
                    "malformed config line (expected key = value): '{}'",
                    line
                )));
            };
            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();

            match (current_section.as_str(), key) {
                ("main", "input") => config.input = Some(PathBuf::from(unquote(value))),
                ("main", "output") => {
                    let value = unquote(value);
                    if !value.is_empty() {
                        config.output = Some(PathBuf::from(value));
                    }
                }
                ("main", "filename_mask") => {
                    if value.starts_with('[') {
                        return Err(IngestError::config(format!(
                            "invalid filename_mask '{}': expected a space-separated list, not an array",
                            value
                        )));
                    }
                    config.filename_masks = shell_words::split(value).map_err(|e| {
                        IngestError::config(format!("invalid filename_mask '{}': {}", value, e))
                    })?;
                }
                ("performance", "threads") => {
                    config.threads = Some(parse_count(key, value)?);
                }
                ("performance", "chunk_size") => {
                    let size = parse_count(key, value)?;
                    if size == 0 {
                        return Err(IngestError::config("chunk_size must be greater than 0"));
                    }
                    config.chunk_size = Some(size);
                }
                (section, key) => {
                    debug!("ignoring unknown config key '{}' in [{}]", key, section);
                }
            }
        }

        Ok(config)
    }

    /// Resolve the configured input directory into the list of `.csv` files
    /// to ingest, filtered by the filename masks and sorted by path
    pub fn discover_inputs(&self) -> Result<Vec<PathBuf>, IngestError> {
        let dir = self
            .input
            .as_deref()
            .ok_or_else(|| IngestError::config("missing 'input' parameter in [main]"))?;

        if !dir.is_dir() {
            return Err(IngestError::config(format!(
                "invalid input directory path: {}",
                dir.display()
            )));
        }

        let pattern = format!(
            "{}/*.csv",
            glob::Pattern::escape(&dir.to_string_lossy())
        );
        let entries = glob::glob(&pattern).map_err(|e| {
            IngestError::config(format!("invalid input directory pattern '{}': {}", pattern, e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if self.matches_mask(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            warn!(
                "No CSV files matching the criteria found in: {}",
                dir.display()
            );
        }

        Ok(files)
    }

    fn matches_mask(&self, path: &Path) -> bool {
        if self.filename_masks.is_empty() {
            return true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.filename_masks
            .iter()
            .any(|mask| name.contains(mask.as_str()))
    }
}

/// Make sure the output directory exists, creating it when missing
pub fn resolve_output_dir(dir: Option<&Path>) -> Result<PathBuf, IngestError> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => {
            info!(
                "Output directory not specified. Using default: {}",
                DEFAULT_OUTPUT_DIR
            );
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        }
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| {
            IngestError::config(format!(
                "cannot create output directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        info!("Created output directory: {}", dir.display());
    }

    if !dir.is_dir() {
        return Err(IngestError::config(format!(
            "output path '{}' is not a directory",
            dir.display()
        )));
    }

    Ok(dir)
}

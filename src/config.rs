//! Runtime configuration
//!
//! Configuration lives in a plain `key=value` file at `~/.leadpipe/rc`.
//! Lines starting with `#` and blank lines are ignored, as are unknown keys.
//!
//! # Keys
//!
//! - `data.location` - path to the SQLite database (relative paths resolve
//!   against the directory holding the rc file)
//! - `operator` - agent id used as the acting operator for pipeline moves
//! - `quickselect.count` - default number of leads taken by quick select

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_QUICK_SELECT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
    pub operator: Option<i64>,
    pub quick_select_count: usize,
}

impl Config {
    /// Resolve the user's home directory
    pub fn home_dir() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
    }

    /// Directory holding the rc file and default database
    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(".leadpipe"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Defaults used when no rc file exists
    pub fn defaults() -> Result<Self> {
        Ok(Self {
            data_location: Self::config_dir()?.join("leads.db"),
            operator: None,
            quick_select_count: DEFAULT_QUICK_SELECT_COUNT,
        })
    }

    /// Load configuration from the rc file, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Self::defaults();
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents, &path)
    }

    /// Parse rc contents. `rc_path` anchors relative data locations.
    pub fn parse(contents: &str, rc_path: &Path) -> Result<Self> {
        let mut config = Self::defaults()?;
        let base_dir = rc_path.parent().map(Path::to_path_buf).unwrap_or_default();

        for (line_no, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line {}: {}", line_no + 1, line);
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        base_dir.join(path)
                    } else {
                        path
                    };
                }
                "operator" => {
                    let id = value.parse::<i64>()
                        .map_err(|_| anyhow!("Invalid operator in config: '{}'. Expected an agent ID.", value))?;
                    config.operator = Some(id);
                }
                "quickselect.count" => {
                    let count = value.parse::<usize>()
                        .map_err(|_| anyhow!("Invalid quickselect.count in config: '{}'", value))?;
                    config.quick_select_count = count;
                }
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }
}

use crate::color_utils;
use crate::model::DEFAULT_COLOR;
use anyhow::{Context, Result, bail};
use chrono::Weekday;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Overrides the data directory, e.g. to isolate tests or run a second profile.
pub const DATA_DIR_ENV: &str = "MONCAL_DATA_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week_start: WeekStart,
    pub default_color: String,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Sunday,
            default_color: DEFAULT_COLOR.to_string(),
            data_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "moncal", "moncal")
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|p| p.config_dir().join("config.toml"))
    }

    /// Reads the config file; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("Invalid config file {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(contents).context("Failed to parse config file")?;
        match color_utils::normalize_hex(&config.default_color) {
            Some(color) => config.default_color = color,
            None => bail!(
                "default_color '{}' is not a #rrggbb color",
                config.default_color
            ),
        }
        Ok(config)
    }

    /// `$MONCAL_DATA_DIR`, then `data_dir` from the file, then the platform data dir.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.is_empty()
        {
            return Some(PathBuf::from(dir));
        }
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|p| p.data_dir().to_path_buf()))
    }
}

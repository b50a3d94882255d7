use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use csv2geojson::{CoordinateColumns, MissPolicy};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub columns: CoordinateColumns,
    pub join: JoinConfig,
    pub layers: Vec<LayerConfig>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct JoinConfig {
    pub miss_policy: MissPolicy,
    pub parallel: bool,
    pub threads: Option<usize>,
    pub unmatched: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayerConfig {
    pub path: PathBuf,
    pub name_property: Option<String>,
    pub key: Option<String>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

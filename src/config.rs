use crate::error::{BattleError, Result};
use crate::weather::Weather;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_MAX_TURNS: u32 = 50;

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BattleOptions {
    #[serde(default)]
    pub weather: Weather,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default)]
    pub seed: u64,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            weather: Weather::None,
            max_turns: DEFAULT_MAX_TURNS,
            seed: 0,
        }
    }
}

impl BattleOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(BattleError::InvalidConfig("max_turns must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let options: BattleOptions = serde_json::from_str(raw).context("Failed to parse battle options")?;
        options.validate()?;
        Ok(options)
    }
}

pub fn load_options(path: &Path) -> anyhow::Result<BattleOptions> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file at {}", path.display()))?;
    BattleOptions::from_json_str(&raw).with_context(|| format!("Invalid options in {}", path.display()))
}

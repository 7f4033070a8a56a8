use std::{fs, path::Path};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{
    ecs::components::CombatStats,
    error::ConfigError,
    map::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH},
};

/// Tunables for a headless run. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub map_width: i32,
    pub map_height: i32,
    /// Fixed simulation rate; each tick advances `1 / ticks_per_second` seconds,
    /// rounded down to the nanosecond.
    pub ticks_per_second: u32,
    pub max_ticks: u64,
    pub monster_count: usize,
    pub player: CombatStats,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x51ec_5ead,
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            ticks_per_second: 10,
            max_ticks: 600,
            monster_count: 6,
            player: CombatStats::new(30, 5, 1),
        }
    }
}

impl SimConfig {
    pub const MIN_MAP_SIDE: i32 = 10;

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_second must be positive".to_string(),
            ));
        }
        if self.map_width < Self::MIN_MAP_SIDE || self.map_height < Self::MIN_MAP_SIDE {
            return Err(ConfigError::Invalid(format!(
                "map must be at least {0}x{0}, got {1}x{2}",
                Self::MIN_MAP_SIDE,
                self.map_width,
                self.map_height
            )));
        }
        if self.player.max_hp <= 0 || self.player.hp <= 0 {
            return Err(ConfigError::Invalid(
                "player must start with positive hp".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> TimeDelta {
        TimeDelta::nanoseconds(1_000_000_000 / i64::from(self.ticks_per_second.max(1)))
    }
}

// Configuration module for reading Hackman.toml
// All tunable constants of the decision engine live here

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::grid::HazardSource;
use crate::types::Position;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub search: SearchConfig,
    pub threats: ThreatConfig,
    pub traps: TrapConfig,
    pub scores: ScoresConfig,
    pub grid: GridConfig,
    pub debug: DebugConfig,
}

/// Search budgets
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Frontier depth used when there is nothing to path toward
    pub idle_horizon: usize,
    /// Weighted hazards an armed player may walk through
    pub weapon_tolerance: u32,
}

impl SearchConfig {
    /// Tolerance budget for a player with or without the weapon
    pub fn tolerance(&self, has_weapon: bool) -> u32 {
        if has_weapon {
            self.weapon_tolerance
        } else {
            0
        }
    }
}

/// Threat classification
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ThreatConfig {
    pub immediate_range: usize,
    pub nearby_max_intersections: usize,
}

/// Trap detection
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrapConfig {
    pub min_hazard_distance: usize,
    pub speculative_length: usize,
    pub speculative_intersections: usize,
    pub escape_moves: usize,
}

/// Move scoring
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoresConfig {
    pub hazard_decay: f64,
    pub intercept_boost: f64,
}

/// Map quirks
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GridConfig {
    /// Clusters of `[x, y]` cells
    pub hazard_sources: Vec<Vec<[i32; 2]>>,
}

impl GridConfig {
    pub fn hazard_sources(&self) -> Vec<HazardSource> {
        self.hazard_sources
            .iter()
            .map(|cluster| {
                HazardSource::new(cluster.iter().map(|&[x, y]| Position::new(x, y)).collect())
            })
            .collect()
    }
}

/// Turn log
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Hackman.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Hackman.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Hackman.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Hackman.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                idle_horizon: 8,
                weapon_tolerance: 1,
            },
            threats: ThreatConfig {
                immediate_range: 2,
                nearby_max_intersections: 2,
            },
            traps: TrapConfig {
                min_hazard_distance: 2,
                speculative_length: 10,
                speculative_intersections: 3,
                escape_moves: 3,
            },
            scores: ScoresConfig {
                hazard_decay: 0.9,
                intercept_boost: 1.5,
            },
            grid: GridConfig {
                hazard_sources: vec![
                    vec![[9, 6], [9, 7], [8, 7]],
                    vec![[10, 6], [10, 7], [11, 7]],
                ],
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "hackman_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Hackman.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

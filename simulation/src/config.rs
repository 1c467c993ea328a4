//! Simulation configuration loaded from TOML.
//!
//! Every field is optional in the file; missing values fall back to
//! [`SimulationConfig::default`].
//!
//! ```toml
//! width = 9
//! height = 6
//! seed = 42
//! agent_start = { x = 4, y = 3 }
//! ticks_per_move = 5
//! initial_vision = "omniscient"
//! ```

use std::{fs, path::Path};

use roomba_core::{TileCoord, VisionMode};
use roomba_world::MIN_DIMENSION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable parameters of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of tile columns.
    pub width: u32,
    /// Number of tile rows.
    pub height: u32,
    /// Seed for every random stream (walls, debris, tour swaps, bump turns, failures).
    pub seed: u64,
    /// Tile the agent starts on.
    pub agent_start: TileCoord,
    /// Ticks between two autonomous moves.
    pub ticks_per_move: u32,
    /// Chance that a tile holds debris after randomization.
    pub debris_probability: f64,
    /// Chance that a move re-deposits debris on the vacated tile in failure mode.
    pub failure_probability: f64,
    /// Sensing radius of the limited-vision policy, in steps.
    pub vision_radius: u32,
    /// Tour improvement iterations per debris tile.
    pub tour_iterations_per_stop: u32,
    /// Attempts to draw a non-degenerate 2-opt swap.
    pub swap_retries: u32,
    /// Sensing policy at start-up.
    pub initial_vision: VisionMode,
    /// Whether the agent starts moving immediately.
    pub start_active: bool,
    /// Whether walls are randomized before the first tick.
    pub randomize_walls_on_start: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 8,
            seed: 0,
            agent_start: TileCoord::new(0, 0),
            ticks_per_move: 20,
            debris_probability: 0.1,
            failure_probability: 0.1,
            vision_radius: 2,
            tour_iterations_per_stop: 10,
            swap_retries: 10,
            initial_vision: VisionMode::BumpSensor,
            start_active: false,
            randomize_walls_on_start: false,
        }
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML could not be parsed.
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid is too small to hold its boundary walls.
    #[error("grid must be at least {min}x{min}, got {width}x{height}", min = MIN_DIMENSION)]
    InvalidDimensions {
        /// Configured number of columns.
        width: u32,
        /// Configured number of rows.
        height: u32,
    },
    /// The agent would start outside the grid.
    #[error("agent start ({}, {}) lies outside the grid", .0.x(), .0.y())]
    AgentOutOfBounds(TileCoord),
    /// A probability field lies outside `0.0..=1.0`.
    #[error("{field} must lie in 0.0..=1.0, got {value}")]
    InvalidProbability {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks dimensions, agent placement and probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_DIMENSION || self.height < MIN_DIMENSION {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.agent_start.x() >= self.width || self.agent_start.y() >= self.height {
            return Err(ConfigError::AgentOutOfBounds(self.agent_start));
        }
        for (field, value) in [
            ("debris_probability", self.debris_probability),
            ("failure_probability", self.failure_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::from_toml_str("").expect("config");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
width = 9
height = 6
agent_start = { x = 4, y = 3 }
initial_vision = "omniscient"
"#,
        )
        .expect("config");
        assert_eq!((config.width, config.height), (9, 6));
        assert_eq!(config.agent_start, TileCoord::new(4, 3));
        assert_eq!(config.initial_vision, VisionMode::Omniscient);
        assert_eq!(config.ticks_per_move, 20);
        assert_eq!(config.vision_radius, 2);
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        let error = SimulationConfig::from_toml_str("width = 1").expect_err("too narrow");
        assert!(matches!(
            error,
            ConfigError::InvalidDimensions {
                width: 1,
                height: 8
            }
        ));
    }

    #[test]
    fn agent_outside_grid_is_rejected() {
        let error = SimulationConfig::from_toml_str("agent_start = { x = 7, y = 0 }")
            .expect_err("outside");
        assert!(matches!(error, ConfigError::AgentOutOfBounds(_)));
    }

    #[test]
    fn probabilities_are_checked() {
        let error =
            SimulationConfig::from_toml_str("failure_probability = 1.5").expect_err("probability");
        assert!(matches!(
            error,
            ConfigError::InvalidProbability {
                field: "failure_probability",
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let error = SimulationConfig::from_toml_str("colour = 3").expect_err("unknown");
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}

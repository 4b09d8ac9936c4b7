//! Configuration system
//!
//! Settings load from TOML or RON files, chosen by extension, and every
//! section falls back to its defaults when omitted.

use crate::foundation::math::Vec3;
use crate::physics::character::CharacterTuning;
use crate::spatial::OctreeConfig;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// has an extension other than `.toml` or `.ron`.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when serialization or the write fails, or
    /// the extension is unsupported.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level settings for a simulation world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,

    /// Half extent of the cubic octree region centered on the origin
    pub world_half_extent: f32,

    /// Where the character starts
    pub spawn_position: Vec3,

    /// Spatial index behavior
    pub octree: OctreeConfig,

    /// Character movement constants
    pub character: CharacterTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            world_half_extent: 65536.0,
            spawn_position: Vec3::new(0.0, 2.0, 0.0),
            octree: OctreeConfig::default(),
            character: CharacterTuning::default(),
        }
    }
}

impl Config for SimulationConfig {}

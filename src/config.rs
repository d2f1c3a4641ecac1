//! Application configuration management.
//!
//! Stores the track catalog and the rendering/playback preferences in the
//! user's config directory (typically ~/.config/wavebars/config.toml). A
//! missing file means defaults with an empty catalog.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::catalog::TrackSpec;
use crate::constants::DEFAULT_BLOCK_COUNT;

/// Keys accepted by [`Config::set_value`]
pub const SETTABLE_KEYS: &[&str] = &["block_count", "bar_spacing", "gain", "loop_tracks"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_block_count")]
    pub block_count: usize,
    #[serde(default = "default_bar_spacing")]
    pub bar_spacing: u16,
    #[serde(default = "default_gain")]
    pub gain: f32,
    #[serde(default = "default_loop_tracks")]
    pub loop_tracks: bool,
    #[serde(default)]
    pub tracks: Vec<TrackSpec>,
}

fn default_block_count() -> usize {
    DEFAULT_BLOCK_COUNT
}

fn default_bar_spacing() -> u16 {
    1
}

fn default_gain() -> f32 {
    1.0
}

fn default_loop_tracks() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            block_count: default_block_count(),
            bar_spacing: default_bar_spacing(),
            gain: default_gain(),
            loop_tracks: default_loop_tracks(),
            tracks: Vec::new(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // XDG_CONFIG_HOME wins so tests can point at a temp dir
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("wavebars")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("wavebars")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.block_count == 0 {
            return Err("block_count must be at least 1".into());
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err("gain must be a non-negative number".into());
        }
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "block_count" => {
                let count = value
                    .parse::<usize>()
                    .map_err(|_| "Value must be a positive integer")?;
                if count == 0 {
                    return Err("block_count must be at least 1".into());
                }
                self.block_count = count;
            }
            "bar_spacing" => {
                self.bar_spacing = value
                    .parse::<u16>()
                    .map_err(|_| "Value must be a non-negative integer")?;
            }
            "gain" => {
                let gain = value
                    .parse::<f32>()
                    .map_err(|_| "Value must be a number")?;
                if !gain.is_finite() || gain < 0.0 {
                    return Err("gain must be a non-negative number".into());
                }
                self.gain = gain;
            }
            "loop_tracks" => {
                self.loop_tracks = value
                    .parse::<bool>()
                    .map_err(|_| "Value must be 'true' or 'false'")?;
            }
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }

    /// Append a catalog entry; ids must stay unique.
    pub fn add_track(&mut self, id: &str, source: &str) -> Result<(), Box<dyn Error>> {
        if id.trim().is_empty() {
            return Err("Track id cannot be empty".into());
        }
        if self.tracks.iter().any(|t| t.id == id) {
            return Err(format!("A track with id '{id}' already exists").into());
        }
        self.tracks.push(TrackSpec::new(id, source));
        Ok(())
    }
}

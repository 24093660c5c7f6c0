//! Map configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use crate::consts::{BASE_GRID_SIZE, CHUNK_SIZE, DRAG_THRESHOLD_PX, REVEAL_WARN_CHUNKS, ZOOM_STEP};

pub const ENV_CHUNK_SIZE: &str = "STELLAR_MAP_CHUNK_SIZE";
pub const ENV_BASE_GRID_SIZE: &str = "STELLAR_MAP_BASE_GRID_SIZE";
pub const ENV_REVEAL_WARN_CHUNKS: &str = "STELLAR_MAP_REVEAL_WARN_CHUNKS";
pub const ENV_DRAG_THRESHOLD_PX: &str = "STELLAR_MAP_DRAG_THRESHOLD_PX";
pub const ENV_ZOOM_STEP: &str = "STELLAR_MAP_ZOOM_STEP";
pub const ENV_STATISTICS: &str = "STELLAR_MAP_STATISTICS";

/// Errors produced while loading [`MapConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed as the expected type.
    #[error("config parse failed: {key}={value:?}")]
    Parse { key: &'static str, value: String },

    /// A variable parsed but its value is out of range.
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Tuning knobs for the map controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Edge length of a generation chunk in world units.
    pub chunk_size: f64,
    /// World-space grid spacing; also sets the zoom-1.0 projection scale.
    pub base_grid_size: f64,
    /// Reveal neighborhoods above this many chunks log a performance warning.
    pub reveal_warn_chunks: usize,
    /// Screen pixels of pointer travel before a press becomes a pan.
    pub drag_threshold_px: f64,
    /// Multiplicative zoom step.
    pub zoom_step: f64,
    /// Whether view statistics are recomputed as chunks are revealed.
    pub statistics_enabled: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            base_grid_size: BASE_GRID_SIZE,
            reveal_warn_chunks: REVEAL_WARN_CHUNKS,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            zoom_step: ZOOM_STEP,
            statistics_enabled: true,
        }
    }
}

impl MapConfig {
    /// Build typed map config from environment variables.
    ///
    /// All optional; unset variables fall back to the defaults:
    /// - `STELLAR_MAP_CHUNK_SIZE`: default 1000.0
    /// - `STELLAR_MAP_BASE_GRID_SIZE`: default 1000.0
    /// - `STELLAR_MAP_REVEAL_WARN_CHUNKS`: default 1000
    /// - `STELLAR_MAP_DRAG_THRESHOLD_PX`: default 3.0
    /// - `STELLAR_MAP_ZOOM_STEP`: default 1.5
    /// - `STELLAR_MAP_STATISTICS`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable or out-of-range value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Some(v),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`MapConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            chunk_size: parse_var(&lookup, ENV_CHUNK_SIZE, defaults.chunk_size)?,
            base_grid_size: parse_var(&lookup, ENV_BASE_GRID_SIZE, defaults.base_grid_size)?,
            reveal_warn_chunks: parse_var(&lookup, ENV_REVEAL_WARN_CHUNKS, defaults.reveal_warn_chunks)?,
            drag_threshold_px: parse_var(&lookup, ENV_DRAG_THRESHOLD_PX, defaults.drag_threshold_px)?,
            zoom_step: parse_var(&lookup, ENV_ZOOM_STEP, defaults.zoom_step)?,
            statistics_enabled: parse_flag(&lookup, ENV_STATISTICS, defaults.statistics_enabled)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(ENV_CHUNK_SIZE, self.chunk_size)?;
        require_positive(ENV_BASE_GRID_SIZE, self.base_grid_size)?;
        if !(self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0) {
            return Err(ConfigError::Invalid {
                key: ENV_DRAG_THRESHOLD_PX,
                reason: format!("must be a non-negative number, got {}", self.drag_threshold_px),
            });
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid {
                key: ENV_ZOOM_STEP,
                reason: format!("must be greater than 1.0, got {}", self.zoom_step),
            });
        }
        Ok(())
    }

    /// World-space area of one chunk.
    #[must_use]
    pub fn chunk_area(&self) -> f64 {
        self.chunk_size * self.chunk_size
    }
}

fn require_positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { key, reason: format!("must be a positive number, got {value}") })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.trim().parse::<T>().map_err(|_| ConfigError::Parse { key, value: raw })
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::Parse { key, value: raw }),
    }
}

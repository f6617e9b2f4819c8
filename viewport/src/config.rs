//! Engine configuration.
//!
//! Every knob has a default matching the stock animation, so a host can pass
//! `{}` or nothing at all. Values come either from a JSON document handed over
//! by the host page ([`EngineConfig::from_json`]) or from `VIEWPORT_*`
//! environment variables ([`EngineConfig::from_env`]) for native runs.
//! Unparseable env values fall back to the default, then the whole config is
//! validated.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    AMBIENT_INTERVAL_MS, AMBIENT_PROBABILITY, CHECKPOINT_INTERVAL_MS, CHECKPOINT_PROBABILITY, DEFAULT_SEED,
    DRAG_MARGIN, FLOW_LIFETIME_MS,
};

/// Error returned by [`EngineConfig::from_json`] and [`EngineConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has wrongly typed fields.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A numeric field is outside its allowed range.
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Inset added to an entity's radius when clamping drags.
    pub drag_margin: f64,
    /// Wall-clock lifetime of a flow.
    pub flow_lifetime_ms: f64,
    /// Period of the ambient flow emitter.
    pub ambient_interval_ms: f64,
    /// Chance an ambient firing emits.
    pub ambient_probability: f64,
    /// Period of the checkpoint emitter.
    pub checkpoint_interval_ms: f64,
    /// Chance a checkpoint firing emits while training.
    pub checkpoint_probability: f64,
    /// Initial global speed multiplier.
    pub speed: f64,
    /// Seed for the engine's random source.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_margin: DRAG_MARGIN,
            flow_lifetime_ms: FLOW_LIFETIME_MS,
            ambient_interval_ms: AMBIENT_INTERVAL_MS,
            ambient_probability: AMBIENT_PROBABILITY,
            checkpoint_interval_ms: CHECKPOINT_INTERVAL_MS,
            checkpoint_probability: CHECKPOINT_PROBABILITY,
            speed: 1.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::OutOfRange`] for invalid values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from `VIEWPORT_*` environment variables.
    ///
    /// Optional:
    /// - `VIEWPORT_DRAG_MARGIN`: default 15
    /// - `VIEWPORT_FLOW_LIFETIME_MS`: default 8000
    /// - `VIEWPORT_AMBIENT_INTERVAL_MS`: default 1800
    /// - `VIEWPORT_AMBIENT_PROBABILITY`: default 0.6
    /// - `VIEWPORT_CHECKPOINT_INTERVAL_MS`: default 5000
    /// - `VIEWPORT_CHECKPOINT_PROBABILITY`: default 0.3
    /// - `VIEWPORT_SPEED`: default 1
    /// - `VIEWPORT_SEED`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] if a parsed value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary key lookup using the `VIEWPORT_*` names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] if a parsed value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            drag_margin: parse_or(&lookup, "VIEWPORT_DRAG_MARGIN", defaults.drag_margin),
            flow_lifetime_ms: parse_or(&lookup, "VIEWPORT_FLOW_LIFETIME_MS", defaults.flow_lifetime_ms),
            ambient_interval_ms: parse_or(&lookup, "VIEWPORT_AMBIENT_INTERVAL_MS", defaults.ambient_interval_ms),
            ambient_probability: parse_or(&lookup, "VIEWPORT_AMBIENT_PROBABILITY", defaults.ambient_probability),
            checkpoint_interval_ms: parse_or(&lookup, "VIEWPORT_CHECKPOINT_INTERVAL_MS", defaults.checkpoint_interval_ms),
            checkpoint_probability: parse_or(
                &lookup,
                "VIEWPORT_CHECKPOINT_PROBABILITY",
                defaults.checkpoint_probability,
            ),
            speed: parse_or(&lookup, "VIEWPORT_SPEED", defaults.speed),
            seed: parse_or(&lookup, "VIEWPORT_SEED", defaults.seed),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("drag_margin", self.drag_margin)?;
        positive("flow_lifetime_ms", self.flow_lifetime_ms)?;
        positive("ambient_interval_ms", self.ambient_interval_ms)?;
        probability("ambient_probability", self.ambient_probability)?;
        positive("checkpoint_interval_ms", self.checkpoint_interval_ms)?;
        probability("checkpoint_probability", self.checkpoint_probability)?;
        non_negative("speed", self.speed)?;
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or(default),
        None => default,
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::OutOfRange { field, expected: "a finite value >= 0", value })
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(ConfigError::OutOfRange { field, expected: "a finite value > 0", value })
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfRange { field, expected: "within [0, 1]", value })
}

//! Configuration management for firstaid.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::narration::Voice;
use crate::telephony::{default_contacts, is_valid_phone_number, Contact, DEFAULT_EMERGENCY_NUMBER};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "firstaid";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "FIRSTAID_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FIRSTAID_`, sections separated
///    by `__`, e.g. `FIRSTAID_EMERGENCY__CALL_TIMEOUT_SECS=30`)
/// 2. TOML config file at `~/.config/firstaid/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emergency calling configuration.
    pub emergency: EmergencyConfig,
    /// Spoken narration configuration.
    pub narration: NarrationConfig,
}

/// Emergency calling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Number dialed by the emergency button and every fallback.
    pub number: String,
    /// How long to wait for the platform dialer, in seconds.
    pub call_timeout_secs: u64,
    /// Named contacts offered by `firstaid contacts` and `firstaid call`.
    pub contacts: Vec<Contact>,
}

/// Narration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Whether steps are read aloud when a session starts.
    pub enabled: bool,
    /// Voice language tag.
    pub language: String,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Rate multiplier.
    pub rate: f32,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            number: DEFAULT_EMERGENCY_NUMBER.to_string(),
            call_timeout_secs: 10,
            contacts: default_contacts(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        let voice = Voice::default();
        Self {
            enabled: true,
            language: voice.language,
            pitch: voice.pitch,
            rate: voice.rate,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to the defaults when it is broken.
    ///
    /// Emergency features must work even with a bad config file, so any
    /// load or validation error is logged and the defaults are used.
    #[must_use]
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load_from(config_path).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring configuration, using defaults");
            Self::default()
        })
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_phone_number(&self.emergency.number) {
            return Err(Error::config_validation(format!(
                "emergency number '{}' is not a valid phone number",
                self.emergency.number
            )));
        }

        if self.emergency.call_timeout_secs == 0 {
            return Err(Error::config_validation(
                "call_timeout_secs must be greater than 0",
            ));
        }

        let mut ids = HashSet::new();
        for contact in &self.emergency.contacts {
            if contact.id.trim().is_empty() {
                return Err(Error::config_validation("contact id cannot be empty"));
            }
            if !ids.insert(contact.id.to_ascii_lowercase()) {
                return Err(Error::config_validation(format!(
                    "duplicate contact id '{}'",
                    contact.id
                )));
            }
            if !is_valid_phone_number(&contact.number) {
                return Err(Error::config_validation(format!(
                    "contact '{}' has invalid number '{}'",
                    contact.id, contact.number
                )));
            }
        }

        if self.narration.language.trim().is_empty() {
            return Err(Error::config_validation("narration language cannot be empty"));
        }
        for (name, value) in [("pitch", self.narration.pitch), ("rate", self.narration.rate)] {
            if !(value > 0.0 && value <= 2.0) {
                return Err(Error::config_validation(format!(
                    "narration {name} must be in (0, 2], got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Get the dial timeout as a Duration.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.emergency.call_timeout_secs)
    }

    /// The configured default voice.
    #[must_use]
    pub fn voice(&self) -> Voice {
        Voice {
            language: self.narration.language.clone(),
            pitch: self.narration.pitch,
            rate: self.narration.rate,
        }
    }
}

// src/config.rs

//! Configuration loading utilities.
//!
//! Convenience functions for turning the TOML configuration and the
//! environment into the values a run needs.

use std::path::Path;

use crate::error::Result;
use crate::models::{Config, Credentials};

/// Use a loaded configuration, or defaults when loading failed.
pub fn config_or_default(path: &Path, loaded: Result<Config>) -> Config {
    match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Failed to load config from {}: {}", path.display(), e);
            log::warn!("Using default configuration.");
            Config::default()
        }
    }
}

/// Validate the configuration and read tokens from the environment.
pub fn load_all(config: Config) -> Result<(Config, Credentials)> {
    config.validate()?;

    let credentials = Credentials::from_env();
    if !credentials.any() {
        log::warn!("No platform tokens found in the environment");
    }

    Ok((config, credentials))
}

//! Environment configuration
//!
//! Reads the versioning settings from `APIVER_*` variables, optionally seeded
//! from a `.env` file:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `APIVER_BASE` | `base` |
//! | `APIVER_HEADER` | `header` |
//! | `APIVER_URL` | `url` |
//! | `APIVER_LAST_SUPPORTED_VERSION` | `last_supported_version` |
//! | `APIVER_LATEST_VERSION` | `latest_version` |
//!
//! # Example
//!
//! ```ignore
//! use apiver::config::{load_dotenv, VersioningSettings};
//! use apiver::VersioningConfig;
//!
//! load_dotenv();
//! let settings = VersioningSettings::from_env()?;
//! let config = VersioningConfig::from_settings(settings)
//!     .route("test", handler);
//! ```

use crate::error::Result;
use crate::register::VersioningConfig;
use serde::Deserialize;

/// Prefix of every environment variable read here
pub const ENV_PREFIX: &str = "APIVER_";

/// Versioning settings as read from the environment
///
/// Every field is optional at this stage; [`with_versioning`](crate::with_versioning)
/// reports the required ones that are missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersioningSettings {
    pub base: Option<String>,
    pub header: Option<String>,
    pub url: Option<String>,
    pub last_supported_version: Option<String>,
    pub latest_version: Option<String>,
}

impl VersioningSettings {
    /// Read the settings from the process environment
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .map_err(Into::into)
    }

    /// Read the settings from `(key, value)` pairs instead of the environment
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)
            .map_err(Into::into)
    }
}

impl VersioningConfig {
    /// Start a config from environment settings; routes still need adding
    pub fn from_settings(settings: VersioningSettings) -> Self {
        Self {
            routes: None,
            base: settings.base,
            header: settings.header,
            url: settings.url,
            last_supported_version: settings.last_supported_version,
            latest_version: settings.latest_version,
        }
    }
}

/// Load variables from a `.env` file in the current directory
///
/// A missing file is not an error, and variables already set are kept.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_settings_from_vars() {
        let settings = VersioningSettings::from_vars(vars(&[
            ("APIVER_BASE", "/api"),
            ("APIVER_HEADER", "x-api-version"),
            ("APIVER_URL", "version"),
            ("APIVER_LAST_SUPPORTED_VERSION", "v1"),
            ("APIVER_LATEST_VERSION", "v3"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();

        assert_eq!(settings.base.as_deref(), Some("/api"));
        assert_eq!(settings.header.as_deref(), Some("x-api-version"));
        assert_eq!(settings.url.as_deref(), Some("version"));
        assert_eq!(settings.last_supported_version.as_deref(), Some("v1"));
        assert_eq!(settings.latest_version.as_deref(), Some("v3"));
    }

    #[test]
    fn test_missing_vars_are_none() {
        let settings = VersioningSettings::from_vars(vars(&[("APIVER_BASE", "/api")])).unwrap();

        assert_eq!(
            settings,
            VersioningSettings {
                base: Some("/api".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_envy_error_is_kept_as_source() {
        use crate::error::VersioningError;
        use std::error::Error as _;

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Required {
            base: String,
        }

        let envy_err = envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Required>(Vec::new())
            .unwrap_err();
        let err = VersioningError::from(envy_err);

        assert!(matches!(err, VersioningError::Config(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = VersioningSettings {
            base: Some("/api".to_string()),
            url: Some("version".to_string()),
            last_supported_version: Some("v1".to_string()),
            latest_version: Some("v2".to_string()),
            ..Default::default()
        };
        let config = VersioningConfig::from_settings(settings);

        assert!(config.routes.is_none());
        assert!(config.header.is_none());
        assert_eq!(config.base.as_deref(), Some("/api"));
        assert_eq!(config.latest_version.as_deref(), Some("v2"));
    }
}

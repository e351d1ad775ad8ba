//! Supported version range
//!
//! A [`VersionRegistry`] holds the inclusive range of versions the API
//! currently serves. Handles are cheap to clone and share one range, so the
//! registry configured at startup is the one every middleware reads.
//!
//! [`VersionRegistry::set_supported_versions`] is the only writer. Readers
//! take a snapshot; a reconfiguration while requests are in flight is seen by
//! later reads, with no isolation between requests.

use crate::error::{Result, VersioningError};
use crate::version::{version_number, VersionToken};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Inclusive range of supported versions
///
/// Both bounds are `None` until the range is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedVersions {
    /// Last (oldest) supported version
    pub from: Option<VersionToken>,
    /// Latest supported version
    pub to: Option<VersionToken>,
}

/// Shared handle to the supported version range
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    range: Arc<RwLock<SupportedVersions>>,
}

impl VersionRegistry {
    /// Create a registry with no range configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry serving `from..=to`
    pub fn with_range(from: &str, to: &str) -> Result<Self> {
        let registry = Self::new();
        registry.set_supported_versions(from, to)?;
        Ok(registry)
    }

    /// Replace the supported range
    ///
    /// `from` is expected to be at or below `to`; this is not checked.
    ///
    /// # Errors
    ///
    /// [`VersioningError::InvalidArgument`] if either bound is empty.
    pub fn set_supported_versions(&self, from: &str, to: &str) -> Result<()> {
        if from.is_empty() || to.is_empty() {
            return Err(VersioningError::invalid_argument(
                "set_supported_versions requires a non-empty `from` and `to`",
            ));
        }
        let range = SupportedVersions {
            from: Some(VersionToken::new(from)?),
            to: Some(VersionToken::new(to)?),
        };

        tracing::debug!(from = %from, to = %to, "supported API versions set");
        *self.range.write().unwrap_or_else(|e| e.into_inner()) = range;
        Ok(())
    }

    /// Snapshot of the current range
    pub fn supported_versions(&self) -> SupportedVersions {
        self.range.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The latest supported version, if configured
    pub fn latest(&self) -> Option<VersionToken> {
        self.supported_versions().to
    }

    /// Check whether `token` lies inside the supported range
    ///
    /// Comparison is by ordinal, so `v15` is above `v2`. Malformed tokens are
    /// never active.
    ///
    /// # Errors
    ///
    /// [`VersioningError::InvalidArgument`] if `token` is empty or the range
    /// has not been configured.
    pub fn is_version_active(&self, token: &str) -> Result<bool> {
        let requested = version_number(token)?;
        let SupportedVersions { from, to } = self.supported_versions();
        let (Some(from), Some(to)) = (from, to) else {
            return Err(VersioningError::invalid_argument(
                "supported versions have not been configured",
            ));
        };

        Ok(requested >= from.number() && requested <= to.number())
    }
}

//! # apiver
//!
//! API version negotiation for HTTP routers.
//!
//! A request names the version it wants in a header or a URL segment.
//! Middleware checks it against the supported range, falls back to the latest
//! version when none is given and answers `400` for anything outside the
//! range. Controllers wrapped with [`controller_with_versioning`] then run the
//! implementation matching the resolved version, so handlers never branch on
//! the version themselves.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apiver::{controller_with_versioning, with_versioning, ControllerSpec, VersionMap, VersioningConfig};
//! use apiver_core::{handler_fn, Router};
//! use http::StatusCode;
//!
//! let latest = ControllerSpec::new().operation("show", handler_fn(|_req| async { StatusCode::OK }));
//! let mut versions = VersionMap::new();
//! versions.insert(
//!     "v1".into(),
//!     ControllerSpec::new().operation("show", handler_fn(|_req| async { StatusCode::CREATED })),
//! );
//! let controller = controller_with_versioning(Some(latest), Some(versions))?;
//!
//! let show = controller.operation("show").unwrap();
//! let mut router = Router::new();
//! with_versioning(
//!     &mut router,
//!     VersioningConfig::new()
//!         .base("/api")
//!         .header("x-api-version")
//!         .url("version")
//!         .route("test", show)
//!         .last_supported_version("v1")
//!         .latest_version("v2"),
//! )?;
//!
//! // GET /api/test                        -> v2 (latest)
//! // GET /api/test   x-api-version: v1    -> v1
//! // GET /api/v1/test                     -> v1
//! // GET /api/v8/test                     -> 400
//! ```
//!
//! ## Optional Features
//!
//! - `config` - read the versioning settings from `APIVER_*` environment
//!   variables and `.env` files

mod chain;
mod controller;
mod dispatch;
mod error;
mod register;
mod registry;
mod resolve;
mod version;

#[cfg(feature = "config")]
pub mod config;

#[cfg(test)]
mod tests;

// Public API
pub use chain::{DelegationChain, Fallback, VersionMap};
pub use controller::{Controller, ControllerSpec};
pub use dispatch::{controller_with_versioning, VersionedController};
pub use error::{Result, VersioningError};
pub use register::{with_versioning, RouteEntry, VersioningConfig};
pub use registry::{SupportedVersions, VersionRegistry};
pub use resolve::{
    unsupported_version_response, ResolveVersionLayer, Resolution, ResolvedVersion,
    VersionSource, UNSUPPORTED_VERSION_MESSAGE,
};
pub use version::{version_number, VersionNumber, VersionToken, VERSION_MARKER};

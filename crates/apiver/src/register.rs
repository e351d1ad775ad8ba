//! Route registration
//!
//! [`with_versioning`] mounts every configured route twice on the host
//! router, once per version source:
//!
//! | Source | Prefix | Middleware |
//! |--------|--------|------------|
//! | header | `{base}/{route}/` | [`ResolveVersionLayer::header`] |
//! | url | `{base}/:{url}/{route}/` | [`ResolveVersionLayer::url`] |
//!
//! For each route the header mount is registered first.

use crate::error::{Result, VersioningError};
use crate::registry::VersionRegistry;
use crate::resolve::ResolveVersionLayer;
use apiver_core::{BoxedHandler, Mount};
use std::fmt;

/// A named route and the handler serving it
#[derive(Clone)]
pub struct RouteEntry {
    pub name: String,
    pub handler: BoxedHandler,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry").field("name", &self.name).finish()
    }
}

/// Settings for [`with_versioning`]
///
/// `routes`, `base`, `last_supported_version` and `latest_version` are
/// required; `header` and `url` each enable one version source.
///
/// # Example
///
/// ```rust,ignore
/// use apiver::VersioningConfig;
/// use apiver_core::handler_fn;
///
/// let config = VersioningConfig::new()
///     .base("/api")
///     .header("x-api-version")
///     .url("version")
///     .route("test", handler_fn(|_req| async { "ok" }))
///     .last_supported_version("v1")
///     .latest_version("v2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersioningConfig {
    pub routes: Option<Vec<RouteEntry>>,
    pub base: Option<String>,
    pub header: Option<String>,
    pub url: Option<String>,
    pub last_supported_version: Option<String>,
    pub latest_version: Option<String>,
}

impl VersioningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; routes are mounted in the order added
    pub fn route(mut self, name: impl Into<String>, handler: BoxedHandler) -> Self {
        self.routes.get_or_insert_with(Vec::new).push(RouteEntry {
            name: name.into(),
            handler,
        });
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Resolve versions from this header
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Resolve versions from this URL segment
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn last_supported_version(mut self, version: impl Into<String>) -> Self {
        self.last_supported_version = Some(version.into());
        self
    }

    pub fn latest_version(mut self, version: impl Into<String>) -> Self {
        self.latest_version = Some(version.into());
        self
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(VersioningError::invalid_argument(format!(
            "with_versioning requires `{}`",
            field
        ))),
    }
}

fn enabled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Configure the supported range and mount every route on `app`
///
/// Returns the [`VersionRegistry`] shared by the mounted middleware; it can be
/// used to change the supported range later.
///
/// # Errors
///
/// - [`VersioningError::InvalidArgument`] if `routes`, `base`,
///   `last_supported_version` or `latest_version` is missing, or a source
///   name is invalid
/// - [`VersioningError::Mount`] if the host router rejects a prefix
pub fn with_versioning<A>(app: &mut A, config: VersioningConfig) -> Result<VersionRegistry>
where
    A: Mount + ?Sized,
{
    let routes = config
        .routes
        .as_ref()
        .ok_or_else(|| VersioningError::invalid_argument("with_versioning requires `routes`"))?;
    let base = required(&config.base, "base")?.trim_end_matches('/');
    let from = required(&config.last_supported_version, "last_supported_version")?;
    let to = required(&config.latest_version, "latest_version")?;

    let registry = VersionRegistry::with_range(from, to)?;
    let header_layer = enabled(&config.header)
        .map(|name| ResolveVersionLayer::header(name, registry.clone()))
        .transpose()?;
    let url_layer = match enabled(&config.url) {
        Some(name) => Some((name, ResolveVersionLayer::url(name, registry.clone())?)),
        None => None,
    };

    for route in routes {
        if let Some(layer) = &header_layer {
            let prefix = format!("{}/{}/", base, route.name);
            app.mount(&prefix, Box::new(layer.clone()), route.handler.clone())?;
            tracing::debug!(route = %route.name, prefix = %prefix, "mounted header-versioned route");
        }
        if let Some((param, layer)) = &url_layer {
            let prefix = format!("{}/:{}/{}/", base, param, route.name);
            app.mount(&prefix, Box::new(layer.clone()), route.handler.clone())?;
            tracing::debug!(route = %route.name, prefix = %prefix, "mounted url-versioned route");
        }
    }

    tracing::info!(
        routes = routes.len(),
        from = %from,
        to = %to,
        "API versioning enabled"
    );
    Ok(registry)
}

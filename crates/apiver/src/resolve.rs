//! Version resolution middleware
//!
//! [`ResolveVersionLayer`] reads the requested version from a header or a URL
//! path parameter, checks it against the [`VersionRegistry`] and stores the
//! outcome as a [`ResolvedVersion`] request extension:
//!
//! | Request carries | Outcome |
//! |-----------------|---------|
//! | nothing (or an empty value) | latest supported version, request proceeds |
//! | a supported version | that version, request proceeds |
//! | anything else | `400 {"message": "Requested API version is not supported"}` |
//!
//! With no range configured, a request without a version proceeds with no
//! [`ResolvedVersion`] attached, and one naming a version gets a 500.

use crate::error::{Result, VersioningError};
use crate::registry::VersionRegistry;
use crate::version::VersionToken;
use apiver_core::{
    ApiError, BoxedNext, IntoResponse, Json, MiddlewareLayer, Request, Response, ResponseFuture,
};
use http::{HeaderName, StatusCode};
use serde::Serialize;
use std::fmt;

/// Message sent with the 400 response for an unsupported version
pub const UNSUPPORTED_VERSION_MESSAGE: &str = "Requested API version is not supported";

/// The API version selected for a request
///
/// Inserted into the request extensions by [`ResolveVersionLayer`] before the
/// handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedVersion(VersionToken);

impl ResolvedVersion {
    /// Wrap a version token
    pub fn new(token: VersionToken) -> Self {
        Self(token)
    }

    /// The resolved version of `req`, if resolution ran
    pub fn of(req: &Request) -> Option<&ResolvedVersion> {
        req.extensions().get::<ResolvedVersion>()
    }

    /// Record `self` as the resolved version of `req`
    pub fn attach(self, req: &mut Request) {
        req.extensions_mut().insert(self);
    }

    /// The version token
    pub fn token(&self) -> &VersionToken {
        &self.0
    }

    /// The version token as a string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where the requested version is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// An HTTP header, matched case-insensitively
    Header(HeaderName),
    /// A named URL path parameter
    UrlParam(String),
}

impl VersionSource {
    /// Read the version from the header `name`
    ///
    /// # Errors
    ///
    /// [`VersioningError::InvalidArgument`] if `name` is empty or not a valid
    /// header name.
    pub fn header(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(VersioningError::invalid_argument("header name must not be empty"));
        }
        HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes())
            .map(Self::Header)
            .map_err(|e| {
                VersioningError::invalid_argument(format!("invalid header name `{}`: {}", name, e))
            })
    }

    /// Read the version from the URL path parameter `name`
    ///
    /// # Errors
    ///
    /// [`VersioningError::InvalidArgument`] if `name` is empty.
    pub fn url(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(VersioningError::invalid_argument("URL parameter name must not be empty"));
        }
        Ok(Self::UrlParam(name.to_string()))
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::UrlParam(_) => "url",
        }
    }

    /// The candidate token carried by `req`; absent and empty values are `None`
    fn extract(&self, req: &Request) -> Option<VersionToken> {
        let value = match self {
            Self::Header(name) => req
                .headers()
                .get(name)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned()),
            Self::UrlParam(name) => req.path_param(name).cloned(),
        };
        value.and_then(|v| VersionToken::new(v).ok())
    }
}

/// Outcome of resolving the version of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No version was requested; the latest supported version applies
    Latest(VersionToken),
    /// The requested version is supported
    Requested(VersionToken),
    /// The requested version is outside the supported range or malformed
    Unsupported(VersionToken),
    /// No version was requested and no range is configured; the request
    /// proceeds without a resolved version
    Unresolved,
    /// A version was requested but no range is configured
    Unconfigured,
}

#[derive(Serialize)]
struct RejectionBody {
    message: &'static str,
}

/// The response sent for an unsupported version
pub fn unsupported_version_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(RejectionBody {
            message: UNSUPPORTED_VERSION_MESSAGE,
        }),
    )
        .into_response()
}

/// Middleware resolving the API version of each request
///
/// # Example
///
/// ```rust,ignore
/// use apiver::{ResolveVersionLayer, VersionRegistry};
///
/// let registry = VersionRegistry::with_range("v1", "v5")?;
/// let by_header = ResolveVersionLayer::header("x-api-version", registry.clone())?;
/// let by_url = ResolveVersionLayer::url("version", registry)?;
/// ```
#[derive(Debug, Clone)]
pub struct ResolveVersionLayer {
    source: VersionSource,
    registry: VersionRegistry,
}

impl ResolveVersionLayer {
    /// Resolve from `source` against `registry`
    pub fn new(source: VersionSource, registry: VersionRegistry) -> Self {
        Self { source, registry }
    }

    /// Resolve from the header `name`
    pub fn header(name: &str, registry: VersionRegistry) -> Result<Self> {
        Ok(Self::new(VersionSource::header(name)?, registry))
    }

    /// Resolve from the URL path parameter `name`
    pub fn url(name: &str, registry: VersionRegistry) -> Result<Self> {
        Ok(Self::new(VersionSource::url(name)?, registry))
    }

    /// Where this layer reads the version from
    pub fn source(&self) -> &VersionSource {
        &self.source
    }

    /// Decide the version of `req` without touching it
    pub fn resolve(&self, req: &Request) -> Resolution {
        let Some(candidate) = self.source.extract(req) else {
            return match self.registry.latest() {
                Some(latest) => Resolution::Latest(latest),
                None => Resolution::Unresolved,
            };
        };

        match self.registry.is_version_active(candidate.as_str()) {
            Ok(true) => Resolution::Requested(candidate),
            Ok(false) => Resolution::Unsupported(candidate),
            Err(_) => Resolution::Unconfigured,
        }
    }
}

impl MiddlewareLayer for ResolveVersionLayer {
    fn call(&self, mut req: Request, next: BoxedNext) -> ResponseFuture {
        let source = self.source.kind();

        match self.resolve(&req) {
            Resolution::Latest(token) | Resolution::Requested(token) => {
                tracing::debug!(source, version = %token, path = %req.path(), "resolved API version");
                ResolvedVersion::new(token).attach(&mut req);
                next(req)
            }
            Resolution::Unresolved => {
                tracing::debug!(source, path = %req.path(), "no API version requested or configured");
                next(req)
            }
            Resolution::Unsupported(requested) => {
                tracing::warn!(source, requested = %requested, path = %req.path(), "unsupported API version requested");
                Box::pin(async { unsupported_version_response() })
            }
            Resolution::Unconfigured => {
                tracing::error!(source, path = %req.path(), "supported API versions are not configured");
                Box::pin(async {
                    ApiError::internal("API versioning is not configured").into_response()
                })
            }
        }
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

//! Per-version controller dispatch

use crate::chain::{DelegationChain, VersionMap};
use crate::controller::{Controller, ControllerSpec};
use crate::error::{Result, VersioningError};
use crate::resolve::ResolvedVersion;
use apiver_core::{ApiError, BoxedHandler, IntoResponse, Request, ResponseFuture};
use std::sync::Arc;

/// Controller that routes each operation by the request's resolved version
///
/// Exposes exactly the operations of the latest controller. At call time the
/// [`ResolvedVersion`] of the request selects the implementation: an exact
/// mapped version goes through the [`DelegationChain`], anything else to latest.
#[derive(Debug, Clone)]
pub struct VersionedController {
    chain: Arc<DelegationChain>,
}

impl VersionedController {
    /// Dispatch over `chain`
    pub fn new(chain: DelegationChain) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// The underlying delegation chain
    pub fn chain(&self) -> &DelegationChain {
        &self.chain
    }
}

impl Controller for VersionedController {
    fn operation(&self, name: &str) -> Option<BoxedHandler> {
        if !self.chain.latest().contains(name) {
            return None;
        }

        let chain = self.chain.clone();
        let name: Arc<str> = Arc::from(name);
        let handler: BoxedHandler = Arc::new(move |req: Request| -> ResponseFuture {
            let version = ResolvedVersion::of(&req).map(|v| v.as_str().to_owned());
            match chain.resolve(version.as_deref(), &name) {
                Some(handler) => {
                    tracing::debug!(operation = %name, version = ?version, "dispatching versioned operation");
                    handler(req)
                }
                None => {
                    let error = ApiError::not_found(format!("Unknown operation `{}`", name));
                    Box::pin(async move { error.into_response() })
                }
            }
        });
        Some(handler)
    }

    fn operation_names(&self) -> Vec<String> {
        self.chain.latest().operation_names()
    }
}

/// Wrap `base` so its operations dispatch by resolved API version
///
/// `versions` maps older version tokens to the operations that differ in that
/// version. Without a mapping (or with an empty one) `base` is returned as is.
///
/// # Errors
///
/// [`VersioningError::InvalidArgument`] if `base` is `None` or a mapping key
/// is not a valid version token.
///
/// # Example
///
/// ```rust,ignore
/// use apiver::{controller_with_versioning, ControllerSpec, VersionMap};
/// use apiver_core::handler_fn;
///
/// let latest = ControllerSpec::new().operation("test", handler_fn(|_req| async { "v3" }));
/// let mut versions = VersionMap::new();
/// versions.insert("v1".into(), ControllerSpec::new().operation("test", handler_fn(|_req| async { "v1" })));
///
/// let controller = controller_with_versioning(Some(latest), Some(versions))?;
/// ```
pub fn controller_with_versioning(
    base: Option<ControllerSpec>,
    versions: Option<VersionMap>,
) -> Result<Arc<dyn Controller>> {
    let base = base.ok_or_else(|| {
        VersioningError::invalid_argument("controller_with_versioning requires a base controller")
    })?;

    match versions {
        Some(versions) if !versions.is_empty() => {
            let chain = DelegationChain::build(Arc::new(base), versions)?;
            Ok(Arc::new(VersionedController::new(chain)))
        }
        _ => Ok(Arc::new(base)),
    }
}

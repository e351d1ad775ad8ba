//! Controllers: named operation tables

use apiver_core::{ApiError, BoxedHandler, IntoResponse, Request, ResponseFuture};
use std::collections::BTreeMap;
use std::fmt;

/// A set of named operations a route can invoke
///
/// Implemented by the plain [`ControllerSpec`] table and by the
/// version-dispatching wrapper returned from
/// [`controller_with_versioning`](crate::controller_with_versioning), so
/// callers never branch on the version themselves.
pub trait Controller: Send + Sync {
    /// The handler for `name`, if the controller exposes it
    fn operation(&self, name: &str) -> Option<BoxedHandler>;

    /// Names of every exposed operation, sorted
    fn operation_names(&self) -> Vec<String>;

    /// Invoke `name` with `req`
    ///
    /// An unknown operation is answered with a 404 error response.
    fn call(&self, name: &str, req: Request) -> ResponseFuture {
        match self.operation(name) {
            Some(handler) => handler(req),
            None => {
                tracing::warn!(operation = %name, "unknown controller operation");
                let error = ApiError::not_found(format!("Unknown operation `{}`", name));
                Box::pin(async move { error.into_response() })
            }
        }
    }
}

/// A table of operations, keyed by name
///
/// # Example
///
/// ```rust,ignore
/// use apiver::ControllerSpec;
/// use apiver_core::handler_fn;
///
/// let latest = ControllerSpec::new()
///     .operation("list", handler_fn(|_req| async { "all items" }))
///     .operation("show", handler_fn(|_req| async { "one item" }));
/// ```
#[derive(Clone, Default)]
pub struct ControllerSpec {
    operations: BTreeMap<String, BoxedHandler>,
}

impl ControllerSpec {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the operation `name`
    pub fn operation(mut self, name: impl Into<String>, handler: BoxedHandler) -> Self {
        self.insert(name, handler);
        self
    }

    /// Add (or replace) the operation `name` in place
    pub fn insert(&mut self, name: impl Into<String>, handler: BoxedHandler) {
        self.operations.insert(name.into(), handler);
    }

    /// The handler registered as `name`
    pub fn get(&self, name: &str) -> Option<&BoxedHandler> {
        self.operations.get(name)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Controller for ControllerSpec {
    fn operation(&self, name: &str) -> Option<BoxedHandler> {
        self.operations.get(name).cloned()
    }

    fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}

impl fmt::Debug for ControllerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerSpec")
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

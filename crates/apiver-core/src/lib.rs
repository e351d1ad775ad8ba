//! # apiver core
//!
//! HTTP plumbing shared by the apiver crates: request/response types,
//! middleware layers, a prefix-mount router and an in-process test client.
//!
//! This crate is not meant to be used directly. Use `apiver` instead.

mod error;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;
mod tracing_macros;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}

// Public API
pub use error::ApiError;
pub use handler::{handler_fn, BoxedHandler};
pub use middleware::{BoxedNext, LayerStack, MiddlewareLayer, ResponseFuture};
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::{Mount, MountError, Router};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};

//! Middleware infrastructure for apiver
//!
//! Middleware are attached to a mount together with the handler they guard:
//!
//! ```rust,ignore
//! use apiver_core::{handler_fn, Mount, Router};
//!
//! let mut router = Router::new();
//! router.mount("/api/test/", Box::new(my_layer), handler_fn(|_req| async { "ok" }));
//! ```

mod layer;

pub use layer::{BoxedNext, LayerStack, MiddlewareLayer, ResponseFuture};

//! Type-erased handlers

use crate::middleware::{BoxedNext, ResponseFuture};
use crate::request::Request;
use crate::response::IntoResponse;
use std::future::Future;
use std::sync::Arc;

/// A type-erased, shareable request handler
///
/// Handlers and middleware continuations share one representation, so a
/// handler can be passed anywhere a [`BoxedNext`] is expected.
pub type BoxedHandler = BoxedNext;

/// Box an async function or closure into a [`BoxedHandler`]
///
/// # Example
///
/// ```rust,ignore
/// use apiver_core::{handler_fn, Request};
///
/// let hello = handler_fn(|_req: Request| async { "Hello, World!" });
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> BoxedHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req: Request| {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() }) as ResponseFuture
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};

    #[tokio::test]
    async fn test_handler_fn_converts_output() {
        let handler = handler_fn(|req: Request| async move {
            if req.path() == "/created" {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            }
        });

        let response = handler(Request::from_uri(Method::GET, Uri::from_static("/created"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = handler(Request::from_uri(Method::GET, Uri::from_static("/"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

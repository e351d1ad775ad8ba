//! Prefix-mount router
//!
//! Handlers are mounted under a path prefix together with the middleware that
//! guards them, the way `use(prefix, middleware, handler)` works in most HTTP
//! frameworks. A request is served by the first mount, in registration order,
//! whose prefix matches the leading segments of the request path.
//!
//! # Prefix Patterns
//!
//! - `/api/test/` - static prefix (the trailing slash is optional)
//! - `/api/:version/test/` - captures the `version` segment
//! - `/api/{version}/test/` - same, brace style
//!
//! # Example
//!
//! ```rust,ignore
//! use apiver_core::{handler_fn, Mount, Router};
//!
//! let mut router = Router::new();
//! router.mount("/api/:version/test/", Box::new(version_layer), handler_fn(|_req| async { "ok" }))?;
//!
//! // GET /api/v1/test and GET /api/v1/test/anything both reach the handler,
//! // with `version = "v1"` available as a path parameter.
//! ```

use crate::error::ApiError;
use crate::handler::BoxedHandler;
use crate::middleware::{LayerStack, MiddlewareLayer};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use bytes::Bytes;
use http_body_util::Full;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tower::Service;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Error returned when a prefix cannot be mounted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot mount `{prefix}`: {details}")]
pub struct MountError {
    /// The prefix as it was given
    pub prefix: String,
    /// Details from the underlying matcher
    pub details: String,
}

/// The registration surface of a router: mount a handler, guarded by a
/// middleware layer, under a path prefix.
pub trait Mount {
    /// Mount `handler` behind `layer` under `prefix`
    fn mount(
        &mut self,
        prefix: &str,
        layer: Box<dyn MiddlewareLayer>,
        handler: BoxedHandler,
    ) -> Result<(), MountError>;
}

struct MountEntry {
    /// Prefix as registered
    prefix: String,
    /// Number of path segments the prefix spans
    depth: usize,
    matcher: MatchitRouter<()>,
    layers: LayerStack,
    handler: BoxedHandler,
}

/// Ordered prefix-mount router
#[derive(Clone)]
pub struct Router {
    mounts: Vec<Arc<MountEntry>>,
}

impl Router {
    /// Create a new router
    ///
    /// Installs a `tracing` subscriber (honouring `RUST_LOG`) unless one is
    /// already set.
    pub fn new() -> Self {
        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,apiver=debug")),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        Self { mounts: Vec::new() }
    }

    /// Prefixes in registration order (for testing and debugging)
    pub fn mounted_prefixes(&self) -> Vec<&str> {
        self.mounts.iter().map(|m| m.prefix.as_str()).collect()
    }

    /// Find the first mount matching `path` and the parameters it captured
    fn match_mount(&self, path: &str) -> Option<(&Arc<MountEntry>, HashMap<String, String>)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.mounts.iter().find_map(|entry| {
            if segments.len() < entry.depth {
                return None;
            }
            let candidate = format!("/{}", segments[..entry.depth].join("/"));
            let matched = entry.matcher.at(&candidate).ok()?;
            let params = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), decode_param(v)))
                .collect();
            Some((entry, params))
        })
    }

    /// Route an already-buffered request through the matching mount
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some((entry, params)) = self.match_mount(req.path()) else {
            crate::trace_debug!(method = %req.method(), path = %req.path(), "no mount matched");
            return ApiError::not_found(format!("No route found for {} {}", req.method(), req.path()))
                .into_response();
        };

        crate::trace_debug!(
            method = %req.method(),
            path = %req.path(),
            mount = %entry.prefix,
            "request matched mount"
        );
        req.set_path_params(params);
        entry.layers.execute(req, entry.handler.clone()).await
    }

    /// Dispatch an `http::Request`; its body is not read
    pub async fn handle(&self, req: http::Request<Full<Bytes>>) -> Response {
        let (parts, _body) = req.into_parts();
        self.dispatch(Request::new(parts, HashMap::new())).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Mount for Router {
    fn mount(
        &mut self,
        prefix: &str,
        layer: Box<dyn MiddlewareLayer>,
        handler: BoxedHandler,
    ) -> Result<(), MountError> {
        let pattern = normalize_prefix(prefix);
        let depth = pattern.split('/').filter(|s| !s.is_empty()).count();

        let mut matcher = MatchitRouter::new();
        matcher.insert(pattern.clone(), ()).map_err(|e| MountError {
            prefix: prefix.to_string(),
            details: e.to_string(),
        })?;

        if self.mounts.iter().any(|m| normalize_prefix(&m.prefix) == pattern) {
            crate::trace_warn!(prefix = %prefix, "prefix already mounted, new mount is unreachable");
        }

        let mut layers = LayerStack::new();
        layers.push(layer);

        crate::trace_info!(prefix = %prefix, pattern = %pattern, "mounted handler");
        self.mounts.push(Arc::new(MountEntry {
            prefix: prefix.to_string(),
            depth,
            matcher,
            layers,
            handler,
        }));
        Ok(())
    }
}

impl Service<http::Request<Full<Bytes>>> for Router {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Full<Bytes>>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.handle(req).await) })
    }
}

/// Percent-decode a captured segment; undecodable values are kept raw
fn decode_param(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Convert `{param}` segments to matchit's `:param` syntax, drop the
/// trailing slash and ensure a leading one.
fn normalize_prefix(prefix: &str) -> String {
    let segments: Vec<String> = prefix
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => format!(":{}", name),
                None => segment.to_string(),
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::middleware::{BoxedNext, ResponseFuture};
    use http::{Method, StatusCode, Uri};
    use http_body_util::BodyExt;

    /// Passes every request through untouched
    #[derive(Clone)]
    struct PassThrough;

    impl MiddlewareLayer for PassThrough {
        fn call(&self, req: Request, next: BoxedNext) -> ResponseFuture {
            next(req)
        }

        fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
            Box::new(self.clone())
        }
    }

    fn echo_param(name: &'static str) -> BoxedHandler {
        handler_fn(move |req: Request| async move {
            req.path_param(name).cloned().unwrap_or_else(|| "-".to_string())
        })
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(path: &'static str) -> Request {
        Request::from_uri(Method::GET, Uri::from_static(path))
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api/test/"), "/api/test");
        assert_eq!(normalize_prefix("/api/{version}/test"), "/api/:version/test");
        assert_eq!(normalize_prefix("api/:version/test/"), "/api/:version/test");
        assert_eq!(normalize_prefix("/"), "/");
    }

    #[tokio::test]
    async fn test_prefix_match_captures_params() {
        let mut router = Router::new();
        router
            .mount("/api/:version/test/", Box::new(PassThrough), echo_param("version"))
            .unwrap();

        assert_eq!(body_text(router.dispatch(get("/api/v3/test")).await).await, "v3");
        assert_eq!(body_text(router.dispatch(get("/api/v3/test/")).await).await, "v3");
        assert_eq!(body_text(router.dispatch(get("/api/v3/test/deeper")).await).await, "v3");
    }

    #[tokio::test]
    async fn test_params_are_percent_decoded() {
        let mut router = Router::new();
        router
            .mount("/api/:version/test/", Box::new(PassThrough), echo_param("version"))
            .unwrap();

        assert_eq!(body_text(router.dispatch(get("/api/v%31/test")).await).await, "v1");
        assert_eq!(body_text(router.dispatch(get("/api/a%20b/test")).await).await, "a b");
        assert_eq!(body_text(router.dispatch(get("/api/v%FF/test")).await).await, "v%FF");
    }

    #[tokio::test]
    async fn test_first_mount_wins() {
        let mut router = Router::new();
        router
            .mount("/api/test/", Box::new(PassThrough), handler_fn(|_req| async { "static" }))
            .unwrap();
        router
            .mount("/api/:version/test/", Box::new(PassThrough), echo_param("version"))
            .unwrap();

        assert_eq!(router.mounted_prefixes(), vec!["/api/test/", "/api/:version/test/"]);
        assert_eq!(body_text(router.dispatch(get("/api/test")).await).await, "static");
        assert_eq!(body_text(router.dispatch(get("/api/v1/test")).await).await, "v1");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let mut router = Router::new();
        router
            .mount("/api/test/", Box::new(PassThrough), handler_fn(|_req| async { "ok" }))
            .unwrap();

        let response = router.dispatch(get("/api/other")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router.dispatch(get("/api")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tower_service_call() {
        let mut router = Router::new();
        router
            .mount("/ping", Box::new(PassThrough), handler_fn(|_req| async { "pong" }))
            .unwrap();

        let request = http::Request::builder()
            .uri("/ping")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = Service::call(&mut router, request).await.unwrap();
        assert_eq!(body_text(response).await, "pong");
    }

    #[test]
    fn test_invalid_prefix_is_rejected() {
        let mut router = Router::new();
        let err = router
            .mount("/api/:/test", Box::new(PassThrough), handler_fn(|_req| async { "ok" }))
            .unwrap_err();
        assert_eq!(err.prefix, "/api/:/test");
    }
}

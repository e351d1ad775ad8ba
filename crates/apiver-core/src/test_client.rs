//! TestClient for integration testing without network binding
//!
//! Sends simulated HTTP requests through a [`Router`], including the
//! middleware of the matching mount, without starting a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiver_core::{handler_fn, Mount, Router, TestClient, TestRequest};
//!
//! #[tokio::test]
//! async fn test_hello() {
//!     let mut router = Router::new();
//!     router.mount("/hello", Box::new(layer), handler_fn(|_req| async { "Hello" })).unwrap();
//!     let client = TestClient::new(router);
//!
//!     let response = client.get("/hello").await;
//!     response.assert_status(200);
//!     assert_eq!(response.text(), "Hello");
//! }
//! ```

use crate::response::Response;
use crate::router::Router;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;

/// Test client for integration testing without network binding
pub struct TestClient {
    router: Router,
}

impl TestClient {
    /// Create a new test client from a router
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// Send a request with full control
    ///
    /// ```rust,ignore
    /// let response = client
    ///     .request(TestRequest::get("/api/test").header("x-api-version", "v1"))
    ///     .await;
    /// ```
    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let mut builder = http::Request::builder().method(req.method).uri(req.path);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(req.headers);
        }

        let response = match builder.body(Full::new(Bytes::new())) {
            Ok(request) => self.router.handle(request).await,
            Err(err) => panic!("invalid test request: {}", err),
        };
        TestResponse::from_response(response).await
    }
}

/// A request under construction
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl TestRequest {
    /// Create a request with the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Add a header
    ///
    /// Panics if the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes()).expect("valid header name");
        let value = HeaderValue::from_str(value).expect("valid header value");
        self.headers.insert(name, value);
        self
    }
}

/// A fully buffered response
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body as UTF-8 text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Assert the status code
    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "unexpected status, body: {}",
            self.text()
        );
        self
    }
}

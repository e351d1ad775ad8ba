//! Response types for apiver
//!
//! The core trait is [`IntoResponse`], which lets handlers and middleware
//! return plain values that are turned into an HTTP response.
//!
//! | Type | Status | Content-Type |
//! |------|--------|--------------|
//! | `String` / `&str` | 200 | text/plain |
//! | `()` | 200 | - |
//! | `StatusCode` | given | - |
//! | [`Json<T>`] | 200 | application/json |
//! | [`ApiError`] | varies | application/json |
//!
//! Tuples `(StatusCode, R)` override the status of `R`.

use crate::error::{ApiError, ErrorResponse};
use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// HTTP Response type
pub type Response = http::Response<Full<Bytes>>;

/// Trait for types that can be converted into an HTTP response
pub trait IntoResponse {
    /// Convert self into a Response
    fn into_response(self) -> Response;
}

fn with_content_type(body: Bytes, content_type: &'static str) -> Response {
    let mut response = http::Response::new(Full::new(body));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        http::Response::new(Full::new(Bytes::new()))
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        with_content_type(Bytes::from(self), "text/plain; charset=utf-8")
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        with_content_type(Bytes::from(self), "text/plain; charset=utf-8")
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        let mut response = ().into_response();
        *response.status_mut() = self;
        response
    }
}

impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        if let Some(internal) = &self.internal {
            crate::trace_error!(status = %status, details = %internal, "responding with error");
        }
        let body = serde_json::to_vec(&ErrorResponse::from(self)).unwrap_or_else(|_| {
            br#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#.to_vec()
        });

        let mut response = with_content_type(Bytes::from(body), "application/json");
        *response.status_mut() = status;
        response
    }
}

/// JSON response body
///
/// Serializes `T` with `serde_json` and sets `Content-Type: application/json`.
///
/// ```rust,ignore
/// use apiver_core::Json;
/// use serde_json::json;
///
/// async fn handler() -> Json<serde_json::Value> {
///     Json(json!({ "ok": true }))
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(body) => with_content_type(Bytes::from(body), "application/json"),
            Err(err) => ApiError::internal("Failed to serialize response")
                .with_internal(err.to_string())
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = (StatusCode::BAD_REQUEST, Json(json!({ "message": "nope" }))).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"message":"nope"}"#);
    }

    #[tokio::test]
    async fn test_text_response() {
        let response = "v3".into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "v3");
    }

    #[test]
    fn test_status_code_response_is_empty() {
        let response = StatusCode::CREATED.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let response = ApiError::not_found("No route found for GET /nope").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["type"], "not_found");
        assert_eq!(body["error"]["message"], "No route found for GET /nope");
    }
}

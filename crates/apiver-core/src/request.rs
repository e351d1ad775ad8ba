//! Request types for apiver

use http::{request::Parts, Extensions, HeaderMap, Method, Uri};
use std::collections::HashMap;

/// HTTP Request wrapper
///
/// Carries the request head, the path parameters captured by the mount that
/// matched, and the extensions map that middleware use as request-scoped
/// storage. Bodies are not read by the versioning layer and are dropped.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) path_params: HashMap<String, String>,
}

impl Request {
    /// Create a new request from parts
    pub fn new(parts: Parts, path_params: HashMap<String, String>) -> Self {
        Self { parts, path_params }
    }

    /// Build a bodiless request for `method` and `uri`.
    ///
    /// Mostly useful when driving middleware or controllers directly.
    pub fn from_uri(method: Method, uri: Uri) -> Self {
        let mut head = http::Request::new(());
        *head.method_mut() = method;
        *head.uri_mut() = uri;
        let (parts, _) = head.into_parts();
        Self::new(parts, HashMap::new())
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Get mutable headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    /// Get request extensions
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Get mutable extensions
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get a specific path parameter
    pub fn path_param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Replace the path parameters
    pub fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("path_params", &self.path_params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_uri_has_no_params() {
        let req = Request::from_uri(Method::GET, Uri::from_static("/api/v1/test?x=1"));

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/api/v1/test");
        assert!(req.path_param("version").is_none());
    }

    #[test]
    fn test_path_params_are_replaceable() {
        let mut req = Request::from_uri(Method::GET, Uri::from_static("/"));
        let mut params = HashMap::new();
        params.insert("version".to_string(), "v2".to_string());
        req.set_path_params(params);

        assert_eq!(req.path_param("version").map(String::as_str), Some("v2"));
        assert!(req.path_param("missing").is_none());
    }
}

//! Delegation chain over older controller versions
//!
//! Versions are linked oldest to newest by ordinal. Each node falls back to
//! the next-newer version, and the newest mapped version falls back to the
//! latest controller:
//!
//! ```text
//! v1 -> v2 -> v10 -> latest
//! ```
//!
//! An operation missing from a version is looked up along its successors, so
//! an old version only has to override what actually changed.

use crate::controller::ControllerSpec;
use crate::error::{Result, VersioningError};
use crate::version::VersionToken;
use apiver_core::BoxedHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Older controller versions keyed by version token (`"v1"`, `"v2"`, ...)
pub type VersionMap = HashMap<String, ControllerSpec>;

/// Where a version delegates operations it does not define
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// The next-newer mapped version
    Version(VersionToken),
    /// The latest controller
    Latest,
}

enum Link {
    Version(Arc<ChainNode>),
    Latest(Arc<ControllerSpec>),
}

struct ChainNode {
    spec: ControllerSpec,
    next: Link,
}

impl ChainNode {
    fn lookup(&self, operation: &str) -> Option<BoxedHandler> {
        let mut node = self;
        loop {
            if let Some(handler) = node.spec.get(operation) {
                return Some(handler.clone());
            }
            match &node.next {
                Link::Version(next) => node = next,
                Link::Latest(latest) => return latest.get(operation).cloned(),
            }
        }
    }
}

/// Linked fallback structure over a latest controller and its older versions
///
/// Built once per dispatching controller; lookups never allocate nodes.
pub struct DelegationChain {
    latest: Arc<ControllerSpec>,
    nodes: HashMap<VersionToken, Arc<ChainNode>>,
    /// Mapped versions, oldest first
    order: Vec<VersionToken>,
}

impl DelegationChain {
    /// Link `versions` behind `latest`
    ///
    /// # Errors
    ///
    /// [`VersioningError::InvalidArgument`] if a key is empty, is not of the
    /// form `v<integer>`, or shares its ordinal with another key.
    pub fn build(latest: Arc<ControllerSpec>, versions: VersionMap) -> Result<Self> {
        let mut entries = Vec::with_capacity(versions.len());
        for (key, spec) in versions {
            let token = VersionToken::new(key)?;
            let ordinal = token.number().value().ok_or_else(|| {
                VersioningError::invalid_argument(format!(
                    "controller version `{}` is not of the form v<integer>",
                    token
                ))
            })?;
            entries.push((ordinal, token, spec));
        }
        entries.sort_by_key(|(ordinal, _, _)| *ordinal);

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(VersioningError::invalid_argument(format!(
                "controller versions `{}` and `{}` share ordinal {}",
                pair[0].1, pair[1].1, pair[0].0
            )));
        }

        let order: Vec<VersionToken> = entries.iter().map(|(_, token, _)| token.clone()).collect();
        let mut nodes = HashMap::with_capacity(entries.len());
        let mut next = Link::Latest(latest.clone());
        for (_, token, spec) in entries.into_iter().rev() {
            let node = Arc::new(ChainNode { spec, next });
            nodes.insert(token, node.clone());
            next = Link::Version(node);
        }

        tracing::debug!(versions = ?order, "built controller delegation chain");
        Ok(Self {
            latest,
            nodes,
            order,
        })
    }

    /// Whether `version` is an exact key of the chain
    pub fn contains(&self, version: &str) -> bool {
        self.nodes.contains_key(version)
    }

    /// Mapped versions, oldest first
    pub fn versions(&self) -> &[VersionToken] {
        &self.order
    }

    /// The latest controller
    pub fn latest(&self) -> &Arc<ControllerSpec> {
        &self.latest
    }

    /// Structural successor of `version`, `None` if it is not mapped
    pub fn fallback_of(&self, version: &str) -> Option<Fallback> {
        let position = self.order.iter().position(|token| token == version)?;
        Some(match self.order.get(position + 1) {
            Some(next) => Fallback::Version(next.clone()),
            None => Fallback::Latest,
        })
    }

    /// Find `operation` starting at `version` and walking towards latest
    ///
    /// Returns `None` if `version` is not mapped or nothing along the chain
    /// defines `operation`.
    pub fn lookup(&self, version: &str, operation: &str) -> Option<BoxedHandler> {
        self.nodes.get(version)?.lookup(operation)
    }

    /// Pick the handler for `operation` given a request's resolved version
    ///
    /// Unmapped or missing versions go straight to latest; there is no
    /// nearest-version matching.
    pub fn resolve(&self, version: Option<&str>, operation: &str) -> Option<BoxedHandler> {
        match version.and_then(|v| self.nodes.get(v)) {
            Some(node) => node.lookup(operation),
            None => self.latest.get(operation).cloned(),
        }
    }
}

impl fmt::Debug for DelegationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegationChain")
            .field("versions", &self.order)
            .field("latest", &self.latest)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiver_core::{handler_fn, Request};
    use http::{Method, Uri};
    use http_body_util::BodyExt;

    fn returns(text: &'static str) -> BoxedHandler {
        handler_fn(move |_req| async move { text })
    }

    async fn output(handler: BoxedHandler) -> String {
        let response = handler(Request::from_uri(Method::GET, Uri::from_static("/"))).await;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn latest() -> Arc<ControllerSpec> {
        Arc::new(
            ControllerSpec::new()
                .operation("test", returns("v3"))
                .operation("extra", returns("latest extra")),
        )
    }

    fn versions() -> VersionMap {
        let mut versions = VersionMap::new();
        versions.insert("v1".into(), ControllerSpec::new().operation("test", returns("v1")));
        versions.insert("v2".into(), ControllerSpec::new().operation("test", returns("v2")));
        versions
    }

    #[test]
    fn test_fallback_order() {
        let chain = DelegationChain::build(latest(), versions()).unwrap();

        assert_eq!(chain.versions(), ["v1", "v2"]);
        assert_eq!(
            chain.fallback_of("v1"),
            Some(Fallback::Version(VersionToken::new("v2").unwrap()))
        );
        assert_eq!(chain.fallback_of("v2"), Some(Fallback::Latest));
        assert_eq!(chain.fallback_of("v3"), None);
    }

    #[test]
    fn test_ordinal_ordering() {
        let mut versions = VersionMap::new();
        for key in ["v10", "v2", "v1"] {
            versions.insert(key.into(), ControllerSpec::new());
        }
        let chain = DelegationChain::build(latest(), versions).unwrap();

        assert_eq!(chain.versions(), ["v1", "v2", "v10"]);
        assert_eq!(chain.fallback_of("v10"), Some(Fallback::Latest));
    }

    #[tokio::test]
    async fn test_lookup_walks_chain() {
        let chain = DelegationChain::build(latest(), versions()).unwrap();

        assert_eq!(output(chain.lookup("v1", "test").unwrap()).await, "v1");
        assert_eq!(output(chain.lookup("v2", "test").unwrap()).await, "v2");
        assert_eq!(output(chain.lookup("v1", "extra").unwrap()).await, "latest extra");
        assert!(chain.lookup("v1", "missing").is_none());
        assert!(chain.lookup("v4", "test").is_none());
    }

    #[tokio::test]
    async fn test_partial_override_inherits_from_newer_version() {
        let mut versions = versions();
        versions.insert("v0".into(), ControllerSpec::new().operation("extra", returns("v0 extra")));
        let chain = DelegationChain::build(latest(), versions).unwrap();

        assert_eq!(output(chain.lookup("v0", "test").unwrap()).await, "v1");
        assert_eq!(output(chain.lookup("v0", "extra").unwrap()).await, "v0 extra");
    }

    #[tokio::test]
    async fn test_resolve_unmapped_goes_to_latest() {
        let chain = DelegationChain::build(latest(), versions()).unwrap();

        assert_eq!(output(chain.resolve(None, "test").unwrap()).await, "v3");
        assert_eq!(output(chain.resolve(Some("v4"), "test").unwrap()).await, "v3");
        assert_eq!(output(chain.resolve(Some("v2"), "test").unwrap()).await, "v2");
    }

    #[test]
    fn test_malformed_keys_are_rejected() {
        for key in ["", "vX", "latest", "v1.1"] {
            let mut versions = VersionMap::new();
            versions.insert(key.into(), ControllerSpec::new());
            let err = DelegationChain::build(latest(), versions).unwrap_err();
            assert!(err.is_invalid_argument(), "key: {:?}", key);
        }
    }

    #[test]
    fn test_duplicate_ordinals_are_rejected() {
        let mut versions = VersionMap::new();
        versions.insert("v1".into(), ControllerSpec::new());
        versions.insert("v01".into(), ControllerSpec::new());

        assert!(DelegationChain::build(latest(), versions)
            .unwrap_err()
            .is_invalid_argument());
    }
}

//! Endpoint matching logic.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive, port ignored)
//! - Match mount path (segment-aware prefix)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Mount prefixes match ASCII case-insensitively
//! - `/api` mounts `/api` and `/api/...`, never `/apix`
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::Request;

use crate::conditions::context::{hostname, RequestContext};
use crate::config::Endpoint;

/// Trait for matching requests against mount constraints.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this constraint.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the Host header.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        RequestContext::host(req)
            .map(|h| hostname(h).eq_ignore_ascii_case(&self.expected_host))
            .unwrap_or(false)
    }
}

/// Matches requests under a mount path.
#[derive(Debug, Clone)]
pub struct MountPathMatcher {
    prefix: String,
}

impl MountPathMatcher {
    /// Create a new mount path matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: trimmed.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    /// The part of `path` below the mount, or `None` if `path` is outside it.
    ///
    /// The remainder is empty or starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let head = path.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        let rest = &path[self.prefix.len()..];
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}

impl Matcher for MountPathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.strip(req.uri().path()).is_some()
    }
}

/// Path and optional host constraint of one mount.
#[derive(Debug, Clone)]
pub struct EndpointMatcher {
    path: MountPathMatcher,
    host: Option<HostMatcher>,
}

impl EndpointMatcher {
    pub fn new(endpoint: &Endpoint) -> Self {
        Self {
            path: MountPathMatcher::new(endpoint.path.as_str()),
            host: endpoint.host.as_deref().map(HostMatcher::new),
        }
    }

    pub fn mount_path(&self) -> &str {
        self.path.prefix()
    }

    pub fn path(&self) -> &MountPathMatcher {
        &self.path
    }
}

impl Matcher for EndpointMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All constraints must pass (AND)
        self.path.matches(req) && self.host.as_ref().map_or(true, |h| h.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(uri: &str, host: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header("Host", host);
        }
        builder.body(Body::default()).unwrap()
    }

    #[test]
    fn test_host_matcher() {
        let matcher = HostMatcher::new("example.com");

        assert!(matcher.matches(&req("/", Some("example.com"))));
        assert!(matcher.matches(&req("/", Some("EXAMPLE.COM")))); // Case insensitive
        assert!(matcher.matches(&req("/", Some("example.com:8443"))));
        assert!(!matcher.matches(&req("/", Some("other.com"))));
        assert!(!matcher.matches(&req("/", None)));
    }

    #[test]
    fn test_mount_path_matcher() {
        let matcher = MountPathMatcher::new("/api");

        assert!(matcher.matches(&req("/api", None)));
        assert!(matcher.matches(&req("/api/", None)));
        assert!(matcher.matches(&req("http://example.com/api/v1?x=1", None)));
        assert!(!matcher.matches(&req("/apix", None)));
        assert!(!matcher.matches(&req("/images", None)));
    }

    #[test]
    fn test_mount_prefix_ignores_ascii_case() {
        let matcher = MountPathMatcher::new("/api");

        assert!(matcher.matches(&req("/API/users", None)));
        assert!(matcher.matches(&req("/Api", None)));
        assert!(!matcher.matches(&req("/APIX", None)));
    }

    #[test]
    fn test_strip_returns_mount_relative_path() {
        let matcher = MountPathMatcher::new("/api");

        assert_eq!(matcher.strip("/api/users"), Some("/users"));
        assert_eq!(matcher.strip("/API/users/1"), Some("/users/1"));
        assert_eq!(matcher.strip("/api"), Some(""));
        assert_eq!(matcher.strip("/apix"), None);
        assert_eq!(matcher.strip("/ap"), None);
        // Prefix length falls inside a multi-byte character
        assert_eq!(MountPathMatcher::new("/ab").strip("/a\u{e9}"), None);

        assert_eq!(MountPathMatcher::new("/").strip("/anything"), Some("/anything"));
    }

    #[test]
    fn test_root_mount_matches_everything() {
        let matcher = MountPathMatcher::new("/");
        assert_eq!(matcher.prefix(), "/");
        assert!(matcher.matches(&req("/", None)));
        assert!(matcher.matches(&req("/anything/at/all", None)));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let matcher = MountPathMatcher::new("/api/");
        assert_eq!(matcher.prefix(), "/api");
        assert!(matcher.matches(&req("/api", None)));
    }

    #[test]
    fn test_endpoint_matcher() {
        let matcher = EndpointMatcher::new(&Endpoint::new("/api").with_host("a.example.com"));

        assert!(matcher.matches(&req("/api/users", Some("a.example.com"))));
        assert!(!matcher.matches(&req("/api/users", Some("b.example.com"))));
        assert!(!matcher.matches(&req("/other", Some("a.example.com"))));

        let any_host = EndpointMatcher::new(&Endpoint::new("/api"));
        assert!(any_host.matches(&req("/api", Some("b.example.com"))));
        assert!(any_host.matches(&req("/api", None)));
    }
}

//! Read-only request view consumed by conditions.

use std::collections::HashMap;

use axum::http::{header, HeaderName, HeaderValue, Method, Request};

/// Request attributes a condition may inspect.
pub trait RequestContext {
    fn method(&self) -> &Method;
    fn path(&self) -> &str;
    /// Raw authority from the `Host` header or the request URI, port included.
    fn host(&self) -> Option<&str>;
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue>;
    fn context_field(&self, name: &str) -> Option<&str>;
}

impl<B> RequestContext for Request<B> {
    fn method(&self) -> &Method {
        Request::method(self)
    }

    fn path(&self) -> &str {
        self.uri().path()
    }

    fn host(&self) -> Option<&str> {
        self.headers()
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| self.uri().host())
    }

    fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers().get(name)
    }

    fn context_field(&self, name: &str) -> Option<&str> {
        self.extensions()
            .get::<ContextFields>()
            .and_then(|fields| fields.get(name))
    }
}

/// Extension fields attached to a request by actions, readable by later
/// conditions through `context.<name>` selectors.
#[derive(Debug, Clone, Default)]
pub struct ContextFields(HashMap<String, String>);

impl ContextFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }
}

/// Set an extension field on a request, creating the field map if needed.
pub fn set_context_field<B>(req: &mut Request<B>, name: impl Into<String>, value: impl Into<String>) {
    let extensions = req.extensions_mut();
    match extensions.get_mut::<ContextFields>() {
        Some(fields) => {
            fields.insert(name, value);
        }
        None => {
            let mut fields = ContextFields::default();
            fields.insert(name, value);
            extensions.insert(fields);
        }
    }
}

/// Strip the port from an authority (`a.example.com:8080`, `[::1]:80`).
pub fn hostname(authority: &str) -> &str {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

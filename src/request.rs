//! Incoming HTTP request type.
//!
//! Built once per request by the server from the hyper request parts and the
//! fully collected body. Owns the per-request [`Context`] that middleware
//! writes into.

use bytes::Bytes;
use http::{HeaderMap, Method};

use crate::context::Context;

/// An incoming HTTP request.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    context: Context,
}

impl Request {
    pub(crate) fn new(method: Method, path: String, headers: HeaderMap, body: Bytes) -> Self {
        Self { method, path, headers, body, context: Context::new() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup (name matching is case-insensitive per `http`).
    /// Returns `None` for absent headers and for values that are not valid
    /// UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the value of the named cookie from the `Cookie` request
    /// header, if present.
    ///
    /// The header is split on `;` into `name=value` pairs with surrounding
    /// whitespace trimmed; the first pair whose name matches wins. Fragments
    /// without a `=` are skipped. No decoding, quoting, or attribute handling
    /// is attempted — anything fancier belongs to a real cookie jar.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let header = self.header("cookie")?;
        header.split(';').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k.trim() == name).then(|| v.trim())
        })
    }

    /// The per-request store middleware writes into.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}

#[cfg(test)]
impl Request {
    /// Bare GET request for unit tests, with optional headers.
    pub(crate) fn fake(headers: &[(&str, &str)]) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(
                http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                http::header::HeaderValue::from_str(value).unwrap(),
            );
        }
        Self::new(Method::GET, "/".to_owned(), map, Bytes::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_found_among_several() {
        let req = Request::fake(&[("cookie", "a=1; dummy.time_zone=Europe/Paris; b=2")]);
        assert_eq!(req.cookie("dummy.time_zone"), Some("Europe/Paris"));
        assert_eq!(req.cookie("a"), Some("1"));
        assert_eq!(req.cookie("b"), Some("2"));
    }

    #[test]
    fn cookie_absent() {
        let req = Request::fake(&[("cookie", "a=1")]);
        assert_eq!(req.cookie("missing"), None);

        let req = Request::fake(&[]);
        assert_eq!(req.cookie("anything"), None);
    }

    #[test]
    fn cookie_malformed_fragments_skipped() {
        let req = Request::fake(&[("cookie", "garbage; tz=Europe/Moscow")]);
        assert_eq!(req.cookie("tz"), Some("Europe/Moscow"));
        assert_eq!(req.cookie("garbage"), None);
    }

    #[test]
    fn cookie_whitespace_trimmed() {
        let req = Request::fake(&[("cookie", "  tz =  Europe/Paris ")]);
        assert_eq!(req.cookie("tz"), Some("Europe/Paris"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::fake(&[("x-request-id", "abc")]);
        assert_eq!(req.header("X-Request-Id"), Some("abc"));
    }
}

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MalformedRequest, Reason};
use crate::parser::DuplicateKeys;
use crate::session::Session;

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

/// Standard HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl HttpMethod {
    /// Parse a method from a request-line token, ignoring case.
    ///
    /// The token is normalized to `Capitalized` form (`gET` becomes `Get`)
    /// before matching, so any casing of a known method is accepted.
    pub fn from_token(token: &str) -> Result<Self, MalformedRequest> {
        match capitalize(token).as_str() {
            "Get" => Ok(Self::GET),
            "Head" => Ok(Self::HEAD),
            "Post" => Ok(Self::POST),
            "Put" => Ok(Self::PUT),
            "Delete" => Ok(Self::DELETE),
            "Connect" => Ok(Self::CONNECT),
            "Options" => Ok(Self::OPTIONS),
            "Trace" => Ok(Self::TRACE),
            "Patch" => Ok(Self::PATCH),
            _ => Err(Reason::UnknownMethod(token.to_owned()).into()),
        }
    }

    /// Return the method as a static string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::DELETE => "DELETE",
            Self::CONNECT => "CONNECT",
            Self::OPTIONS => "OPTIONS",
            Self::TRACE => "TRACE",
            Self::PATCH => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// A single HTTP header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Header field name, exactly as sent.
    pub name: String,
    /// Header field value, exactly as sent after the `": "` separator.
    pub value: String,
}

/// Ordered header fields of a request.
///
/// Lookups match names **case-sensitively**: `host` does not satisfy a
/// lookup for `Host`. Duplicates are kept in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderCollection {
    entries: Vec<Header>,
}

impl HeaderCollection {
    pub(crate) fn add(&mut self, name: &str, value: &str) {
        self.entries.push(Header {
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    /// First header with exactly this name.
    pub fn get(&self, name: &str) -> Option<&Header> {
        self.entries.iter().find(|h| h.name == name)
    }

    /// Value of the first header with exactly this name.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).map(|h| h.value.as_str())
    }

    /// All values sent under `name`, in arrival order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name == name)
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Return `true` if a header named exactly `name` was sent.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate headers in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a HeaderCollection {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

/// A cookie sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Always `false` for cookies read from a `Cookie` request header.
    pub http_only: bool,
}

/// Ordered cookies of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CookieCollection {
    entries: Vec<Cookie>,
}

impl CookieCollection {
    pub(crate) fn add(&mut self, cookie: Cookie) {
        self.entries.push(cookie);
    }

    /// First cookie with this name.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.entries.iter().find(|c| c.name == name)
    }

    /// Return `true` if a cookie with this name was sent.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate cookies in the order they appear in the header.
    pub fn iter(&self) -> std::slice::Iter<'_, Cookie> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CookieCollection {
    type Item = &'a Cookie;
    type IntoIter = std::slice::Iter<'a, Cookie>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Query-string or form-body parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Parameters {
    entries: BTreeMap<String, String>,
}

impl Parameters {
    /// Insert a parameter, resolving a repeated name according to `policy`.
    pub(crate) fn insert(
        &mut self,
        name: &str,
        value: &str,
        policy: DuplicateKeys,
    ) -> Result<(), MalformedRequest> {
        if policy == DuplicateKeys::Reject && self.entries.contains_key(name) {
            return Err(Reason::DuplicateParameter(name.to_owned()).into());
        }
        self.entries.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    /// Value of the parameter `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Return `true` if a parameter named `name` was sent.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ParsedRequest
// ---------------------------------------------------------------------------

/// A fully parsed HTTP request.
///
/// Built only by the parser; every field is read-only afterwards. The one
/// exception is the session, which the handling layer may attach later.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedRequest {
    pub(crate) method: HttpMethod,
    pub(crate) url: String,
    pub(crate) path: String,
    pub(crate) headers: HeaderCollection,
    pub(crate) query_parameters: Parameters,
    pub(crate) form_parameters: Parameters,
    pub(crate) cookies: CookieCollection,
    #[serde(skip)]
    pub(crate) session: Option<Arc<dyn Session>>,
}

impl ParsedRequest {
    /// The request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The request target exactly as it appeared on the request line.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL up to the first `?` or `#`. Never empty.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All header fields in arrival order.
    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    /// Value of the first header named exactly `name`.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.value(name)
    }

    /// Parameters from the URL query string.
    pub fn query_parameters(&self) -> &Parameters {
        &self.query_parameters
    }

    /// Parameters from the URL-encoded body line.
    pub fn form_parameters(&self) -> &Parameters {
        &self.form_parameters
    }

    /// Cookies read from the `Cookie` header.
    pub fn cookies(&self) -> &CookieCollection {
        &self.cookies
    }

    /// The session attached by the handling layer, if any.
    pub fn session(&self) -> Option<&Arc<dyn Session>> {
        self.session.as_ref()
    }

    /// Attach the session resolved for this request.
    ///
    /// A request takes a session only once. If one is already attached the
    /// request is left untouched and `session` is handed back as the error.
    pub fn attach_session(&mut self, session: Arc<dyn Session>) -> Result<(), Arc<dyn Session>> {
        if self.session.is_some() {
            return Err(session);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Builder form of [`attach_session`](Self::attach_session).
    ///
    /// # Errors
    ///
    /// Returns the rejected session if the request already has one.
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Result<Self, Arc<dyn Session>> {
        self.attach_session(session)?;
        Ok(self)
    }
}

impl PartialEq for ParsedRequest {
    fn eq(&self, other: &Self) -> bool {
        let same_session = match (&self.session, &other.session) {
            (None, None) => true,
            (Some(a), Some(b)) => a.id() == b.id(),
            _ => false,
        };

        same_session
            && self.method == other.method
            && self.url == other.url
            && self.path == other.path
            && self.headers == other.headers
            && self.query_parameters == other.query_parameters
            && self.form_parameters == other.form_parameters
            && self.cookies == other.cookies
    }
}

impl Eq for ParsedRequest {}

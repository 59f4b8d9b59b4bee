use crate::error::{MalformedRequest, Reason};
use crate::types::{Cookie, CookieCollection, HeaderCollection, HttpMethod, Parameters, ParsedRequest};

// ---------------------------------------------------------------------------
// Wire constants
// ---------------------------------------------------------------------------

const NEW_LINE: &str = "\r\n";
const PROTOCOL: &str = "HTTP/1.1";

const HOST_HEADER: &str = "Host";
const COOKIE_HEADER: &str = "Cookie";

const HEADER_SEPARATOR: &str = ": ";
const QUERY_SEPARATOR: char = '?';
const URL_SEPARATORS: [char; 2] = [QUERY_SEPARATOR, '#'];
const PARAMETER_SEPARATOR: char = '&';
const PARAMETER_VALUE_SEPARATOR: char = '=';
const COOKIE_SEPARATOR: &str = "; ";
const COOKIE_VALUE_SEPARATOR: char = '=';

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a repeated query or form parameter name is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// A repeated name makes the whole request malformed.
    #[default]
    Reject,
    /// The later value replaces the earlier one.
    LastWins,
}

/// Configurable limits and policies for the request parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum length of the whole request text in bytes (default: 1 MiB).
    pub max_request_len: usize,
    /// Maximum number of header lines (default: 128).
    pub max_headers_count: usize,
    /// Policy for repeated parameter names (default: reject).
    pub duplicate_keys: DuplicateKeys,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_request_len: 1024 * 1024,
            max_headers_count: 128,
            duplicate_keys: DuplicateKeys::Reject,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Turns the complete text of an HTTP/1.1 request into a [`ParsedRequest`].
///
/// The parser holds only its configuration, so a single instance can be
/// shared between threads and reused for any number of requests.
///
/// ```rust
/// use rawreq::{HttpMethod, RequestParser};
///
/// let parser = RequestParser::new();
/// let request = parser
///     .parse("POST /login?next=home HTTP/1.1\r\nHost: h\r\n\r\nuser=ann")
///     .unwrap();
///
/// assert_eq!(request.method(), HttpMethod::POST);
/// assert_eq!(request.path(), "/login");
/// assert_eq!(request.query_parameters().get("next"), Some("home"));
/// assert_eq!(request.form_parameters().get("user"), Some("ann"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestParser {
    config: ParserConfig,
}

impl RequestParser {
    /// Create a parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with custom limits and policies.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The limits and policies this parser applies.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse one complete request.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRequest`] on any structural violation. Nothing is
    /// returned for a request that fails part-way through.
    pub fn parse(&self, text: &str) -> Result<ParsedRequest, MalformedRequest> {
        if text.len() > self.config.max_request_len {
            return Err(Reason::RequestTooLarge.into());
        }

        let lines: Vec<&str> = text.split(NEW_LINE).collect();
        let request_line = lines.first().copied().unwrap_or_default();

        let (method, url) = parse_request_line(request_line)?;
        let path = parse_path(url)?;
        let headers = self.parse_headers(lines.get(1..).unwrap_or_default())?;
        let cookies = parse_cookies(&headers);
        let query_parameters = self.parse_query(url)?;
        let form_parameters = self.parse_form(lines.last().copied().unwrap_or_default())?;

        Ok(ParsedRequest {
            method,
            url: url.to_owned(),
            path,
            headers,
            query_parameters,
            form_parameters,
            cookies,
            session: None,
        })
    }

    /// Read header lines up to the first empty one.
    fn parse_headers(&self, lines: &[&str]) -> Result<HeaderCollection, MalformedRequest> {
        let mut headers = HeaderCollection::default();
        let mut lines = lines.iter();

        loop {
            let line = lines.next().ok_or(Reason::UnterminatedHeaders)?;
            if line.is_empty() {
                break;
            }
            if headers.len() >= self.config.max_headers_count {
                return Err(Reason::TooManyHeaders.into());
            }

            let (name, value) =
                split_header_line(line).ok_or_else(|| Reason::HeaderLine((*line).to_owned()))?;
            headers.add(name, value);
        }

        if !headers.contains(HOST_HEADER) {
            return Err(Reason::MissingHost.into());
        }
        Ok(headers)
    }

    fn parse_query(&self, url: &str) -> Result<Parameters, MalformedRequest> {
        let mut parameters = Parameters::default();
        if !url.contains(QUERY_SEPARATOR) {
            return Ok(parameters);
        }

        let query = url_segments(url).nth(1).unwrap_or_default();
        let tokens: Vec<&str> = parameter_tokens(query).collect();
        if !is_valid_query_string(query, &tokens) {
            return Err(Reason::InvalidQueryString(url.to_owned()).into());
        }

        for token in tokens {
            self.insert_parameter(&mut parameters, token)?;
        }
        Ok(parameters)
    }

    /// The body is the last line of the request; an empty one has no form data.
    fn parse_form(&self, body: &str) -> Result<Parameters, MalformedRequest> {
        let mut parameters = Parameters::default();
        for token in parameter_tokens(body) {
            self.insert_parameter(&mut parameters, token)?;
        }
        Ok(parameters)
    }

    fn insert_parameter(
        &self,
        parameters: &mut Parameters,
        token: &str,
    ) -> Result<(), MalformedRequest> {
        let (name, value) = token
            .split_once(PARAMETER_VALUE_SEPARATOR)
            .filter(|(name, value)| !name.is_empty() && !value.is_empty())
            .ok_or_else(|| Reason::InvalidParameter(token.to_owned()))?;
        parameters.insert(name, value, self.config.duplicate_keys)
    }
}

// ---------------------------------------------------------------------------
// Line-level helpers
// ---------------------------------------------------------------------------

/// Split the request line into method and URL, checking shape and protocol.
fn parse_request_line(line: &str) -> Result<(HttpMethod, &str), MalformedRequest> {
    let tokens: Vec<&str> = line.trim().split(' ').filter(|t| !t.is_empty()).collect();

    let &[method, url, protocol] = tokens.as_slice() else {
        return Err(Reason::RequestLineShape(tokens.len()).into());
    };
    if !protocol.eq_ignore_ascii_case(PROTOCOL) {
        return Err(Reason::UnsupportedProtocol(protocol.to_owned()).into());
    }

    Ok((HttpMethod::from_token(method)?, url))
}

/// A header line must split on `": "` into exactly a name and a value.
fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split(HEADER_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(value), None) if !name.is_empty() => Some((name, value)),
        _ => None,
    }
}

fn parse_path(url: &str) -> Result<String, MalformedRequest> {
    url_segments(url)
        .next()
        .map(str::to_owned)
        .ok_or_else(|| Reason::EmptyPath(url.to_owned()).into())
}

/// Non-empty pieces of `url` between `?` and `#` separators.
fn url_segments(url: &str) -> impl Iterator<Item = &str> {
    url.split(URL_SEPARATORS).filter(|s| !s.is_empty())
}

fn parameter_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAMETER_SEPARATOR).filter(|t| !t.is_empty())
}

/// A query string is usable only if it is non-empty AND holds at least one
/// `&`-delimited token. `"&&"` is non-empty but has no tokens.
fn is_valid_query_string(query: &str, tokens: &[&str]) -> bool {
    !query.is_empty() && !tokens.is_empty()
}

/// Cookies come from the `Cookie` header only. Fragments that are not a
/// complete `name=value` pair are dropped.
fn parse_cookies(headers: &HeaderCollection) -> CookieCollection {
    let mut cookies = CookieCollection::default();
    let Some(header) = headers.value(COOKIE_HEADER) else {
        return cookies;
    };

    for fragment in header.split(COOKIE_SEPARATOR) {
        match fragment.split_once(COOKIE_VALUE_SEPARATOR) {
            Some((name, value)) if !name.is_empty() && !value.is_empty() => {
                cookies.add(Cookie {
                    name: name.to_owned(),
                    value: value.to_owned(),
                    http_only: false,
                });
            }
            _ => continue,
        }
    }
    cookies
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_line_collapses_repeated_spaces() {
        let (method, url) = parse_request_line("  GET   /a   HTTP/1.1  ").unwrap();
        assert_eq!(method, HttpMethod::GET);
        assert_eq!(url, "/a");
    }

    #[test]
    fn request_line_token_count() {
        let err = parse_request_line("GET /a").unwrap_err();
        assert_eq!(err.reason(), &Reason::RequestLineShape(2));
        let err = parse_request_line("GET /a HTTP/1.1 extra").unwrap_err();
        assert_eq!(err.reason(), &Reason::RequestLineShape(4));
    }

    #[test]
    fn request_line_protocol_checked_before_method() {
        let err = parse_request_line("FETCH / HTTP/1.0").unwrap_err();
        assert_eq!(err.reason(), &Reason::UnsupportedProtocol("HTTP/1.0".into()));
    }

    #[test]
    fn url_segments_skip_empty_pieces() {
        let segments: Vec<&str> = url_segments("/a??x=1#frag").collect();
        assert_eq!(segments, vec!["/a", "x=1", "frag"]);
        assert_eq!(url_segments("#").count(), 0);
    }

    #[test]
    fn header_line_needs_exactly_two_parts() {
        assert_eq!(split_header_line("Host: h"), Some(("Host", "h")));
        assert_eq!(split_header_line("X-Empty: "), Some(("X-Empty", "")));
        assert_eq!(split_header_line("X-Note: a: b"), None);
        assert_eq!(split_header_line("Host:h"), None);
        assert_eq!(split_header_line(": h"), None);
    }

    #[test]
    fn path_is_first_segment() {
        assert_eq!(parse_path("/").unwrap(), "/");
        assert_eq!(parse_path("/foo?x=1").unwrap(), "/foo");
        assert_eq!(parse_path("/foo#top").unwrap(), "/foo");
        assert!(parse_path("?#").is_err());
    }

    #[test]
    fn query_string_validity_requires_both_conditions() {
        assert!(is_valid_query_string("a=1", &["a=1"]));
        assert!(!is_valid_query_string("", &[]));
        assert!(!is_valid_query_string("&&", &[]));
    }

    #[test]
    fn cookies_skip_incomplete_fragments() {
        let mut headers = HeaderCollection::default();
        headers.add("Cookie", "a=1; justaname; =x; y=; b=2=3");
        let cookies = parse_cookies(&headers);
        let pairs: Vec<(&str, &str)> = cookies
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2=3")]);
        assert!(cookies.iter().all(|c| !c.http_only));
    }

    #[test]
    fn cookies_absent_header() {
        let headers = HeaderCollection::default();
        assert!(parse_cookies(&headers).is_empty());
    }
}

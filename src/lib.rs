//! # rawreq
//!
//! Turns the **complete text of an HTTP/1.1 request** into a structured,
//! read-only [`ParsedRequest`]: method, URL, path, headers, cookies, query
//! parameters and URL-encoded form parameters, all from a single pass over
//! the lines of the request. Usable both as a Rust library and as a CLI tool.
//!
//! Every failure is reported as one kind, [`MalformedRequest`], which a
//! transport layer answers with `400 Bad Request`.
//!
//! ## Quick start
//!
//! ```rust
//! use rawreq::{parse_request, HttpMethod};
//!
//! let raw = "GET /items?id=5 HTTP/1.1\r\nHost: example.com\r\nCookie: lang=en\r\n\r\n";
//! let request = parse_request(raw).expect("valid request");
//!
//! assert_eq!(request.method(), HttpMethod::GET);
//! assert_eq!(request.path(), "/items");
//! assert_eq!(request.query_parameters().get("id"), Some("5"));
//! assert_eq!(request.cookies().get("lang").map(|c| c.value.as_str()), Some("en"));
//! ```
//!
//! ## Duplicate parameters
//!
//! ```rust
//! use rawreq::{parse_request, parse_request_with_config, DuplicateKeys, ParserConfig};
//!
//! let raw = "GET /s?a=1&a=2 HTTP/1.1\r\nHost: h\r\n\r\n";
//! assert!(parse_request(raw).is_err());
//!
//! let config = ParserConfig {
//!     duplicate_keys: DuplicateKeys::LastWins,
//!     ..ParserConfig::default()
//! };
//! let request = parse_request_with_config(raw, config).unwrap();
//! assert_eq!(request.query_parameters().get("a"), Some("2"));
//! ```

mod error;
mod output;
mod parser;
mod session;
mod types;

// Re-export public API.
pub use error::{MalformedRequest, Reason};
pub use output::{format_debug, format_json, format_summary};
pub use parser::{DuplicateKeys, ParserConfig, RequestParser};
pub use session::Session;
pub use types::{
    Cookie, CookieCollection, Header, HeaderCollection, HttpMethod, Parameters, ParsedRequest,
};

/// Parse a complete HTTP request with the default [`ParserConfig`].
///
/// This is a convenience wrapper around [`RequestParser`].
///
/// # Errors
///
/// Returns [`MalformedRequest`] if the text is not a well-formed request.
pub fn parse_request(text: &str) -> Result<ParsedRequest, MalformedRequest> {
    RequestParser::new().parse(text)
}

/// Parse a complete HTTP request using a custom [`ParserConfig`].
///
/// # Errors
///
/// Returns [`MalformedRequest`] if the text is malformed or exceeds the
/// configured limits.
pub fn parse_request_with_config(
    text: &str,
    config: ParserConfig,
) -> Result<ParsedRequest, MalformedRequest> {
    RequestParser::with_config(config).parse(text)
}

use std::fmt;

/// The single failure kind produced by the request parser.
///
/// Every structural violation collapses into this one type, which maps to an
/// HTTP `400 Bad Request`. The [`Reason`] is kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRequest {
    reason: Reason,
}

/// Why a request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The request line did not split into exactly three tokens.
    RequestLineShape(usize),
    /// The protocol token is not `HTTP/1.1`.
    UnsupportedProtocol(String),
    /// The method token is not a recognized HTTP method.
    UnknownMethod(String),
    /// The URL has no non-empty path segment.
    EmptyPath(String),
    /// A header line is not of the form `name: value`.
    HeaderLine(String),
    /// The text ended before the blank line closing the header section.
    UnterminatedHeaders,
    /// No `Host` header was sent.
    MissingHost,
    /// The URL has a `?` but no usable query string.
    InvalidQueryString(String),
    /// A query or form token is not of the form `name=value`.
    InvalidParameter(String),
    /// A query or form parameter name appeared twice.
    DuplicateParameter(String),
    /// The number of header lines exceeds the configured maximum.
    TooManyHeaders,
    /// The request text exceeds the configured maximum length.
    RequestTooLarge,
}

impl MalformedRequest {
    pub(crate) fn new(reason: Reason) -> Self {
        Self { reason }
    }

    /// The detail behind this failure.
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        400
    }
}

impl From<Reason> for MalformedRequest {
    fn from(reason: Reason) -> Self {
        Self::new(reason)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestLineShape(n) => {
                write!(f, "request line has {n} tokens (expected 3)")
            }
            Self::UnsupportedProtocol(p) => write!(f, "unsupported protocol: '{p}'"),
            Self::UnknownMethod(m) => write!(f, "unknown HTTP method: '{m}'"),
            Self::EmptyPath(u) => write!(f, "no path in URL: '{u}'"),
            Self::HeaderLine(l) => write!(f, "malformed header line: '{l}'"),
            Self::UnterminatedHeaders => write!(f, "header section is not terminated"),
            Self::MissingHost => write!(f, "missing Host header"),
            Self::InvalidQueryString(u) => write!(f, "invalid query string in URL: '{u}'"),
            Self::InvalidParameter(p) => write!(f, "malformed parameter: '{p}'"),
            Self::DuplicateParameter(k) => write!(f, "duplicate parameter: '{k}'"),
            Self::TooManyHeaders => write!(f, "number of headers exceeds maximum"),
            Self::RequestTooLarge => write!(f, "request exceeds maximum allowed size"),
        }
    }
}

impl fmt::Display for MalformedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed request: {}", self.reason)
    }
}

impl std::error::Error for MalformedRequest {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_reason() {
        let err = MalformedRequest::new(Reason::MissingHost);
        assert_eq!(err.to_string(), "malformed request: missing Host header");
        assert_eq!(err.status_code(), 400);
    }
}

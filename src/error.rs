//! Error types for every fallible operation in the crate.
//!
//! All errors are plain values: nothing here is fatal, nothing is logged and
//! dropped. Callers decide whether to surface, retry or ignore them.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// A percent-encoded string could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A `%` at this byte offset is not followed by two hex digits.
    #[error("malformed percent escape at byte {offset}")]
    MalformedEscape { offset: usize },

    /// The escapes decoded to bytes that are not valid UTF-8.
    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// A URL string could not be split into components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid scheme: {0:?}")]
    InvalidScheme(String),

    #[error("invalid port: {0:?}")]
    InvalidPort(String),

    #[error("malformed authority: {0:?}")]
    MalformedAuthority(String),
}

/// Base64 input rejected by the strict decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base64Error {
    #[error("byte at offset {offset} is outside the base64 alphabet")]
    InvalidByte { offset: usize },

    #[error("invalid padding at offset {offset}")]
    InvalidPadding { offset: usize },

    #[error("base64 input ends with a dangling character")]
    Truncated,
}

/// Failure while retrieving response headers through a [`Fetch`](crate::headers::Fetch)
/// implementation. `E` is the fetcher's own error type.
#[derive(Debug, thiserror::Error)]
pub enum HeadersError<E> {
    #[error("invalid url: {0}")]
    Url(#[from] ParseError),

    #[error("url must carry a scheme and a host")]
    NotAbsolute,

    #[error("fetch failed: {0}")]
    Fetch(E),
}

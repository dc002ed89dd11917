//! # URL Utility Library
//!
//! A Rust library for splitting URLs, percent-encoding their components and
//! building or reading query strings, with typed results instead of sentinel
//! values. Supports both `std` and `no_std` environments.
//!
//! ## Features
//!
//! - **Percent-encoding**: RFC 1738 form encoding and RFC 3986 raw encoding
//! - **URL parsing**: scheme, userinfo, host (IPv6 aware), port, path, query, fragment
//! - **Query strings**: ordered build/parse with duplicates kept, plus nested `a[b]=c` keys
//! - **Base64**: encoding and lenient or strict decoding
//! - **Response headers**: parsing of raw heads fetched through your own transport
//! - **no_std support**: everything except logging output works with `alloc` only
//!
//! ## Quick Start
//!
//! ```rust
//! use urlkit::{parse_url, raw_url_encode, query, http_build_query};
//! use urlkit::query::QueryMap;
//! use urlkit::url_encode::EncodingProfile;
//!
//! let url = parse_url("https://example.com:8443/search?q=rust").unwrap();
//! assert_eq!(url.host(), Some("example.com"));
//! assert_eq!(url.port(), Some(8443));
//!
//! assert_eq!(raw_url_encode("a b/c"), "a%20b%2Fc");
//!
//! let entries = query! { q = "url parsing", page = 2 };
//! assert_eq!(urlkit::query::build(&entries, &Default::default()), "q=url+parsing&page=2");
//!
//! let mut data = QueryMap::new();
//! data.insert("0", "first");
//! assert_eq!(http_build_query(&data, Some("item_"), "&", EncodingProfile::Rfc1738), "item_0=first");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod base64;
pub mod error;
pub mod headers;
pub mod query;
pub mod url;
pub mod url_encode;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use hashbrown::HashMap;
use rustc_hash::FxHasher;
use core::hash::BuildHasherDefault;

pub use error::{Base64Error, DecodeError, HeadersError, ParseError};
pub use headers::{get_headers, Fetch, HeaderFormat, HeaderMap, Headers};
pub use query::{BuildOptions, ParseOptions, QueryEntry, QueryMap, QueryValue};
pub use url::{Component, ComponentValue, UrlComponents};
pub use url_encode::EncodingProfile;

/// A fast HashMap implementation using FxHasher.
///
/// Used for the position index of [`QueryMap`] and the field table of
/// [`HeaderMap`], both keyed by short strings.
///
/// # Examples
///
/// ```
/// use urlkit::FxHashMap;
///
/// let mut positions: FxHashMap<String, usize> = FxHashMap::default();
/// positions.insert("key".to_string(), 0);
/// assert_eq!(positions.get("key"), Some(&0));
/// ```
pub type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Generate a URL-encoded query string from nested data.
///
/// # Arguments
///
/// * `data` - Top-level pairs; values may be lists or maps
/// * `numeric_prefix` - Prepended to numeric top-level keys
/// * `separator` - Placed between pairs
/// * `profile` - RFC 1738 (space as `+`) or RFC 3986 (space as `%20`)
///
/// # Examples
///
/// ```
/// use urlkit::{http_build_query, EncodingProfile, QueryMap, QueryValue};
///
/// let mut data = QueryMap::new();
/// data.insert("foo", "bar baz");
/// data.insert("list", QueryValue::List(vec!["a".into(), "b".into()]));
///
/// assert_eq!(
///     http_build_query(&data, None, "&", EncodingProfile::Rfc3986),
///     "foo=bar%20baz&list%5B0%5D=a&list%5B1%5D=b"
/// );
/// ```
pub fn http_build_query(
    data: &QueryMap,
    numeric_prefix: Option<&str>,
    separator: &str,
    profile: EncodingProfile,
) -> String {
    let mut options = BuildOptions::default()
        .with_separator(separator)
        .with_profile(profile);
    if let Some(prefix) = numeric_prefix {
        options = options.with_numeric_prefix(prefix);
    }
    query::build_nested(data, &options)
}

/// Parse a query string with the default `&` separator and form decoding.
///
/// # Examples
///
/// ```
/// use urlkit::{parse_query, QueryEntry};
///
/// assert_eq!(parse_query("a=1&a=2").unwrap(), vec![QueryEntry::new("a", "1"), QueryEntry::new("a", "2")]);
/// ```
pub fn parse_query(raw: &str) -> Result<Vec<QueryEntry>, DecodeError> {
    query::parse(raw, &ParseOptions::default())
}

/// Encode data with MIME base64.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::base64_encode("hello"), "aGVsbG8=");
/// ```
pub fn base64_encode(data: impl AsRef<[u8]>) -> String {
    base64::encode(data.as_ref())
}

/// Decode MIME base64, optionally rejecting characters outside the alphabet.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::base64_decode("aGVs#bG8=", false).unwrap(), b"hello");
/// assert!(urlkit::base64_decode("aGVs#bG8=", true).is_err());
/// ```
pub fn base64_decode(data: &str, strict: bool) -> Result<Vec<u8>, Base64Error> {
    base64::decode(data, strict)
}

/// Split a URL into its components. See [`url::parse`].
///
/// # Examples
///
/// ```
/// let url = urlkit::parse_url("http://[::1]:80/").unwrap();
/// assert_eq!(url.host(), Some("[::1]"));
/// assert_eq!(url.port(), Some(80));
/// ```
pub fn parse_url(url: &str) -> Result<UrlComponents, ParseError> {
    url::parse(url)
}

/// Parse a URL and return a single component. See [`url::parse_component`].
///
/// # Examples
///
/// ```
/// use urlkit::{parse_url_component, Component};
///
/// let path = parse_url_component("https://example.com/docs?x", Component::Path).unwrap();
/// assert_eq!(path.unwrap().to_string(), "/docs");
/// ```
pub fn parse_url_component(url: &str, component: Component) -> Result<Option<ComponentValue>, ParseError> {
    url::parse_component(url, component)
}

/// URL-encode according to RFC 3986: space becomes `%20`, `-_.~` stay literal.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::raw_url_encode("foo @+%/"), "foo%20%40%2B%25%2F");
/// ```
pub fn raw_url_encode(raw: &str) -> String {
    url_encode::encode(raw, EncodingProfile::Rfc3986)
}

/// Decode RFC 3986 percent-encoding; `+` is not a space.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::raw_url_decode("foo%20bar%40baz+").unwrap(), "foo bar@baz+");
/// ```
pub fn raw_url_decode(encoded: &str) -> Result<String, DecodeError> {
    url_encode::decode(encoded, EncodingProfile::Rfc3986)
}

/// URL-encode for forms (RFC 1738): space becomes `+`.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::url_encode("a b~"), "a+b%7E");
/// ```
pub fn url_encode(raw: &str) -> String {
    url_encode::encode(raw, EncodingProfile::Rfc1738)
}

/// Decode form encoding (RFC 1738): `+` becomes a space.
///
/// # Examples
///
/// ```
/// assert_eq!(urlkit::url_decode("a+b%7E").unwrap(), "a b~");
/// ```
pub fn url_decode(encoded: &str) -> Result<String, DecodeError> {
    url_encode::decode(encoded, EncodingProfile::Rfc1738)
}

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "std")]
    pub use std::{string::ToString, vec::Vec};

    #[cfg(not(feature = "std"))]
    pub use alloc::{string::ToString, vec::Vec};
}

/// Build a `Vec<QueryEntry>` inline.
///
/// Keys are identifiers, values are anything implementing `Display`.
/// Order is kept, so the same key may appear more than once.
///
/// # Syntax
///
/// - `query! {}` - No entries
/// - `query! { key1 = value1, key2 = value2 }` - Entries in order
///
/// # Examples
///
/// ```
/// use urlkit::{query, QueryEntry};
///
/// let entries = query! { name = "Jane", age = 31, name = "Doe" };
/// assert_eq!(entries, vec![
///     QueryEntry::new("name", "Jane"),
///     QueryEntry::new("age", "31"),
///     QueryEntry::new("name", "Doe"),
/// ]);
/// ```
#[macro_export]
macro_rules! query {
    () => {
        $crate::__private::Vec::<$crate::QueryEntry>::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {{
        let mut entries = $crate::__private::Vec::<$crate::QueryEntry>::new();
        $(
            entries.push($crate::QueryEntry::new(
                stringify!($key),
                $crate::__private::ToString::to_string(&$value),
            ));
        )+
        entries
    }};
}

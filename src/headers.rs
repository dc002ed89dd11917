//! Response header retrieval over a caller-supplied transport.
//!
//! This crate performs no I/O. The embedding application implements [`Fetch`]
//! with whatever client it already uses; [`get_headers`] validates the target,
//! asks the fetcher for the raw response head and splits it into lines.

use core::fmt;

#[cfg(feature = "std")]
use std::{borrow::ToOwned, string::String, vec::Vec};

#[cfg(not(feature = "std"))]
use alloc::{borrow::ToOwned, string::String, vec::Vec};

use crate::error::HeadersError;
use crate::url::{self, UrlComponents};
use crate::FxHashMap;

/// Source of raw HTTP response heads.
///
/// Implementations return the status line and header lines of the response,
/// as sent on the wire. When redirects were followed, the heads of every hop
/// are concatenated in order.
///
/// # Examples
///
/// ```
/// use urlkit::headers::Fetch;
/// use urlkit::url::UrlComponents;
///
/// struct Canned(&'static [u8]);
///
/// impl Fetch for Canned {
///     type Error = &'static str;
///
///     fn fetch_head(&mut self, _url: &UrlComponents) -> Result<Vec<u8>, Self::Error> {
///         Ok(self.0.to_vec())
///     }
/// }
/// ```
pub trait Fetch {
    type Error: fmt::Display;

    fn fetch_head(&mut self, url: &UrlComponents) -> Result<Vec<u8>, Self::Error>;
}

impl<F: Fetch + ?Sized> Fetch for &mut F {
    type Error = F::Error;

    fn fetch_head(&mut self, url: &UrlComponents) -> Result<Vec<u8>, Self::Error> {
        (**self).fetch_head(url)
    }
}

/// Shape of the value returned by [`get_headers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HeaderFormat {
    /// Every line in order.
    #[default]
    Indexed,
    /// Fields grouped by name.
    Keyed,
}

/// Parsed response head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headers {
    Indexed(Vec<String>),
    Keyed(HeaderMap),
}

/// Header fields grouped by lower-cased name, in order of first arrival.
///
/// Lines that are not `name: value` pairs, such as the status line of each
/// redirect hop, are kept in order in [`HeaderMap::status_lines`] and do not
/// count as fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    status_lines: Vec<String>,
    fields: Vec<(String, Vec<String>)>,
    index: FxHashMap<String, usize>,
}

impl HeaderMap {
    pub fn status_lines(&self) -> &[String] {
        &self.status_lines
    }

    /// Status line of the last response in a redirect chain.
    pub fn final_status(&self) -> Option<&str> {
        self.status_lines.last().map(String::as_str)
    }

    /// First value of a field. Names are matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value of a field, in the order received.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.index
            .get(name.to_ascii_lowercase().as_str())
            .map(|&position| self.fields[position].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name.to_ascii_lowercase().as_str())
    }

    /// Field names with their values, in the order each name first arrived.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were received. Status lines are not fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn push_line(&mut self, line: String) {
        if !line.starts_with("HTTP/") {
            if let Some((name, value)) = line.split_once(':') {
                let name = name.trim();
                if !name.is_empty() && !name.contains(char::is_whitespace) {
                    self.push_field(name.to_ascii_lowercase(), value.trim().to_owned());
                    return;
                }
            }
        }
        self.status_lines.push(line);
    }

    fn push_field(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&position) => self.fields[position].1.push(value),
            None => {
                self.index.insert(name.clone(), self.fields.len());
                self.fields.push((name, Vec::from([value])));
            }
        }
    }
}

/// Split a raw response head into lines.
///
/// Lines end at `\n` with an optional `\r`; blank lines are skipped. A line
/// starting with a space or tab continues the previous one. Invalid UTF-8 is
/// replaced with `U+FFFD`.
///
/// # Examples
///
/// ```
/// use urlkit::headers::{parse_headers, HeaderFormat, Headers};
///
/// let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n";
///
/// let Headers::Indexed(lines) = parse_headers(raw, HeaderFormat::Indexed) else { unreachable!() };
/// assert_eq!(lines[1], "Content-Type: text/html");
///
/// let Headers::Keyed(map) = parse_headers(raw, HeaderFormat::Keyed) else { unreachable!() };
/// assert_eq!(map.final_status(), Some("HTTP/1.1 200 OK"));
/// assert_eq!(map.get("content-type"), Some("text/html"));
/// assert_eq!(map.get_all("Set-Cookie"), ["a=1", "b=2"]);
/// ```
pub fn parse_headers(raw: &[u8], format: HeaderFormat) -> Headers {
    let text = String::from_utf8_lossy(raw);
    let mut lines: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with([' ', '\t']) {
            if let Some(previous) = lines.last_mut() {
                previous.push(' ');
                previous.push_str(line.trim());
                continue;
            }
        }
        lines.push(line.trim().to_owned());
    }

    match format {
        HeaderFormat::Indexed => Headers::Indexed(lines),
        HeaderFormat::Keyed => {
            let mut map = HeaderMap::default();
            for line in lines {
                map.push_line(line);
            }
            Headers::Keyed(map)
        }
    }
}

/// Fetch and parse the response headers for `url`.
///
/// # Arguments
///
/// * `fetcher` - Transport supplied by the caller
/// * `url` - Absolute target URL
/// * `format` - Whether to return plain lines or a keyed map
///
/// # Returns
///
/// * `Ok(Headers)` - The parsed head
/// * `Err(HeadersError::Url)` - `url` does not parse
/// * `Err(HeadersError::NotAbsolute)` - `url` lacks a scheme or a host
/// * `Err(HeadersError::Fetch)` - The fetcher failed
///
/// # Examples
///
/// ```
/// use urlkit::headers::{get_headers, Fetch, HeaderFormat, Headers};
/// use urlkit::url::UrlComponents;
///
/// struct Canned;
///
/// impl Fetch for Canned {
///     type Error = &'static str;
///
///     fn fetch_head(&mut self, url: &UrlComponents) -> Result<Vec<u8>, Self::Error> {
///         assert_eq!(url.host(), Some("example.com"));
///         Ok(b"HTTP/1.0 200 OK\r\nServer: demo\r\n".to_vec())
///     }
/// }
///
/// let headers = get_headers(&mut Canned, "http://example.com", HeaderFormat::Keyed).unwrap();
/// let Headers::Keyed(map) = headers else { unreachable!() };
/// assert_eq!(map.get("server"), Some("demo"));
///
/// assert!(get_headers(&mut Canned, "/relative", HeaderFormat::Indexed).is_err());
/// ```
pub fn get_headers<F: Fetch>(
    fetcher: &mut F,
    url: &str,
    format: HeaderFormat,
) -> Result<Headers, HeadersError<F::Error>> {
    let target = url::parse(url)?;
    if !target.is_absolute() {
        return Err(HeadersError::NotAbsolute);
    }

    tracing::debug!(url, "fetching response headers");
    let raw = fetcher.fetch_head(&target).map_err(HeadersError::Fetch)?;
    tracing::debug!(bytes = raw.len(), "received response head");

    Ok(parse_headers(&raw, format))
}

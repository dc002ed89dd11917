//! `application/x-www-form-urlencoded` query strings.
//!
//! Flat queries are ordered sequences of [`QueryEntry`]: order is kept and
//! duplicate keys survive a [`parse`]/[`build`] round trip. Nested data uses
//! bracket keys (`user[name]=x`, `tags[]=a`) and is modelled by [`QueryValue`]
//! trees inside an insertion-ordered [`QueryMap`].

use core::fmt;

#[cfg(feature = "std")]
use std::{borrow::ToOwned, format, string::{String, ToString}, vec::Vec};

#[cfg(not(feature = "std"))]
use alloc::{borrow::ToOwned, format, string::{String, ToString}, vec::Vec};

use crate::error::DecodeError;
use crate::url_encode::{self, EncodingProfile};
use crate::FxHashMap;

/// Nesting limit applied by [`parse_nested`] unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// One `key=value` pair of a query string, decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryEntry {
    pub key: String,
    pub value: String,
}

impl QueryEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for QueryEntry {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Options for [`build`] and [`build_nested`].
///
/// # Examples
///
/// ```
/// use urlkit::query::BuildOptions;
/// use urlkit::url_encode::EncodingProfile;
///
/// let options = BuildOptions::default()
///     .with_separator(";")
///     .with_profile(EncodingProfile::Rfc3986)
///     .with_numeric_prefix("n_");
/// assert_eq!(options.separator, ";");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Placed between pairs. Defaults to `&`.
    pub separator: String,
    /// Encoding applied to keys and values. Defaults to RFC 1738.
    pub profile: EncodingProfile,
    /// Prepended to purely numeric top-level keys.
    pub numeric_prefix: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            separator: "&".to_string(),
            profile: EncodingProfile::Rfc1738,
            numeric_prefix: None,
        }
    }
}

impl BuildOptions {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_profile(mut self, profile: EncodingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_numeric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.numeric_prefix = Some(prefix.into());
        self
    }
}

/// Options for [`parse`] and [`parse_nested`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Splits pairs. Defaults to `&`; an empty separator means one pair.
    pub separator: String,
    /// Decoding applied to keys and values. Defaults to RFC 1738.
    pub profile: EncodingProfile,
    /// Deepest bracket nesting accepted by [`parse_nested`].
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            separator: "&".to_string(),
            profile: EncodingProfile::Rfc1738,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_profile(mut self, profile: EncodingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A node of nested query data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// Items are keyed by their position when flattened.
    List(Vec<QueryValue>),
    Map(QueryMap),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            QueryValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&QueryMap> {
        match self {
            QueryValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<Vec<QueryValue>> for QueryValue {
    fn from(items: Vec<QueryValue>) -> Self {
        QueryValue::List(items)
    }
}

impl From<QueryMap> for QueryValue {
    fn from(map: QueryMap) -> Self {
        QueryValue::Map(map)
    }
}

/// String-keyed map that remembers insertion order.
///
/// Inserting an existing key replaces its value and keeps its position.
///
/// # Examples
///
/// ```
/// use urlkit::query::{QueryMap, QueryValue};
///
/// let mut map = QueryMap::new();
/// map.insert("b", "1");
/// map.insert("a", "2");
/// map.insert("b", "3");
///
/// let keys: Vec<&str> = map.keys().collect();
/// assert_eq!(keys, ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&QueryValue::from("3")));
/// ```
#[derive(Clone, Default)]
pub struct QueryMap {
    entries: Vec<(String, QueryValue)>,
    index: FxHashMap<String, usize>,
    next_index: u64,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Option<QueryValue> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&position) => Some(core::mem::replace(&mut self.entries[position].1, value)),
            None => {
                if is_numeric_key(&key) {
                    if let Ok(index) = key.parse::<u64>() {
                        self.next_index = self.next_index.max(index.saturating_add(1));
                    }
                }
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// One past the largest integer key, or 0. Used for `key[]` appends.
    fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Moves a value out while keeping its slot, so a following `insert`
    /// puts the replacement back in the same position.
    fn take(&mut self, key: &str) -> Option<QueryValue> {
        let position = *self.index.get(key)?;
        Some(core::mem::replace(
            &mut self.entries[position].1,
            QueryValue::Scalar(String::new()),
        ))
    }
}

impl PartialEq for QueryMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for QueryMap {}

impl fmt::Debug for QueryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = QueryMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Render entries as a query string.
///
/// Keys and values are percent-encoded under `options.profile` and joined as
/// `key=value` pairs separated by `options.separator`. When a numeric prefix
/// is configured, purely numeric keys get it prepended.
///
/// # Arguments
///
/// * `entries` - Ordered pairs; duplicates are kept
/// * `options` - Separator, encoding profile and numeric prefix
///
/// # Returns
///
/// The encoded query string, empty when `entries` is empty.
///
/// # Examples
///
/// ```
/// use urlkit::query::{build, BuildOptions, QueryEntry};
///
/// let entries = vec![
///     QueryEntry::new("name", "Jane Doe"),
///     QueryEntry::new("0", "first"),
///     QueryEntry::new("name", "again"),
/// ];
///
/// assert_eq!(build(&entries, &BuildOptions::default()), "name=Jane+Doe&0=first&name=again");
/// assert_eq!(
///     build(&entries, &BuildOptions::default().with_numeric_prefix("v")),
///     "name=Jane+Doe&v0=first&name=again"
/// );
/// ```
pub fn build(entries: &[QueryEntry], options: &BuildOptions) -> String {
    let mut output = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            output.push_str(&options.separator);
        }
        match &options.numeric_prefix {
            Some(prefix) if is_numeric_key(&entry.key) => {
                output.push_str(&url_encode::encode(prefix, options.profile));
                output.push_str(&url_encode::encode(&entry.key, options.profile));
            }
            _ => output.push_str(&url_encode::encode(&entry.key, options.profile)),
        }
        output.push('=');
        output.push_str(&url_encode::encode(&entry.value, options.profile));
    }
    output
}

/// Flatten a nested value into bracket-keyed entries, depth first.
///
/// List items are keyed by position, map entries by their key. Empty lists
/// and maps produce no entries.
///
/// # Examples
///
/// ```
/// use urlkit::query::{flatten, QueryEntry, QueryMap, QueryValue};
///
/// let user: QueryMap = [
///     ("name", QueryValue::from("jo")),
///     ("tags", QueryValue::List(vec!["a".into(), "b".into()])),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(
///     flatten("user", &QueryValue::Map(user)),
///     vec![
///         QueryEntry::new("user[name]", "jo"),
///         QueryEntry::new("user[tags][0]", "a"),
///         QueryEntry::new("user[tags][1]", "b"),
///     ]
/// );
/// ```
pub fn flatten(name: &str, value: &QueryValue) -> Vec<QueryEntry> {
    let mut entries = Vec::new();
    flatten_into(name.to_owned(), value, &mut entries);
    entries
}

fn flatten_into(name: String, value: &QueryValue, entries: &mut Vec<QueryEntry>) {
    match value {
        QueryValue::Scalar(scalar) => entries.push(QueryEntry {
            key: name,
            value: scalar.clone(),
        }),
        QueryValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", name, i), item, entries);
            }
        }
        QueryValue::Map(map) => {
            for (key, item) in map.iter() {
                flatten_into(format!("{}[{}]", name, key), item, entries);
            }
        }
    }
}

/// Render nested data as a query string.
///
/// Every top-level pair is flattened with [`flatten`] and the result is
/// rendered with [`build`]. The numeric prefix applies to numeric top-level
/// keys only, never to nested indices.
///
/// # Examples
///
/// ```
/// use urlkit::query::{build_nested, BuildOptions, QueryMap, QueryValue};
///
/// let mut data = QueryMap::new();
/// data.insert("0", "zero");
/// data.insert("ids", QueryValue::List(vec!["7".into(), "9".into()]));
///
/// assert_eq!(
///     build_nested(&data, &BuildOptions::default().with_numeric_prefix("p_")),
///     "p_0=zero&ids%5B0%5D=7&ids%5B1%5D=9"
/// );
/// ```
pub fn build_nested(data: &QueryMap, options: &BuildOptions) -> String {
    let mut entries = Vec::new();
    for (key, value) in data.iter() {
        let name = match &options.numeric_prefix {
            Some(prefix) if is_numeric_key(key) => format!("{}{}", prefix, key),
            _ => key.to_owned(),
        };
        flatten_into(name, value, &mut entries);
    }

    let options = BuildOptions {
        numeric_prefix: None,
        ..options.clone()
    };
    build(&entries, &options)
}

/// Split a query string into decoded entries.
///
/// Pieces are split on `options.separator`, then on the first `=`. A piece
/// without `=` has an empty value, empty pieces are skipped. Order and
/// duplicates are preserved.
///
/// # Arguments
///
/// * `raw` - The query string without a leading `?`
/// * `options` - Separator and decoding profile
///
/// # Returns
///
/// * `Ok(Vec<QueryEntry>)` - The entries in source order
/// * `Err(DecodeError)` - A malformed escape; the offset is relative to `raw`
///
/// # Examples
///
/// ```
/// use urlkit::query::{parse, ParseOptions, QueryEntry};
///
/// let entries = parse("a=1&b=2&a=3", &ParseOptions::default()).unwrap();
/// assert_eq!(
///     entries,
///     vec![QueryEntry::new("a", "1"), QueryEntry::new("b", "2"), QueryEntry::new("a", "3")]
/// );
///
/// assert!(parse("a=%zz", &ParseOptions::default()).is_err());
/// ```
pub fn parse(raw: &str, options: &ParseOptions) -> Result<Vec<QueryEntry>, DecodeError> {
    let mut entries = Vec::new();
    let separator = options.separator.as_str();
    let mut start = 0;

    loop {
        let end = if separator.is_empty() {
            None
        } else {
            raw[start..].find(separator).map(|i| start + i)
        };
        let piece = &raw[start..end.unwrap_or(raw.len())];

        if !piece.is_empty() {
            let (key, value, value_start) = match piece.find('=') {
                Some(eq) => (&piece[..eq], &piece[eq + 1..], start + eq + 1),
                None => (piece, "", start + piece.len()),
            };
            entries.push(QueryEntry {
                key: decode_at(key, start, options.profile)?,
                value: decode_at(value, value_start, options.profile)?,
            });
        }

        match end {
            Some(end) => start = end + separator.len(),
            None => break,
        }
    }

    Ok(entries)
}

fn decode_at(text: &str, base: usize, profile: EncodingProfile) -> Result<String, DecodeError> {
    url_encode::decode(text, profile).map_err(|err| match err {
        DecodeError::MalformedEscape { offset } => DecodeError::MalformedEscape { offset: base + offset },
        other => other,
    })
}

/// Parse a query string and expand bracket keys into nested maps.
///
/// `a[b]=1` becomes `a: {b: 1}` and `a[]=x` appends under the next integer
/// key. Later values for the same path overwrite earlier ones. A key whose
/// first `[` is never closed, or which has nothing before its `[`, is taken
/// literally. Keys nested deeper than `options.max_depth` are dropped.
///
/// A nested container whose keys are exactly `0`, `1`, ... in order comes
/// back as a [`QueryValue::List`], so this inverts [`build_nested`] for data
/// without empty containers or bracket characters in keys.
///
/// # Examples
///
/// ```
/// use urlkit::query::{parse_nested, ParseOptions, QueryValue};
///
/// let data = parse_nested("user[name]=jo&tags[]=a&tags[]=b&x=1", &ParseOptions::default()).unwrap();
///
/// let user = data.get("user").and_then(QueryValue::as_map).unwrap();
/// assert_eq!(user.get("name").and_then(QueryValue::as_str), Some("jo"));
///
/// let tags = data.get("tags").and_then(QueryValue::as_list).unwrap();
/// assert_eq!(tags, [QueryValue::from("a"), QueryValue::from("b")]);
/// ```
pub fn parse_nested(raw: &str, options: &ParseOptions) -> Result<QueryMap, DecodeError> {
    let mut root = QueryMap::new();

    for entry in parse(raw, options)? {
        let Some((base, segments)) = split_bracket_key(&entry.key) else {
            root.insert(entry.key, entry.value);
            continue;
        };

        if segments.len() > options.max_depth {
            tracing::debug!(
                key = %entry.key,
                depth = segments.len(),
                max_depth = options.max_depth,
                "dropping query key nested too deeply"
            );
            continue;
        }

        let existing = root.take(base);
        root.insert(base, merge(existing, &segments, entry.value));
    }

    Ok(root
        .entries
        .into_iter()
        .map(|(key, value)| (key, into_lists(value)))
        .collect())
}

/// `None` in a segment list stands for an empty `[]` append.
fn split_bracket_key(key: &str) -> Option<(&str, Vec<Option<&str>>)> {
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }

    let mut segments = Vec::new();
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        let segment = &inner[..close];
        segments.push(if segment.is_empty() { None } else { Some(segment) });
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        return None;
    }
    Some((&key[..open], segments))
}

fn merge(existing: Option<QueryValue>, segments: &[Option<&str>], value: String) -> QueryValue {
    let Some((segment, rest)) = segments.split_first() else {
        return QueryValue::Scalar(value);
    };

    let mut map = match existing {
        Some(QueryValue::Map(map)) => map,
        _ => QueryMap::new(),
    };
    let key = match segment {
        Some(key) => (*key).to_owned(),
        None => map.next_index().to_string(),
    };
    let child = map.take(&key);
    map.insert(key, merge(child, rest, value));
    QueryValue::Map(map)
}

/// Bottom-up pass turning maps keyed `0..n` in order into lists.
fn into_lists(value: QueryValue) -> QueryValue {
    let map = match value {
        QueryValue::Map(map) => map,
        other => return other,
    };

    let sequential = !map.is_empty() && map.keys().enumerate().all(|(i, key)| is_list_index(key, i));
    let entries = map.entries.into_iter().map(|(key, value)| (key, into_lists(value)));
    if sequential {
        QueryValue::List(entries.map(|(_, value)| value).collect())
    } else {
        QueryValue::Map(entries.collect())
    }
}

fn is_list_index(key: &str, position: usize) -> bool {
    is_numeric_key(key) && (key.len() == 1 || !key.starts_with('0')) && key.parse::<usize>().ok() == Some(position)
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<QueryEntry> {
        pairs.iter().map(|&(k, v)| QueryEntry::new(k, v)).collect()
    }

    #[test]
    fn parse_keeps_order_and_duplicates() {
        let parsed = parse("a=1&b=2&a=3", &ParseOptions::default()).unwrap();
        assert_eq!(parsed, entries(&[("a", "1"), ("b", "2"), ("a", "3")]));
    }

    #[test]
    fn parse_defaults_missing_values_and_skips_empty_pieces() {
        let parsed = parse("flag&&x=&=y", &ParseOptions::default()).unwrap();
        assert_eq!(parsed, entries(&[("flag", ""), ("x", ""), ("", "y")]));
        assert!(parse("", &ParseOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn parse_splits_value_on_first_equals_only() {
        let parsed = parse("expr=a=b", &ParseOptions::default()).unwrap();
        assert_eq!(parsed, entries(&[("expr", "a=b")]));
    }

    #[test]
    fn parse_honours_separator_and_profile() {
        let options = ParseOptions::default()
            .with_separator(";")
            .with_profile(EncodingProfile::Rfc3986);
        let parsed = parse("a=1+1;b=x%20y", &options).unwrap();
        assert_eq!(parsed, entries(&[("a", "1+1"), ("b", "x y")]));

        let parsed = parse("a=1&b=2", &ParseOptions::default().with_separator("")).unwrap();
        assert_eq!(parsed, entries(&[("a", "1&b=2")]));
    }

    #[test]
    fn parse_reports_escape_offset_in_raw_input() {
        assert_eq!(
            parse("ok=1&bad=%4", &ParseOptions::default()),
            Err(DecodeError::MalformedEscape { offset: 9 })
        );
        assert_eq!(
            parse("ok=1&%g=1", &ParseOptions::default()),
            Err(DecodeError::MalformedEscape { offset: 5 })
        );
    }

    #[test]
    fn build_encodes_and_joins() {
        let built = build(&entries(&[("a b", "c&d"), ("e", "~")]), &BuildOptions::default());
        assert_eq!(built, "a+b=c%26d&e=%7E");

        let options = BuildOptions::default()
            .with_separator("&amp;")
            .with_profile(EncodingProfile::Rfc3986);
        let built = build(&entries(&[("a b", "~"), ("c", "")]), &options);
        assert_eq!(built, "a%20b=~&amp;c=");
    }

    #[test]
    fn numeric_prefix_only_touches_numeric_keys() {
        let options = BuildOptions::default().with_numeric_prefix("n_");
        let built = build(&entries(&[("1", "a"), ("1x", "b"), ("", "c")]), &options);
        assert_eq!(built, "n_1=a&1x=b&=c");
    }

    #[test]
    fn flatten_is_depth_first_in_input_order() {
        let inner: QueryMap = [("z", "1"), ("a", "2")].into_iter().collect();
        let value = QueryValue::List(vec![QueryValue::Map(inner), "3".into(), QueryValue::List(vec![])]);
        assert_eq!(
            flatten("k", &value),
            entries(&[("k[0][z]", "1"), ("k[0][a]", "2"), ("k[1]", "3")])
        );
    }

    #[test]
    fn build_nested_prefixes_only_top_level() {
        let mut data = QueryMap::new();
        data.insert("5", QueryValue::List(vec!["x".into()]));
        let built = build_nested(&data, &BuildOptions::default().with_numeric_prefix("p"));
        assert_eq!(built, "p5%5B0%5D=x");
    }

    #[test]
    fn parse_nested_appends_with_next_integer_key() {
        let data = parse_nested("a[5]=x&a[]=y&a[]=z", &ParseOptions::default()).unwrap();
        let a = data.get("a").and_then(QueryValue::as_map).unwrap();
        let keys: Vec<&str> = a.keys().collect();
        assert_eq!(keys, ["5", "6", "7"]);
    }

    #[test]
    fn parse_nested_handles_many_appends() {
        let raw = "a[]=x&".repeat(50_000);
        let data = parse_nested(&raw, &ParseOptions::default()).unwrap();
        let items = data.get("a").and_then(QueryValue::as_list).unwrap();
        assert_eq!(items.len(), 50_000);
        assert_eq!(items[49_999].as_str(), Some("x"));
    }

    #[test]
    fn next_index_follows_the_largest_numeric_key() {
        let mut map = QueryMap::new();
        assert_eq!(map.next_index(), 0);
        map.insert("7", "a");
        map.insert("name", "b");
        map.insert("3", "c");
        map.insert("007", "d");
        assert_eq!(map.next_index(), 8);
        map.insert("18446744073709551615", "max");
        assert_eq!(map.next_index(), u64::MAX);
    }

    #[test]
    fn parse_nested_turns_sequential_keys_into_lists() {
        let data = parse_nested("l[]=a&l[]=b&m[0]=x&m[2]=y&n[1]=p&n[0]=q&z[00]=s", &ParseOptions::default()).unwrap();
        assert_eq!(data.get("l"), Some(&QueryValue::List(vec!["a".into(), "b".into()])));
        assert!(data.get("m").and_then(QueryValue::as_map).is_some());
        assert!(data.get("n").and_then(QueryValue::as_map).is_some());
        assert!(data.get("z").and_then(QueryValue::as_map).is_some());

        let grid = parse_nested("g[0][0]=1&g[0][1]=2&g[1][k]=3", &ParseOptions::default()).unwrap();
        let rows = grid.get("g").and_then(QueryValue::as_list).unwrap();
        assert_eq!(rows[0], QueryValue::List(vec!["1".into(), "2".into()]));
        assert_eq!(rows[1].as_map().and_then(|row| row.get("k")), Some(&QueryValue::from("3")));
    }

    #[test]
    fn parse_nested_inverts_build_nested_for_lists() {
        let mut data = QueryMap::new();
        data.insert("langs", QueryValue::List(vec!["pt".into(), "en".into()]));
        data.insert("0", "top-level stays a map key");
        let back = parse_nested(&build_nested(&data, &BuildOptions::default()), &ParseOptions::default()).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn parse_nested_overwrites_and_keeps_position() {
        let data = parse_nested("a=1&b=2&a=3", &ParseOptions::default()).unwrap();
        let keys: Vec<&str> = data.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(data.get("a").and_then(QueryValue::as_str), Some("3"));
    }

    #[test]
    fn parse_nested_replaces_scalar_with_map() {
        let data = parse_nested("a=1&a[b]=2", &ParseOptions::default()).unwrap();
        let a = data.get("a").and_then(QueryValue::as_map).unwrap();
        assert_eq!(a.get("b").and_then(QueryValue::as_str), Some("2"));
    }

    #[test]
    fn parse_nested_takes_malformed_keys_literally() {
        let data = parse_nested("a[b=1&[x]=2&c[d]e=3", &ParseOptions::default()).unwrap();
        assert_eq!(data.get("a[b").and_then(QueryValue::as_str), Some("1"));
        assert_eq!(data.get("[x]").and_then(QueryValue::as_str), Some("2"));
        let c = data.get("c").and_then(QueryValue::as_map).unwrap();
        assert_eq!(c.get("d").and_then(QueryValue::as_str), Some("3"));
    }

    #[test]
    fn parse_nested_drops_keys_beyond_max_depth() {
        let options = ParseOptions::default().with_max_depth(2);
        let data = parse_nested("a[1][2]=ok&b[1][2][3]=deep", &options).unwrap();
        assert!(data.contains_key("a"));
        assert!(!data.contains_key("b"));
    }

    #[test]
    fn parse_nested_decodes_encoded_brackets() {
        let data = parse_nested("ids%5B0%5D=7&ids%5B1%5D=9", &ParseOptions::default()).unwrap();
        let ids = data.get("ids").and_then(QueryValue::as_list).unwrap();
        assert_eq!(ids, [QueryValue::from("7"), QueryValue::from("9")]);
    }

    fn plain_text() -> impl Strategy<Value = String> {
        "[^\\[\\]]{0,8}"
    }

    /// Nested data in the shape `parse_nested` reproduces: no empty
    /// containers and map keys that are never list indices.
    fn nested_value() -> impl Strategy<Value = QueryValue> {
        let leaf = "[a-zA-Z0-9 &=%+~]{0,6}".prop_map(QueryValue::Scalar);
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 1..4).prop_map(QueryValue::List),
                proptest::collection::vec(("[a-z]{1,4}", inner), 1..4)
                    .prop_map(|pairs| QueryValue::Map(pairs.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn parse_nested_inverts_build_nested(
            pairs in proptest::collection::vec(("[a-z0-9]{1,4}", nested_value()), 0..5)
        ) {
            let data: QueryMap = pairs.into_iter().collect();
            for profile in [EncodingProfile::Rfc1738, EncodingProfile::Rfc3986] {
                let built = build_nested(&data, &BuildOptions::default().with_profile(profile));
                let back = parse_nested(&built, &ParseOptions::default().with_profile(profile)).unwrap();
                prop_assert_eq!(&back, &data);
            }
        }

        #[test]
        fn parse_inverts_build(pairs in proptest::collection::vec((plain_text(), plain_text()), 0..8)) {
            let original: Vec<QueryEntry> = pairs.into_iter().map(QueryEntry::from).collect();
            for profile in [EncodingProfile::Rfc1738, EncodingProfile::Rfc3986] {
                let built = build(&original, &BuildOptions::default().with_profile(profile));
                let parsed = parse(&built, &ParseOptions::default().with_profile(profile)).unwrap();
                prop_assert_eq!(&parsed, &original);
            }
        }
    }
}

//! Percent-encoding for URL components and form data.
//!
//! Two historical rule sets are supported, selected with [`EncodingProfile`]:
//!
//! - [`EncodingProfile::Rfc1738`]: the `application/x-www-form-urlencoded`
//!   flavour. Alphanumerics and `-_.` stay literal, a space becomes `+`.
//! - [`EncodingProfile::Rfc3986`]: the "raw" flavour. Alphanumerics and the
//!   unreserved marks `-_.~` stay literal, a space becomes `%20` and `+` is an
//!   ordinary character.
//!
//! Encoding works byte by byte and never fails. Decoding is its exact left
//! inverse for the same profile.

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::error::DecodeError;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encoding rule set.
///
/// # Examples
///
/// ```
/// use urlkit::url_encode::{encode, EncodingProfile};
///
/// assert_eq!(encode("a b~", EncodingProfile::Rfc1738), "a+b%7E");
/// assert_eq!(encode("a b~", EncodingProfile::Rfc3986), "a%20b~");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EncodingProfile {
    /// Form encoding: space as `+`, `-_.` unreserved.
    #[default]
    Rfc1738,
    /// Raw URL encoding: space as `%20`, `-_.~` unreserved.
    Rfc3986,
}

impl EncodingProfile {
    /// Whether `byte` is emitted literally under this profile.
    #[inline]
    pub fn is_unreserved(self, byte: u8) -> bool {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' => true,
            b'~' => self == EncodingProfile::Rfc3986,
            _ => false,
        }
    }
}

/// Percent-encode a string under the given profile.
///
/// Every byte of the UTF-8 representation that is not alphanumeric or in the
/// profile's unreserved set is written as `%` followed by two upper-case hex
/// digits. Under [`EncodingProfile::Rfc1738`] a space is written as `+`.
///
/// # Arguments
///
/// * `raw` - The text to encode
/// * `profile` - Which rule set to apply
///
/// # Returns
///
/// A new `String` containing only ASCII characters.
///
/// # Examples
///
/// ```
/// use urlkit::url_encode::{encode, EncodingProfile};
///
/// // Basic encoding
/// assert_eq!(encode("hello world", EncodingProfile::Rfc1738), "hello+world");
/// assert_eq!(encode("hello world", EncodingProfile::Rfc3986), "hello%20world");
///
/// // Special characters
/// assert_eq!(encode("hello@world.com", EncodingProfile::Rfc3986), "hello%40world.com");
///
/// // Unicode characters are encoded byte by byte
/// assert_eq!(encode("café", EncodingProfile::Rfc3986), "caf%C3%A9");
/// ```
pub fn encode(raw: &str, profile: EncodingProfile) -> String {
    encode_bytes(raw.as_bytes(), profile)
}

/// Percent-encode an arbitrary byte sequence under the given profile.
///
/// This is the byte-level form of [`encode`]; it accepts input that is not
/// valid UTF-8.
///
/// # Examples
///
/// ```
/// use urlkit::url_encode::{encode_bytes, EncodingProfile};
///
/// assert_eq!(encode_bytes(&[0xff, b'a', 0x00], EncodingProfile::Rfc3986), "%FFa%00");
/// ```
pub fn encode_bytes(raw: &[u8], profile: EncodingProfile) -> String {
    let mut output = String::with_capacity(raw.len());

    for &byte in raw {
        if profile.is_unreserved(byte) {
            output.push(byte as char);
        } else if byte == b' ' && profile == EncodingProfile::Rfc1738 {
            output.push('+');
        } else {
            output.push('%');
            output.push(HEX_UPPER[(byte >> 4) as usize] as char);
            output.push(HEX_UPPER[(byte & 0x0f) as usize] as char);
        }
    }

    output
}

/// Decode a percent-encoded string under the given profile.
///
/// Scans left to right. A `%` must be followed by exactly two hex digits
/// (either case). Under [`EncodingProfile::Rfc1738`] a `+` decodes to a
/// space; under [`EncodingProfile::Rfc3986`] it is kept as is.
///
/// # Arguments
///
/// * `encoded` - The percent-encoded text
/// * `profile` - Which rule set to apply
///
/// # Returns
///
/// * `Ok(String)` - The decoded text
/// * `Err(DecodeError::MalformedEscape { offset })` - A `%` at `offset` without two hex digits
/// * `Err(DecodeError::InvalidUtf8)` - The escapes produced bytes that are not UTF-8
///
/// # Examples
///
/// ```
/// use urlkit::url_encode::{decode, EncodingProfile};
/// use urlkit::DecodeError;
///
/// assert_eq!(decode("a+b", EncodingProfile::Rfc1738), Ok("a b".to_string()));
/// assert_eq!(decode("a+b", EncodingProfile::Rfc3986), Ok("a+b".to_string()));
/// assert_eq!(decode("caf%c3%a9", EncodingProfile::Rfc3986), Ok("café".to_string()));
/// assert_eq!(decode("%2", EncodingProfile::Rfc1738), Err(DecodeError::MalformedEscape { offset: 0 }));
/// ```
pub fn decode(encoded: &str, profile: EncodingProfile) -> Result<String, DecodeError> {
    let bytes = decode_bytes(encoded, profile)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
}

/// Decode a percent-encoded string into raw bytes.
///
/// The exact inverse of [`encode_bytes`]: for every byte sequence `b`,
/// `decode_bytes(&encode_bytes(b, p), p) == Ok(b.to_vec())`.
///
/// # Examples
///
/// ```
/// use urlkit::url_encode::{decode_bytes, EncodingProfile};
///
/// assert_eq!(decode_bytes("%FFa", EncodingProfile::Rfc3986), Ok(vec![0xff, b'a']));
/// ```
pub fn decode_bytes(encoded: &str, profile: EncodingProfile) -> Result<Vec<u8>, DecodeError> {
    let input = encoded.as_bytes();
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            b'%' => {
                let hi = input.get(i + 1).copied().and_then(hex_value);
                let lo = input.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => output.push((hi << 4) | lo),
                    _ => return Err(DecodeError::MalformedEscape { offset: i }),
                }
                i += 3;
            }
            b'+' if profile == EncodingProfile::Rfc1738 => {
                output.push(b' ');
                i += 1;
            }
            byte => {
                output.push(byte);
                i += 1;
            }
        }
    }

    Ok(output)
}

#[inline]
fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

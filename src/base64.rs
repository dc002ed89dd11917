//! MIME base64 with the standard alphabet.
//!
//! Decoding comes in two flavours. The lenient decoder throws away anything
//! outside the alphabet, which is what most mail and form handling wants.
//! The strict decoder rejects such input and checks the padding.

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use crate::error::Base64Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

/// Encode bytes as padded base64 without line breaks.
///
/// # Examples
///
/// ```
/// use urlkit::base64::encode;
///
/// assert_eq!(encode(b"This is an encoded string"), "VGhpcyBpcyBhbiBlbmNvZGVkIHN0cmluZw==");
/// assert_eq!(encode(b""), "");
/// ```
pub fn encode(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        output.push(ALPHABET[(b0 >> 2) as usize] as char);
        output.push(ALPHABET[(((b0 << 4) | (b1 >> 4)) & 0x3f) as usize] as char);
        output.push(if chunk.len() > 1 {
            ALPHABET[(((b1 << 2) | (b2 >> 6)) & 0x3f) as usize] as char
        } else {
            PAD as char
        });
        output.push(if chunk.len() > 2 {
            ALPHABET[(b2 & 0x3f) as usize] as char
        } else {
            PAD as char
        });
    }

    output
}

/// Decode base64 text.
///
/// ASCII whitespace is skipped in both modes. Missing padding is accepted.
///
/// # Arguments
///
/// * `input` - The base64 text
/// * `strict` - Reject bytes outside the alphabet and badly placed padding
///   instead of skipping them
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The decoded bytes
/// * `Err(Base64Error)` - Only in strict mode: the first problem found
///
/// # Examples
///
/// ```
/// use urlkit::base64::decode;
/// use urlkit::Base64Error;
///
/// assert_eq!(decode("aGVs bG8=", true).unwrap(), b"hello");
/// assert_eq!(decode("aGVs*bG8", false).unwrap(), b"hello");
/// assert_eq!(decode("aGVs*bG8", true), Err(Base64Error::InvalidByte { offset: 4 }));
/// ```
pub fn decode(input: &str, strict: bool) -> Result<Vec<u8>, Base64Error> {
    let mut output = Vec::with_capacity(input.len() / 4 * 3 + 3);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    let mut sextets = 0usize;
    let mut padding = 0usize;
    let mut padding_offset = 0usize;
    let mut discarded = 0usize;

    for (offset, &byte) in input.as_bytes().iter().enumerate() {
        if byte.is_ascii_whitespace() {
            continue;
        }

        let value = match sextet(byte) {
            Some(value) => value,
            None if !strict => {
                discarded += 1;
                continue;
            }
            None if byte == PAD => {
                if padding == 0 {
                    padding_offset = offset;
                }
                padding += 1;
                continue;
            }
            None => return Err(Base64Error::InvalidByte { offset }),
        };

        if padding > 0 {
            return Err(Base64Error::InvalidPadding { offset });
        }

        buffer = (buffer << 6) | u32::from(value);
        bits += 6;
        sextets += 1;
        if bits >= 8 {
            bits -= 8;
            output.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    if discarded > 0 {
        tracing::trace!(discarded, "skipped bytes outside the base64 alphabet");
    }

    if sextets % 4 == 1 {
        // Six bits cannot form a byte.
        return if strict { Err(Base64Error::Truncated) } else { Ok(output) };
    }

    if padding > 0 && (padding > 2 || (sextets + padding) % 4 != 0) {
        return Err(Base64Error::InvalidPadding {
            offset: padding_offset,
        });
    }

    Ok(output)
}

#[inline]
fn sextet(byte: u8) -> Option<u8> {
    match byte {
        b'A'..=b'Z' => Some(byte - b'A'),
        b'a'..=b'z' => Some(byte - b'a' + 26),
        b'0'..=b'9' => Some(byte - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_every_padding_length() {
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"foob"), "Zm9vYg==");
        assert_eq!(encode(&[0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn decodes_with_and_without_padding() {
        assert_eq!(decode("Zm9vYg==", true).unwrap(), b"foob");
        assert_eq!(decode("Zm9vYg", true).unwrap(), b"foob");
        assert_eq!(decode("Zm8=", false).unwrap(), b"fo");
        assert_eq!(decode("", true).unwrap(), b"");
    }

    #[test]
    fn whitespace_is_always_skipped() {
        assert_eq!(decode("Zm9v\r\nYmFy\n", true).unwrap(), b"foobar");
        assert_eq!(decode(" Z m 9 v ", false).unwrap(), b"foo");
    }

    #[test]
    fn lenient_mode_discards_foreign_bytes() {
        assert_eq!(decode("Zm9v!!YmFy", false).unwrap(), b"foobar");
        assert_eq!(decode("Zm=9v", false).unwrap(), b"foo");
        assert_eq!(decode("Zm9vY", false).unwrap(), b"foo");
    }

    #[test]
    fn strict_mode_rejects_foreign_bytes() {
        assert_eq!(decode("Zm9v!", true), Err(Base64Error::InvalidByte { offset: 4 }));
        assert_eq!(decode("Zm9v-_", true), Err(Base64Error::InvalidByte { offset: 4 }));
    }

    #[test]
    fn strict_mode_checks_padding() {
        assert_eq!(decode("Zm=9v", true), Err(Base64Error::InvalidPadding { offset: 3 }));
        assert_eq!(decode("Zm9v=", true), Err(Base64Error::InvalidPadding { offset: 4 }));
        assert_eq!(decode("Zg===", true), Err(Base64Error::InvalidPadding { offset: 2 }));
        assert_eq!(decode("Zm9=", true), Ok(b"fo".to_vec()));
    }

    #[test]
    fn strict_mode_rejects_dangling_sextet() {
        assert_eq!(decode("Zm9vY", true), Err(Base64Error::Truncated));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..96)) {
            let encoded = encode(&bytes);
            prop_assert_eq!(encoded.len() % 4, 0);
            prop_assert_eq!(decode(&encoded, true), Ok(bytes.clone()));
            prop_assert_eq!(decode(&encoded, false), Ok(bytes));
        }
    }
}

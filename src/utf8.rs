use alloc::string::String;

#[cfg(feature = "simdutf8")]
use simdutf8::basic as simd_utf8;

use crate::{CborError, ErrorCode};

/// Validates UTF-8 bytes and returns a borrowed `&str` on success.
#[inline]
pub fn validate(bytes: &[u8]) -> Result<&str, ()> {
    #[cfg(feature = "simdutf8")]
    {
        simd_utf8::from_utf8(bytes).map_err(|_| ())
    }

    #[cfg(not(feature = "simdutf8"))]
    {
        core::str::from_utf8(bytes).map_err(|_| ())
    }
}

/// Decodes a text-string payload found for the item at `offset`.
pub fn decode_text(bytes: &[u8], offset: u64) -> Result<String, CborError> {
    validate(bytes)
        .map(String::from)
        .map_err(|()| CborError::new(ErrorCode::Utf8Invalid, offset))
}

/// Decodes a byte-string payload as ASCII; bytes above 0x7f become U+FFFD.
pub fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                char::from(b)
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect()
}

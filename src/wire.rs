//! Positionless big-endian reads over a [`ByteSource`].
//!
//! Every function takes an absolute offset and returns a value; nothing here
//! keeps a cursor.

use crate::source::ByteSource;
use crate::types::{additional_info, AI_INDEFINITE};
use crate::{CborError, ErrorCode};

#[inline]
pub fn advance(offset: u64, n: u64) -> Result<u64, CborError> {
    offset
        .checked_add(n)
        .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset))
}

#[inline]
pub fn read_u8(src: &dyn ByteSource, offset: u64) -> Result<u8, CborError> {
    src.read(offset)
}

fn read_array<const N: usize>(src: &dyn ByteSource, offset: u64) -> Result<[u8; N], CborError> {
    let mut buf = [0u8; N];
    src.read_into(offset, &mut buf)?;
    Ok(buf)
}

pub fn read_be_u16(src: &dyn ByteSource, offset: u64) -> Result<u16, CborError> {
    read_array::<2>(src, offset).map(u16::from_be_bytes)
}

pub fn read_be_u32(src: &dyn ByteSource, offset: u64) -> Result<u32, CborError> {
    read_array::<4>(src, offset).map(u32::from_be_bytes)
}

pub fn read_be_u64(src: &dyn ByteSource, offset: u64) -> Result<u64, CborError> {
    read_array::<8>(src, offset).map(u64::from_be_bytes)
}

/// Number of argument bytes that follow a header with additional info `ai`.
///
/// Indefinite length (31) has no argument bytes; callers decide whether it is legal.
pub const fn argument_size(ai: u8, offset: u64) -> Result<u64, CborError> {
    match ai {
        0..=23 | AI_INDEFINITE => Ok(0),
        24 => Ok(1),
        25 => Ok(2),
        26 => Ok(4),
        27 => Ok(8),
        _ => Err(CborError::new(ErrorCode::ReservedAdditionalInfo, offset)),
    }
}

/// Reads the unsigned argument of the header at `offset` (literal or extended form).
///
/// # Errors
///
/// `ReservedAdditionalInfo` for ai 28..30, `InvalidIndefiniteLength` for ai 31.
pub fn read_argument(src: &dyn ByteSource, offset: u64, head: u8) -> Result<u64, CborError> {
    let ai = additional_info(head);
    let at = advance(offset, 1)?;
    match ai {
        0..=23 => Ok(u64::from(ai)),
        24 => Ok(u64::from(read_u8(src, at)?)),
        25 => Ok(u64::from(read_be_u16(src, at)?)),
        26 => Ok(u64::from(read_be_u32(src, at)?)),
        27 => read_be_u64(src, at),
        AI_INDEFINITE => Err(CborError::new(ErrorCode::InvalidIndefiniteLength, offset)),
        _ => Err(CborError::new(ErrorCode::ReservedAdditionalInfo, offset)),
    }
}

/// Same as [`read_argument`] but yields `None` for the indefinite-length marker.
pub fn read_length(
    src: &dyn ByteSource,
    offset: u64,
    head: u8,
) -> Result<Option<u64>, CborError> {
    if additional_info(head) == AI_INDEFINITE {
        return Ok(None);
    }
    read_argument(src, offset, head).map(Some)
}

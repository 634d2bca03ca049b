use alloc::string::String;
use alloc::vec::Vec;

use crate::{CborError, ErrorCode};

/// Converts a span length into an allocation size, enforcing `limit`.
#[inline]
pub fn extraction_len(len: u64, limit: u64, offset: u64) -> Result<usize, CborError> {
    if len > limit {
        return Err(CborError::new(ErrorCode::UnsupportedExtractionSize, offset));
    }
    usize::try_from(len).map_err(|_| CborError::new(ErrorCode::UnsupportedExtractionSize, offset))
}

#[inline]
pub fn try_reserve_exact<T>(v: &mut Vec<T>, additional: usize, offset: u64) -> Result<(), CborError> {
    v.len()
        .checked_add(additional)
        .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset))?;
    v.try_reserve_exact(additional)
        .map_err(|_| CborError::new(ErrorCode::AllocationFailed, offset))
}

#[inline]
pub fn try_vec_zeroed(len: usize, offset: u64) -> Result<Vec<u8>, CborError> {
    let mut v = Vec::new();
    try_reserve_exact(&mut v, len, offset)?;
    v.resize(len, 0);
    Ok(v)
}

#[inline]
pub fn try_push_str(s: &mut String, chunk: &str, offset: u64) -> Result<(), CborError> {
    s.try_reserve(chunk.len())
        .map_err(|_| CborError::new(ErrorCode::AllocationFailed, offset))?;
    s.push_str(chunk);
    Ok(())
}

#[inline]
pub fn try_extend(v: &mut Vec<u8>, chunk: &[u8], offset: u64) -> Result<(), CborError> {
    v.try_reserve(chunk.len())
        .map_err(|_| CborError::new(ErrorCode::AllocationFailed, offset))?;
    v.extend_from_slice(chunk);
    Ok(())
}

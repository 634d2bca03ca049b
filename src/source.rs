//! Random-access byte sources.
//!
//! A [`ByteSource`] is the only place where bytes enter the decoder. Sources
//! are read by absolute offset and never carry a traversal cursor, so a single
//! source may be shared by any number of decoders and queries. Sources are
//! `Sync`, so decoders and container views built over one can be shared
//! across threads. A source that buffers internally keeps its buffer behind a
//! lock or atomics.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{CborError, ErrorCode};

/// An immutable, indexable byte container.
pub trait ByteSource: Sync {
    /// Reads the byte at absolute `offset`.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if `offset` is past the end of the source, or
    /// any error the underlying storage reports.
    fn read(&self, offset: u64) -> Result<u8, CborError>;

    /// Fills `buf` with the bytes starting at absolute `offset`.
    ///
    /// The default implementation composes single-byte reads; contiguous
    /// sources override it with a bulk copy.
    ///
    /// # Errors
    ///
    /// Returns an error if any byte of the span cannot be read.
    fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<(), CborError> {
        let mut pos = offset;
        for slot in buf.iter_mut() {
            *slot = self.read(pos)?;
            pos = pos
                .checked_add(1)
                .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, pos))?;
        }
        Ok(())
    }

    /// Total length of the source, if known.
    fn len_hint(&self) -> Option<u64> {
        None
    }
}

impl ByteSource for [u8] {
    #[inline]
    fn read(&self, offset: u64) -> Result<u8, CborError> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.get(i))
            .copied()
            .ok_or_else(|| CborError::new(ErrorCode::UnexpectedEof, offset))
    }

    fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<(), CborError> {
        let eof = || CborError::new(ErrorCode::UnexpectedEof, offset);
        let start = usize::try_from(offset).map_err(|_| eof())?;
        let end = start.checked_add(buf.len()).ok_or_else(eof)?;
        let src = self.get(start..end).ok_or_else(eof)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    #[inline]
    fn len_hint(&self) -> Option<u64> {
        u64::try_from(self.len()).ok()
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    #[inline]
    fn read(&self, offset: u64) -> Result<u8, CborError> {
        self.as_slice().read(offset)
    }

    fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<(), CborError> {
        self.as_slice().read_into(offset, buf)
    }

    fn len_hint(&self) -> Option<u64> {
        self.as_slice().len_hint()
    }
}

impl ByteSource for Vec<u8> {
    #[inline]
    fn read(&self, offset: u64) -> Result<u8, CborError> {
        self.as_slice().read(offset)
    }

    fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<(), CborError> {
        self.as_slice().read_into(offset, buf)
    }

    fn len_hint(&self) -> Option<u64> {
        self.as_slice().len_hint()
    }
}

macro_rules! forward_byte_source {
    ($($ty:ty $(: $extra:path)?),* $(,)?) => {
        $(
            impl<T: ByteSource $(+ $extra)? + ?Sized> ByteSource for $ty {
                #[inline]
                fn read(&self, offset: u64) -> Result<u8, CborError> {
                    (**self).read(offset)
                }

                fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<(), CborError> {
                    (**self).read_into(offset, buf)
                }

                fn len_hint(&self) -> Option<u64> {
                    (**self).len_hint()
                }
            }
        )*
    };
}

forward_byte_source!(&T, Box<T>, Arc<T>: Send);

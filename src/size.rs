//! Byte-span and element-count computation.
//!
//! These functions answer "how many bytes does the item at this offset
//! occupy" and "how many elements does this container hold" by walking
//! headers only. Payloads are never decoded; nested containers are descended
//! only as far as needed to find where they end. Every function is a pure
//! function of `(source, offset)`, so repeating a scan always yields the same
//! answer.

use crate::source::ByteSource;
use crate::types::{additional_info, MajorType, AI_INDEFINITE, BREAK_MARKER};
use crate::wire::{advance, argument_size, read_argument, read_length, read_u8};
use crate::{CborError, ErrorCode};

/// Header size (initial byte plus argument bytes) of the item at `offset`.
pub fn head_byte_size(src: &dyn ByteSource, offset: u64) -> Result<u64, CborError> {
    let head = read_u8(src, offset)?;
    Ok(1 + argument_size(additional_info(head), offset)?)
}

/// Total encoded size of the item at `offset`, dispatching on `major`.
///
/// When the source reports its length, an item whose declared span runs past
/// the end is `UnexpectedEof` at the source length.
pub fn byte_size(
    src: &dyn ByteSource,
    major: MajorType,
    offset: u64,
    max_depth: usize,
) -> Result<u64, CborError> {
    let head = read_u8(src, offset)?;
    let size = Sizer { src, max_depth }.size_of(major, offset, head, 0)?;
    if let Some(total) = src.len_hint() {
        if advance(offset, size)? > total {
            return Err(CborError::new(ErrorCode::UnexpectedEof, total));
        }
    }
    Ok(size)
}

/// Number of elements of the container at `offset`: items for a sequence,
/// key/value pairs for a dictionary.
pub fn element_count(
    src: &dyn ByteSource,
    offset: u64,
    max_depth: usize,
) -> Result<u64, CborError> {
    let head = read_u8(src, offset)?;
    let per_entry = match MajorType::from_head(head) {
        MajorType::Sequence => 1,
        MajorType::Dictionary => 2,
        _ => return Err(CborError::type_mismatch(offset)),
    };
    if let Some(n) = read_length(src, offset, head)? {
        return Ok(n);
    }

    let sizer = Sizer { src, max_depth };
    let mut pos = advance(offset, 1)?;
    let mut items = 0u64;
    loop {
        let h = read_u8(src, pos)?;
        if h == BREAK_MARKER {
            if per_entry == 2 && items % 2 != 0 {
                return Err(CborError::new(ErrorCode::UnexpectedBreak, pos));
            }
            return Ok(items / per_entry);
        }
        pos = advance(pos, sizer.size_of(MajorType::from_head(h), pos, h, 1)?)?;
        items += 1;
    }
}

struct Sizer<'a> {
    src: &'a dyn ByteSource,
    max_depth: usize,
}

impl Sizer<'_> {
    fn size_of(&self, major: MajorType, offset: u64, head: u8, depth: usize) -> Result<u64, CborError> {
        match major {
            MajorType::UnsignedInteger | MajorType::NegativeInteger => int_size(head, offset),
            MajorType::ByteString | MajorType::TextString => self.string_size(major, offset, head),
            MajorType::Sequence => self.container_size(offset, head, 1, depth),
            MajorType::Dictionary => self.container_size(offset, head, 2, depth),
            MajorType::SemanticTag => self.tag_size(offset, head, depth),
            MajorType::FloatingPointOrSimple => simple_size(head, offset),
        }
    }

    fn item_size(&self, offset: u64, depth: usize) -> Result<u64, CborError> {
        let head = read_u8(self.src, offset)?;
        self.size_of(MajorType::from_head(head), offset, head, depth)
    }

    const fn ensure_depth(&self, next_depth: usize, offset: u64) -> Result<(), CborError> {
        if next_depth > self.max_depth {
            return Err(CborError::new(ErrorCode::DepthLimitExceeded, offset));
        }
        Ok(())
    }

    fn string_size(&self, major: MajorType, offset: u64, head: u8) -> Result<u64, CborError> {
        if let Some(len) = read_length(self.src, offset, head)? {
            let header = 1 + argument_size(additional_info(head), offset)?;
            return header
                .checked_add(len)
                .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset));
        }

        let mut pos = advance(offset, 1)?;
        loop {
            let h = read_u8(self.src, pos)?;
            if h == BREAK_MARKER {
                return Ok(advance(pos, 1)? - offset);
            }
            if MajorType::from_head(h) != major || additional_info(h) == AI_INDEFINITE {
                return Err(CborError::new(ErrorCode::MalformedIndefiniteString, pos));
            }
            pos = advance(pos, self.string_size(major, pos, h)?)?;
        }
    }

    fn container_size(
        &self,
        offset: u64,
        head: u8,
        per_entry: u64,
        depth: usize,
    ) -> Result<u64, CborError> {
        self.ensure_depth(depth + 1, offset)?;

        match read_length(self.src, offset, head)? {
            Some(n) => {
                let items = n
                    .checked_mul(per_entry)
                    .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset))?;
                let mut pos = advance(offset, 1 + argument_size(additional_info(head), offset)?)?;
                for _ in 0..items {
                    pos = advance(pos, self.item_size(pos, depth + 1)?)?;
                }
                Ok(pos - offset)
            }
            None => {
                let mut pos = advance(offset, 1)?;
                let mut items = 0u64;
                loop {
                    if read_u8(self.src, pos)? == BREAK_MARKER {
                        if items % per_entry != 0 {
                            return Err(CborError::new(ErrorCode::UnexpectedBreak, pos));
                        }
                        return Ok(advance(pos, 1)? - offset);
                    }
                    pos = advance(pos, self.item_size(pos, depth + 1)?)?;
                    items += 1;
                }
            }
        }
    }

    fn tag_size(&self, offset: u64, head: u8, depth: usize) -> Result<u64, CborError> {
        // Validates the tag number encoding (rejects ai 28..31).
        read_argument(self.src, offset, head)?;
        self.ensure_depth(depth + 1, offset)?;
        let header = 1 + argument_size(additional_info(head), offset)?;
        let inner = self.item_size(advance(offset, header)?, depth + 1)?;
        header
            .checked_add(inner)
            .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset))
    }
}

const fn int_size(head: u8, offset: u64) -> Result<u64, CborError> {
    let ai = additional_info(head);
    if ai == AI_INDEFINITE {
        return Err(CborError::new(ErrorCode::InvalidIndefiniteLength, offset));
    }
    match argument_size(ai, offset) {
        Ok(n) => Ok(1 + n),
        Err(e) => Err(e),
    }
}

const fn simple_size(head: u8, offset: u64) -> Result<u64, CborError> {
    let ai = additional_info(head);
    if ai == AI_INDEFINITE {
        return Err(CborError::new(ErrorCode::UnexpectedBreak, offset));
    }
    match argument_size(ai, offset) {
        Ok(n) => Ok(1 + n),
        Err(e) => Err(e),
    }
}

//! Indexed views over sequences and dictionaries.
//!
//! A view scans its container once, recording the absolute offset of every
//! element in an [`IndexTable`], and then answers positional lookups from the
//! table. Tables are split into shards so that a huge container never needs a
//! single contiguous allocation.

use alloc::vec::Vec;

use crate::alloc_util::try_reserve_exact;
use crate::decoder::Decoder;
use crate::query::{KeyMatcher, MatchMode};
use crate::tag::TagRegistry;
use crate::types::{MajorType, BREAK_MARKER};
use crate::value::Value;
use crate::wire::{advance, read_length};
use crate::{CborError, ErrorCode};

/// Sharded table of element offsets in scan order.
#[derive(Debug, Clone)]
pub struct IndexTable {
    shards: Vec<Vec<u64>>,
    shard_len: usize,
    len: u64,
}

impl IndexTable {
    /// Scans `items` elements starting at `first` (or up to the break marker
    /// when `items` is `None`), recording each element's offset.
    ///
    /// # Errors
    ///
    /// Errors raised while skipping elements, `UnexpectedBreak` if an
    /// indefinite container holds a number of items not divisible by
    /// `per_entry`.
    pub fn scan(
        decoder: &Decoder<'_>,
        first: u64,
        items: Option<u64>,
        per_entry: u64,
    ) -> Result<Self, CborError> {
        let mut table = Self {
            shards: Vec::new(),
            shard_len: decoder.limits().shard_len(),
            len: 0,
        };

        let mut pos = first;
        match items {
            Some(n) => {
                for _ in 0..n {
                    table.push(pos)?;
                    pos = decoder.skip(pos)?;
                }
            }
            None => loop {
                if decoder.read_uint8(pos)? == BREAK_MARKER {
                    if table.len % per_entry != 0 {
                        return Err(CborError::new(ErrorCode::UnexpectedBreak, pos));
                    }
                    break;
                }
                table.push(pos)?;
                pos = decoder.skip(pos)?;
            },
        }
        Ok(table)
    }

    fn push(&mut self, offset: u64) -> Result<(), CborError> {
        let needs_shard = self
            .shards
            .last()
            .map_or(true, |s| s.len() >= self.shard_len);
        if needs_shard {
            try_reserve_exact(&mut self.shards, 1, offset)?;
            self.shards.push(Vec::new());
        }
        if let Some(shard) = self.shards.last_mut() {
            shard
                .try_reserve(1)
                .map_err(|_| CborError::new(ErrorCode::AllocationFailed, offset))?;
            shard.push(offset);
        }
        self.len += 1;
        Ok(())
    }

    /// Number of recorded offsets.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset recorded at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: u64) -> Option<u64> {
        if index >= self.len {
            return None;
        }
        let shard_len = self.shard_len as u64;
        let shard = usize::try_from(index / shard_len).ok()?;
        let slot = usize::try_from(index % shard_len).ok()?;
        self.shards.get(shard)?.get(slot).copied()
    }

    /// Number of shards currently allocated.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

fn scan_container(
    decoder: &Decoder<'_>,
    offset: u64,
    expected: MajorType,
    per_entry: u64,
) -> Result<IndexTable, CborError> {
    let head = decoder.read_uint8(offset)?;
    if MajorType::from_head(head) != expected {
        return Err(CborError::type_mismatch(offset));
    }
    let count = read_length(decoder.source(), offset, head)?;
    let items = match count {
        Some(n) => Some(
            n.checked_mul(per_entry)
                .ok_or_else(|| CborError::new(ErrorCode::LengthOverflow, offset))?,
        ),
        None => None,
    };
    let first = advance(offset, decoder.head_byte_size(offset)?)?;
    IndexTable::scan(decoder, first, items, per_entry)
}

/// An indexed view of a sequence (CBOR array).
#[derive(Debug, Clone)]
pub struct Sequence<'a> {
    decoder: Decoder<'a>,
    registry: &'a TagRegistry,
    offset: u64,
    table: IndexTable,
}

impl<'a> Sequence<'a> {
    pub(crate) fn build(
        decoder: Decoder<'a>,
        registry: &'a TagRegistry,
        offset: u64,
    ) -> Result<Self, CborError> {
        let table = scan_container(&decoder, offset, MajorType::Sequence, 1)?;
        Ok(Self {
            decoder,
            registry,
            offset,
            table,
        })
    }

    /// Offset of the sequence header.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.table.len()
    }

    /// Returns true if the sequence has no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Offset of element `index`, or `None` if out of range.
    #[must_use]
    pub fn offset_of(&self, index: u64) -> Option<u64> {
        self.table.get(index)
    }

    /// Element `index` as a value handle, or `None` if out of range.
    ///
    /// # Errors
    ///
    /// Errors raised while classifying the element.
    pub fn get(&self, index: u64) -> Result<Option<Value<'a>>, CborError> {
        self.offset_of(index)
            .map(|off| Value::at(self.decoder, self.registry, off))
            .transpose()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Value<'a>, CborError>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).transpose())
    }
}

/// An indexed view of a dictionary (CBOR map).
///
/// Slot `2k` of the table is the k-th key and slot `2k + 1` its value.
#[derive(Debug, Clone)]
pub struct Dictionary<'a> {
    decoder: Decoder<'a>,
    registry: &'a TagRegistry,
    offset: u64,
    table: IndexTable,
}

impl<'a> Dictionary<'a> {
    pub(crate) fn build(
        decoder: Decoder<'a>,
        registry: &'a TagRegistry,
        offset: u64,
    ) -> Result<Self, CborError> {
        let table = scan_container(&decoder, offset, MajorType::Dictionary, 2)?;
        Ok(Self {
            decoder,
            registry,
            offset,
            table,
        })
    }

    /// Offset of the dictionary header.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of key/value pairs.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.table.len() / 2
    }

    /// Returns true if the dictionary has no pairs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Offset of the key of pair `index`.
    #[must_use]
    pub fn key_offset(&self, index: u64) -> Option<u64> {
        self.table.get(index.checked_mul(2)?)
    }

    /// Offset of the value of pair `index`.
    #[must_use]
    pub fn value_offset(&self, index: u64) -> Option<u64> {
        self.table.get(index.checked_mul(2)?.checked_add(1)?)
    }

    /// Key of pair `index`.
    ///
    /// # Errors
    ///
    /// Errors raised while classifying the key.
    pub fn key(&self, index: u64) -> Result<Option<Value<'a>>, CborError> {
        self.key_offset(index)
            .map(|off| Value::at(self.decoder, self.registry, off))
            .transpose()
    }

    /// Value of pair `index`.
    ///
    /// # Errors
    ///
    /// Errors raised while classifying the value.
    pub fn value(&self, index: u64) -> Result<Option<Value<'a>>, CborError> {
        self.value_offset(index)
            .map(|off| Value::at(self.decoder, self.registry, off))
            .transpose()
    }

    /// Key and value of pair `index`.
    ///
    /// # Errors
    ///
    /// Errors raised while classifying either item.
    pub fn get(&self, index: u64) -> Result<Option<(Value<'a>, Value<'a>)>, CborError> {
        match (self.key(index)?, self.value(index)?) {
            (Some(k), Some(v)) => Ok(Some((k, v))),
            _ => Ok(None),
        }
    }

    /// Iterates over key/value pairs in encoded order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = Result<(Value<'a>, Value<'a>), CborError>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).transpose())
    }

    /// Searches the dictionary and returns the offset selected by `mode`.
    ///
    /// In [`MatchMode::Value`] and [`MatchMode::Key`] the key slots are tested
    /// in order; the value offset is resolved by skipping the matched key. In
    /// [`MatchMode::SkipFirstKey`] the first key is passed over and the value
    /// slots are tested instead. First match wins; `None` if nothing matches.
    ///
    /// # Errors
    ///
    /// Errors raised while decoding candidates or by a predicate matcher.
    pub fn find(&self, matcher: &KeyMatcher, mode: MatchMode) -> Result<Option<u64>, CborError> {
        let slot_base = u64::from(mode == MatchMode::SkipFirstKey);
        for k in 0..self.len() {
            let Some(candidate) = self.table.get(2 * k + slot_base) else {
                break;
            };
            let value = Value::at(self.decoder, self.registry, candidate)?;
            if !matcher.matches(&value)? {
                continue;
            }
            return match mode {
                MatchMode::Key | MatchMode::SkipFirstKey => Ok(Some(candidate)),
                MatchMode::Value => self.decoder.skip(candidate).map(Some),
            };
        }
        Ok(None)
    }
}

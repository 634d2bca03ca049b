//! Lazy value handles and decoded numeric types.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use crate::container::{Dictionary, Sequence};
use crate::decoder::Decoder;
use crate::tag::{TagRegistry, TagValue};
use crate::types::{MajorType, ValueType};
use crate::wire::advance;
use crate::CborError;

/// A decoded CBOR integer.
///
/// Literal and 1/2/4-byte forms are `Small`; the full 8-byte extended form is
/// `Big`, covering `-2^64..=2^64-1`. Equality and ordering compare the numeric
/// value, so `Small(5) == Big(5)`.
#[derive(Debug, Clone, Copy)]
pub enum Integer {
    /// A value decoded from a header narrower than 8 argument bytes.
    Small(i64),
    /// A value decoded from the 8-byte extended form.
    Big(i128),
}

impl Integer {
    /// The value as `i128`; always exact.
    #[must_use]
    pub const fn as_i128(self) -> i128 {
        match self {
            Self::Small(v) => v as i128,
            Self::Big(v) => v,
        }
    }

    /// The value as `i64`, if it fits.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        i64::try_from(self.as_i128()).ok()
    }

    /// The value as `u64`, if it fits.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        u64::try_from(self.as_i128()).ok()
    }

    /// Returns true for the 8-byte extended form.
    #[must_use]
    pub const fn is_big(self) -> bool {
        matches!(self, Self::Big(_))
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.as_i128() == other.as_i128()
    }
}

impl Eq for Integer {}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_i128().cmp(&other.as_i128())
    }
}

impl Hash for Integer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_i128().hash(state);
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Self::Small(v)
    }
}

impl From<u64> for Integer {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::Big(i128::from(v)), Self::Small)
    }
}

/// A decoded number: integer or float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Major type 0 or 1.
    Int(Integer),
    /// Half, single or double precision float, widened to `f64`.
    Float(f64),
}

impl Number {
    /// The number as `f64` (integers may round).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i.as_i128() as f64,
            Self::Float(f) => f,
        }
    }

    /// The integer, if this is one.
    #[must_use]
    pub const fn as_integer(self) -> Option<Integer> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(_) => None,
        }
    }
}

/// A lazy handle to one CBOR item.
///
/// The handle records where the item is and what it is; every accessor
/// decodes from the source again. Handles are cheap to copy and carry no
/// decoded payload.
#[derive(Debug, Clone, Copy)]
pub struct Value<'a> {
    major: MajorType,
    value_type: ValueType,
    offset: u64,
    len: u64,
    decoder: Decoder<'a>,
    registry: &'a TagRegistry,
}

impl<'a> Value<'a> {
    pub(crate) fn at(
        decoder: Decoder<'a>,
        registry: &'a TagRegistry,
        offset: u64,
    ) -> Result<Self, CborError> {
        let head = decoder.read_uint8(offset)?;
        let major = MajorType::from_head(head);
        let value_type = ValueType::classify(head, offset)?;
        let len = decoder.length(major, offset)?;
        Ok(Self::from_parts(
            major, value_type, offset, len, decoder, registry,
        ))
    }

    pub(crate) const fn from_parts(
        major: MajorType,
        value_type: ValueType,
        offset: u64,
        len: u64,
        decoder: Decoder<'a>,
        registry: &'a TagRegistry,
    ) -> Self {
        Self {
            major,
            value_type,
            offset,
            len,
            decoder,
            registry,
        }
    }

    /// Major type of the item.
    #[must_use]
    pub const fn major_type(&self) -> MajorType {
        self.major
    }

    /// Value type of the item.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Absolute offset of the item's header.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Encoded length of the item in bytes.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the encoded length is zero, which no decoded item has.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The decoder this handle reads through.
    #[must_use]
    pub const fn decoder(&self) -> Decoder<'a> {
        self.decoder
    }

    /// The tag registry this handle dispatches through.
    #[must_use]
    pub const fn registry(&self) -> &'a TagRegistry {
        self.registry
    }

    /// Returns true if the item is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value_type == ValueType::Null
    }

    /// Decodes the item as a number.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the item is neither an integer nor a float.
    pub fn number(&self) -> Result<Option<Number>, CborError> {
        match self.value_type {
            ValueType::UInt | ValueType::NInt | ValueType::Float | ValueType::Null => {
                self.decoder.read_number(self.value_type, self.offset)
            }
            _ => Err(CborError::type_mismatch(self.offset)),
        }
    }

    /// Decodes the item as a signed integer.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_int`].
    pub fn integer(&self) -> Result<Option<Integer>, CborError> {
        self.decoder.read_int(self.offset)
    }

    /// Decodes the unsigned argument of an integer item.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_uint`].
    pub fn uint(&self) -> Result<Option<Integer>, CborError> {
        self.decoder.read_uint(self.offset)
    }

    /// Decodes the item as a float.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_float`].
    pub fn float(&self) -> Result<Option<f64>, CborError> {
        self.decoder.read_float(self.offset)
    }

    /// Decodes the item as a string.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_string`].
    pub fn string(&self) -> Result<Option<String>, CborError> {
        self.decoder.read_string(self.offset)
    }

    /// Payload bytes of a byte or text string.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_bytes`].
    pub fn bytes(&self) -> Result<Option<Vec<u8>>, CborError> {
        self.decoder.read_bytes(self.offset)
    }

    /// Decodes the item as a boolean.
    ///
    /// # Errors
    ///
    /// `IllegalBooleanEncoding` for anything but `false`/`true`.
    pub fn boolean(&self) -> Result<bool, CborError> {
        self.decoder.boolean_value(self.offset)
    }

    /// Indexed view of a sequence; `None` for `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for other types.
    pub fn sequence(&self) -> Result<Option<Sequence<'a>>, CborError> {
        self.decoder.read_sequence(self.offset, self.registry)
    }

    /// Indexed view of a dictionary; `None` for `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for other types.
    pub fn dictionary(&self) -> Result<Option<Dictionary<'a>>, CborError> {
        self.decoder.read_dictionary(self.offset, self.registry)
    }

    /// Tag number of a semantic tag.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the item is not a tag.
    pub fn tag_number(&self) -> Result<u64, CborError> {
        self.decoder.tag_number(self.offset)
    }

    /// The item wrapped by a semantic tag.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the item is not a tag.
    pub fn tagged_item(&self) -> Result<Value<'a>, CborError> {
        if self.major != MajorType::SemanticTag {
            return Err(CborError::type_mismatch(self.offset));
        }
        let inner = advance(self.offset, self.decoder.head_byte_size(self.offset)?)?;
        Self::at(self.decoder, self.registry, inner)
    }

    /// Reinterprets the item through the first matching registered tag
    /// decoder; `None` if no decoder handles it.
    ///
    /// # Errors
    ///
    /// Errors raised by the matching decoder.
    pub fn tag(&self) -> Result<Option<TagValue>, CborError> {
        self.registry.apply(self)
    }

    /// The raw encoded bytes of the item, header included.
    ///
    /// # Errors
    ///
    /// `UnsupportedExtractionSize` if the item is larger than the extraction limit.
    pub fn raw(&self) -> Result<Vec<u8>, CborError> {
        self.decoder.read_raw(self.offset, self.len)
    }

    /// SHA-256 digest of the item's raw encoded bytes.
    ///
    /// # Errors
    ///
    /// See [`Value::raw`].
    #[cfg(feature = "sha2")]
    pub fn sha256(&self) -> Result<[u8; 32], CborError> {
        use sha2::{Digest, Sha256};

        let raw = self.raw()?;
        let mut hasher = Sha256::new();
        hasher.update(&raw);
        Ok(hasher.finalize().into())
    }
}

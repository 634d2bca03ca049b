//! Header-byte classification.
//!
//! A CBOR header byte is `major << 5 | additional_info`. [`MajorType`] is the
//! coarse 3-bit category; [`ValueType`] refines it (float widths, booleans,
//! null/undefined) and [`TypeSpec`] is the hierarchical pattern used by
//! type-assert query steps.

use crate::{CborError, ErrorCode};

/// Mask selecting the additional-info bits of a header byte.
pub const ADDITIONAL_INFO_MASK: u8 = 0x1f;
/// Additional info announcing an indefinite length.
pub const AI_INDEFINITE: u8 = 31;
/// The break marker terminating indefinite-length items.
pub const BREAK_MARKER: u8 = 0xff;

/// Simple value `false` (major 7).
pub const SIMPLE_FALSE: u8 = 20;
/// Simple value `true` (major 7).
pub const SIMPLE_TRUE: u8 = 21;
/// Simple value `null` (major 7).
pub const SIMPLE_NULL: u8 = 22;
/// Simple value `undefined` (major 7).
pub const SIMPLE_UNDEFINED: u8 = 23;
/// Half-precision float (major 7).
pub const FLOAT_HALF: u8 = 25;
/// Single-precision float (major 7).
pub const FLOAT_SINGLE: u8 = 26;
/// Double-precision float (major 7).
pub const FLOAT_DOUBLE: u8 = 27;

/// The eight CBOR major types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorType {
    /// Major type 0.
    UnsignedInteger,
    /// Major type 1.
    NegativeInteger,
    /// Major type 2.
    ByteString,
    /// Major type 3.
    TextString,
    /// Major type 4 (array).
    Sequence,
    /// Major type 5 (map).
    Dictionary,
    /// Major type 6.
    SemanticTag,
    /// Major type 7.
    FloatingPointOrSimple,
}

impl MajorType {
    /// Classifies a header byte.
    #[inline]
    #[must_use]
    pub const fn from_head(head: u8) -> Self {
        match head >> 5 {
            0 => Self::UnsignedInteger,
            1 => Self::NegativeInteger,
            2 => Self::ByteString,
            3 => Self::TextString,
            4 => Self::Sequence,
            5 => Self::Dictionary,
            6 => Self::SemanticTag,
            _ => Self::FloatingPointOrSimple,
        }
    }

    /// The numeric major type (0..=7).
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns true for byte and text strings.
    #[inline]
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::ByteString | Self::TextString)
    }

    /// Returns true for sequences and dictionaries.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Sequence | Self::Dictionary)
    }
}

/// Returns the additional-info field of a header byte.
#[inline]
#[must_use]
pub const fn additional_info(head: u8) -> u8 {
    head & ADDITIONAL_INFO_MASK
}

/// Returns true if `head` is the CBOR `null` simple value.
#[inline]
#[must_use]
pub const fn is_null(head: u8) -> bool {
    matches!(MajorType::from_head(head), MajorType::FloatingPointOrSimple)
        && additional_info(head) == SIMPLE_NULL
}

/// Finer-grained value classification derived from a header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Unsigned integer (major 0).
    UInt,
    /// Negative integer (major 1).
    NInt,
    /// Byte string (major 2).
    ByteString,
    /// Text string (major 3).
    TextString,
    /// Array (major 4).
    Sequence,
    /// Map (major 5).
    Dictionary,
    /// Semantic tag (major 6).
    Tag,
    /// Half, single or double precision float.
    Float,
    /// `false` or `true`.
    Bool,
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Any other simple value (ai 0..=19 or the one-byte form).
    Simple,
}

impl ValueType {
    /// Classifies a header byte found at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `ReservedAdditionalInfo` for ai 28..30 under major 7 and
    /// `UnexpectedBreak` for the break marker.
    pub const fn classify(head: u8, offset: u64) -> Result<Self, CborError> {
        let vt = match MajorType::from_head(head) {
            MajorType::UnsignedInteger => Self::UInt,
            MajorType::NegativeInteger => Self::NInt,
            MajorType::ByteString => Self::ByteString,
            MajorType::TextString => Self::TextString,
            MajorType::Sequence => Self::Sequence,
            MajorType::Dictionary => Self::Dictionary,
            MajorType::SemanticTag => Self::Tag,
            MajorType::FloatingPointOrSimple => match additional_info(head) {
                SIMPLE_FALSE | SIMPLE_TRUE => Self::Bool,
                SIMPLE_NULL => Self::Null,
                SIMPLE_UNDEFINED => Self::Undefined,
                FLOAT_HALF | FLOAT_SINGLE | FLOAT_DOUBLE => Self::Float,
                28..=30 => return Err(CborError::new(ErrorCode::ReservedAdditionalInfo, offset)),
                AI_INDEFINITE => return Err(CborError::new(ErrorCode::UnexpectedBreak, offset)),
                _ => Self::Simple,
            },
        };
        Ok(vt)
    }
}

/// A type pattern checked by type-assert steps.
///
/// Patterns are hierarchical: `Number` covers every integer and float,
/// `Int` covers both integer signs, `String` covers byte and text strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    /// Any value.
    Any,
    /// Integer or float.
    Number,
    /// Unsigned or negative integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Negative integer.
    NInt,
    /// Any float width.
    Float,
    /// Byte or text string.
    String,
    /// Byte string.
    ByteString,
    /// Text string.
    TextString,
    /// Array.
    Sequence,
    /// Map.
    Dictionary,
    /// Boolean.
    Bool,
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Other simple values.
    Simple,
    /// A semantic tag; `Some(n)` restricts the tag number.
    Tag(Option<u64>),
}

impl TypeSpec {
    /// Returns true if a value of `value_type` (and, for tags, `tag_number`) matches this pattern.
    #[must_use]
    pub const fn matches(self, value_type: ValueType, tag_number: Option<u64>) -> bool {
        match self {
            Self::Any => true,
            Self::Number => matches!(
                value_type,
                ValueType::UInt | ValueType::NInt | ValueType::Float
            ),
            Self::Int => matches!(value_type, ValueType::UInt | ValueType::NInt),
            Self::UInt => matches!(value_type, ValueType::UInt),
            Self::NInt => matches!(value_type, ValueType::NInt),
            Self::Float => matches!(value_type, ValueType::Float),
            Self::String => matches!(value_type, ValueType::ByteString | ValueType::TextString),
            Self::ByteString => matches!(value_type, ValueType::ByteString),
            Self::TextString => matches!(value_type, ValueType::TextString),
            Self::Sequence => matches!(value_type, ValueType::Sequence),
            Self::Dictionary => matches!(value_type, ValueType::Dictionary),
            Self::Bool => matches!(value_type, ValueType::Bool),
            Self::Null => matches!(value_type, ValueType::Null),
            Self::Undefined => matches!(value_type, ValueType::Undefined),
            Self::Simple => matches!(value_type, ValueType::Simple),
            Self::Tag(None) => matches!(value_type, ValueType::Tag),
            Self::Tag(Some(expected)) => match (value_type, tag_number) {
                (ValueType::Tag, Some(n)) => n == expected,
                _ => false,
            },
        }
    }
}

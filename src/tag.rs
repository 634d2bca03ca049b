//! Semantic tag dispatch.
//!
//! A [`TagRegistry`] is an ordered list of [`TagDecoder`]s. When a value is
//! reinterpreted, the decoders are asked in registration order whether they
//! handle it; the first one that does produces the [`TagValue`]. If none
//! does, the raw value stands.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::decoder::Decoder;
use crate::types::{MajorType, ValueType, AI_INDEFINITE};
use crate::value::{Number, Value};
use crate::wire::advance;
use crate::{CborError, ErrorCode};

/// Standard date/time string.
pub const TAG_DATE_TIME: u64 = 0;
/// Epoch-based date/time.
pub const TAG_EPOCH: u64 = 1;
/// Unsigned bignum.
pub const TAG_POS_BIGNUM: u64 = 2;
/// Negative bignum.
pub const TAG_NEG_BIGNUM: u64 = 3;
/// Encoded CBOR data item.
pub const TAG_ENCODED_CBOR: u64 = 24;
/// URI text.
pub const TAG_URI: u64 = 32;
/// Self-described CBOR magic.
pub const TAG_SELF_DESCRIBED: u64 = 55_799;

/// A registered reinterpretation of tagged (or otherwise recognizable) values.
pub trait TagDecoder: Send + Sync {
    /// Returns true if this decoder reinterprets the item at `offset`.
    ///
    /// # Errors
    ///
    /// Decode errors while inspecting the item.
    fn handles(&self, decoder: &Decoder<'_>, offset: u64) -> Result<bool, CborError>;

    /// Reinterprets `value`. Only called after [`TagDecoder::handles`]
    /// returned true for the same offset.
    ///
    /// # Errors
    ///
    /// `InvalidTagContent` or decode errors.
    fn process(&self, value: &Value<'_>) -> Result<TagValue, CborError>;
}

/// The result of a tag decoder.
pub enum TagValue {
    /// Tag 0: an RFC 3339 date/time string.
    DateTime(String),
    /// Tag 1: seconds since the epoch.
    Timestamp(Number),
    /// Tags 2 and 3.
    BigNum(BigNum),
    /// Tag 24: absolute span of the embedded CBOR bytes.
    EncodedCbor {
        /// First byte of the embedded item.
        offset: u64,
        /// Length of the embedded bytes.
        len: u64,
    },
    /// Tag 32.
    Uri(String),
    /// Tag 55799: offset of the wrapped item.
    SelfDescribed(u64),
    /// Output of a user-registered decoder.
    Custom(Box<dyn Any + Send + Sync>),
}

impl TagValue {
    /// Downcasts a [`TagValue::Custom`] payload.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Custom(b) => b.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(s) => f.debug_tuple("DateTime").field(s).finish(),
            Self::Timestamp(n) => f.debug_tuple("Timestamp").field(n).finish(),
            Self::BigNum(b) => f.debug_tuple("BigNum").field(b).finish(),
            Self::EncodedCbor { offset, len } => f
                .debug_struct("EncodedCbor")
                .field("offset", offset)
                .field("len", len)
                .finish(),
            Self::Uri(s) => f.debug_tuple("Uri").field(s).finish(),
            Self::SelfDescribed(o) => f.debug_tuple("SelfDescribed").field(o).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A decoded bignum (tag 2 or 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigNum {
    /// True for tag 3; the value is `-1 - magnitude`.
    pub negative: bool,
    /// Big-endian magnitude bytes.
    pub magnitude: Vec<u8>,
}

impl BigNum {
    /// The value as `i128`, if it fits.
    #[must_use]
    pub fn to_i128(&self) -> Option<i128> {
        let first = self.magnitude.iter().position(|&b| b != 0);
        let digits = first.map_or(&[][..], |i| &self.magnitude[i..]);
        if digits.len() > 16 {
            return None;
        }
        let mut buf = [0u8; 16];
        buf[16 - digits.len()..].copy_from_slice(digits);
        let n = i128::try_from(u128::from_be_bytes(buf)).ok()?;
        if self.negative {
            Some(-1 - n)
        } else {
            Some(n)
        }
    }
}

/// Ordered, first-match registry of tag decoders.
#[derive(Clone, Default)]
pub struct TagRegistry {
    decoders: Vec<Arc<dyn TagDecoder>>,
}

static EMPTY: TagRegistry = TagRegistry {
    decoders: Vec::new(),
};

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagRegistry")
            .field("decoders", &self.decoders.len())
            .finish()
    }
}

impl TagRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// A shared empty registry, for decoding without reinterpretation.
    #[must_use]
    pub fn empty() -> &'static Self {
        &EMPTY
    }

    /// A registry with [`CommonTags`] installed first.
    #[must_use]
    pub fn with_common() -> Self {
        let mut r = Self::new();
        r.register(Arc::new(CommonTags));
        r
    }

    /// Appends `decoder` unless this very instance is already registered.
    ///
    /// Returns true if the decoder was added.
    pub fn register(&mut self, decoder: Arc<dyn TagDecoder>) -> bool {
        let ptr = Arc::as_ptr(&decoder).cast::<()>();
        if self
            .decoders
            .iter()
            .any(|d| Arc::as_ptr(d).cast::<()>() == ptr)
        {
            return false;
        }
        self.decoders.push(decoder);
        true
    }

    /// Number of registered decoders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Returns true if no decoder is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered decoders in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TagDecoder>> {
        self.decoders.iter()
    }

    /// The first decoder that handles the item at `offset`.
    ///
    /// # Errors
    ///
    /// Errors raised by a decoder's predicate.
    pub fn find(
        &self,
        decoder: &Decoder<'_>,
        offset: u64,
    ) -> Result<Option<&Arc<dyn TagDecoder>>, CborError> {
        for d in &self.decoders {
            if d.handles(decoder, offset)? {
                log_trace!(offset, "tag decoder selected");
                return Ok(Some(d));
            }
        }
        Ok(None)
    }

    /// Reinterprets `value` through the first matching decoder.
    ///
    /// # Errors
    ///
    /// Errors raised by the selected decoder.
    pub fn apply(&self, value: &Value<'_>) -> Result<Option<TagValue>, CborError> {
        match self.find(&value.decoder(), value.offset())? {
            Some(d) => d.process(value).map(Some),
            None => Ok(None),
        }
    }
}

/// Built-in decoder for the commonly used tags 0, 1, 2, 3, 24, 32 and 55799.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonTags;

impl CommonTags {
    fn text(inner: &Value<'_>) -> Result<String, CborError> {
        if inner.value_type() != ValueType::TextString {
            return Err(invalid(inner));
        }
        inner.string()?.ok_or_else(|| invalid(inner))
    }
}

fn invalid(value: &Value<'_>) -> CborError {
    CborError::new(ErrorCode::InvalidTagContent, value.offset())
}

impl TagDecoder for CommonTags {
    fn handles(&self, decoder: &Decoder<'_>, offset: u64) -> Result<bool, CborError> {
        if decoder.major_type(offset)? != MajorType::SemanticTag {
            return Ok(false);
        }
        Ok(matches!(
            decoder.tag_number(offset)?,
            TAG_DATE_TIME
                | TAG_EPOCH
                | TAG_POS_BIGNUM
                | TAG_NEG_BIGNUM
                | TAG_ENCODED_CBOR
                | TAG_URI
                | TAG_SELF_DESCRIBED
        ))
    }

    fn process(&self, value: &Value<'_>) -> Result<TagValue, CborError> {
        let tag = value.tag_number()?;
        let inner = value.tagged_item()?;
        match tag {
            TAG_DATE_TIME => Self::text(&inner).map(TagValue::DateTime),
            TAG_URI => Self::text(&inner).map(TagValue::Uri),
            TAG_EPOCH => match inner.value_type() {
                ValueType::UInt | ValueType::NInt | ValueType::Float => inner
                    .number()?
                    .map(TagValue::Timestamp)
                    .ok_or_else(|| invalid(&inner)),
                _ => Err(invalid(&inner)),
            },
            TAG_POS_BIGNUM | TAG_NEG_BIGNUM => {
                if inner.value_type() != ValueType::ByteString {
                    return Err(invalid(&inner));
                }
                let magnitude = inner.bytes()?.ok_or_else(|| invalid(&inner))?;
                Ok(TagValue::BigNum(BigNum {
                    negative: tag == TAG_NEG_BIGNUM,
                    magnitude,
                }))
            }
            TAG_ENCODED_CBOR => {
                if inner.value_type() != ValueType::ByteString {
                    return Err(invalid(&inner));
                }
                let d = inner.decoder();
                let head = d.head_byte_size(inner.offset())?;
                if d.additional_info(inner.offset())? == AI_INDEFINITE {
                    return Err(invalid(&inner));
                }
                Ok(TagValue::EncodedCbor {
                    offset: advance(inner.offset(), head)?,
                    len: inner.len() - head,
                })
            }
            TAG_SELF_DESCRIBED => Ok(TagValue::SelfDescribed(inner.offset())),
            _ => Err(invalid(value)),
        }
    }
}

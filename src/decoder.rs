//! Offset-addressed decoding primitives.
//!
//! A [`Decoder`] pairs a borrowed [`ByteSource`] with [`DecodeLimits`]. It is
//! `Copy` and holds no position: every operation takes an absolute offset and
//! returns a decoded scalar, a length or the next offset. Two decoders over
//! the same source never interfere with one another, and one decoder may be
//! shared by any number of threads.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::alloc_util::{extraction_len, try_extend, try_push_str, try_vec_zeroed};
use crate::container::{Dictionary, Sequence};
use crate::float::half_to_f32;
use crate::size;
use crate::source::ByteSource;
use crate::tag::TagRegistry;
use crate::types::{
    additional_info, is_null, MajorType, ValueType, AI_INDEFINITE, BREAK_MARKER, FLOAT_DOUBLE,
    FLOAT_HALF, FLOAT_SINGLE, SIMPLE_FALSE, SIMPLE_TRUE,
};
use crate::utf8;
use crate::value::{Integer, Number, Value};
use crate::wire::{self, advance};
use crate::{CborError, DecodeLimits, ErrorCode};

/// Stateless decoder over a borrowed byte source.
#[derive(Clone, Copy)]
pub struct Decoder<'a> {
    source: &'a dyn ByteSource,
    limits: DecodeLimits,
}

impl fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("len_hint", &self.source.len_hint())
            .field("limits", &self.limits)
            .finish()
    }
}

impl<'a> Decoder<'a> {
    /// Construct a decoder with default limits.
    ///
    /// For a borrowed slice `data: &[u8]`, pass `&data`.
    #[must_use]
    pub fn new<S: ByteSource + 'a>(source: &'a S) -> Self {
        Self::with_limits(source, DecodeLimits::new())
    }

    /// Construct a decoder with explicit limits.
    #[must_use]
    pub fn with_limits<S: ByteSource + 'a>(source: &'a S, limits: DecodeLimits) -> Self {
        Self { source, limits }
    }

    /// Construct a decoder over an already type-erased source.
    #[must_use]
    pub const fn from_dyn(source: &'a dyn ByteSource, limits: DecodeLimits) -> Self {
        Self { source, limits }
    }

    /// The underlying byte source.
    #[must_use]
    pub const fn source(&self) -> &'a dyn ByteSource {
        self.source
    }

    /// The configured limits.
    #[must_use]
    pub const fn limits(&self) -> DecodeLimits {
        self.limits
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Propagates source errors (`UnexpectedEof` past the end).
    #[inline]
    pub fn read_uint8(&self, offset: u64) -> Result<u8, CborError> {
        wire::read_u8(self.source, offset)
    }

    /// Reads a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// Propagates source errors.
    pub fn read_uint16(&self, offset: u64) -> Result<u16, CborError> {
        wire::read_be_u16(self.source, offset)
    }

    /// Reads a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Propagates source errors.
    pub fn read_uint32(&self, offset: u64) -> Result<u32, CborError> {
        wire::read_be_u32(self.source, offset)
    }

    /// Reads a big-endian `u64`.
    ///
    /// # Errors
    ///
    /// Propagates source errors.
    pub fn read_uint64(&self, offset: u64) -> Result<u64, CborError> {
        wire::read_be_u64(self.source, offset)
    }

    /// Major type of the item at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates source errors.
    pub fn major_type(&self, offset: u64) -> Result<MajorType, CborError> {
        self.read_uint8(offset).map(MajorType::from_head)
    }

    /// Value type of the item at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates source errors; rejects reserved simple codes and stray breaks.
    pub fn value_type(&self, offset: u64) -> Result<ValueType, CborError> {
        ValueType::classify(self.read_uint8(offset)?, offset)
    }

    /// Additional-info field of the header at `offset`.
    ///
    /// # Errors
    ///
    /// Propagates source errors.
    pub fn additional_info(&self, offset: u64) -> Result<u8, CborError> {
        self.read_uint8(offset).map(additional_info)
    }

    /// Returns true if `head` is the CBOR `null` simple value.
    #[must_use]
    pub const fn is_null(head: u8) -> bool {
        is_null(head)
    }

    /// Decodes an integer (major 0 or 1).
    ///
    /// Narrow forms stay in `i64`; the 8-byte extended form is promoted to
    /// `i128` so the full range `-2^64..=2^64-1` is representable. Returns
    /// `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for other major types, encoding errors for reserved or
    /// indefinite additional info.
    pub fn read_int(&self, offset: u64) -> Result<Option<Integer>, CborError> {
        let head = self.read_uint8(offset)?;
        if is_null(head) {
            return Ok(None);
        }
        let major = MajorType::from_head(head);
        if !matches!(
            major,
            MajorType::UnsignedInteger | MajorType::NegativeInteger
        ) {
            return Err(CborError::type_mismatch(offset));
        }

        // 0 for major 0, all ones for major 1.
        let mask = -i64::from(head >> 5);
        let raw = wire::read_argument(self.source, offset, head)?;
        if additional_info(head) == 27 {
            return Ok(Some(Integer::Big(i128::from(mask) ^ i128::from(raw))));
        }
        let raw = i64::try_from(raw).map_err(|_| CborError::new(ErrorCode::LengthOverflow, offset))?;
        Ok(Some(Integer::Small(mask ^ raw)))
    }

    /// Decodes the unsigned argument of an integer item without sign inversion.
    ///
    /// Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-integer major types, encoding errors otherwise.
    pub fn read_uint(&self, offset: u64) -> Result<Option<Integer>, CborError> {
        let head = self.read_uint8(offset)?;
        if is_null(head) {
            return Ok(None);
        }
        if !matches!(
            MajorType::from_head(head),
            MajorType::UnsignedInteger | MajorType::NegativeInteger
        ) {
            return Err(CborError::type_mismatch(offset));
        }
        let raw = wire::read_argument(self.source, offset, head)?;
        if additional_info(head) == 27 {
            return Ok(Some(Integer::Big(i128::from(raw))));
        }
        let raw = i64::try_from(raw).map_err(|_| CborError::new(ErrorCode::LengthOverflow, offset))?;
        Ok(Some(Integer::Small(raw)))
    }

    /// Decodes a half, single or double precision float as `f64`.
    ///
    /// Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` outside major 7, `InvalidFloatEncoding` for any other
    /// additional info under major 7.
    pub fn read_float(&self, offset: u64) -> Result<Option<f64>, CborError> {
        let head = self.read_uint8(offset)?;
        if is_null(head) {
            return Ok(None);
        }
        if MajorType::from_head(head) != MajorType::FloatingPointOrSimple {
            return Err(CborError::type_mismatch(offset));
        }
        let at = advance(offset, 1)?;
        let v = match additional_info(head) {
            FLOAT_HALF => f64::from(half_to_f32(self.read_uint16(at)?)),
            FLOAT_SINGLE => f64::from(f32::from_bits(self.read_uint32(at)?)),
            FLOAT_DOUBLE => f64::from_bits(self.read_uint64(at)?),
            _ => return Err(CborError::new(ErrorCode::InvalidFloatEncoding, offset)),
        };
        Ok(Some(v))
    }

    /// Decodes a number, choosing float or integer decoding by `value_type`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::read_float`] and [`Decoder::read_int`].
    pub fn read_number(
        &self,
        value_type: ValueType,
        offset: u64,
    ) -> Result<Option<Number>, CborError> {
        if value_type == ValueType::Float {
            return Ok(self.read_float(offset)?.map(Number::Float));
        }
        Ok(self.read_int(offset)?.map(Number::Int))
    }

    /// Decodes a byte or text string.
    ///
    /// Byte strings are decoded as ASCII, text strings as UTF-8. Indefinite
    /// strings are the concatenation of all chunks up to the break marker.
    /// Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-string items, `Utf8Invalid`,
    /// `MalformedIndefiniteString`, `UnsupportedExtractionSize`.
    pub fn read_string(&self, offset: u64) -> Result<Option<String>, CborError> {
        let head = self.read_uint8(offset)?;
        if is_null(head) {
            return Ok(None);
        }
        let major = MajorType::from_head(head);
        if !major.is_string() {
            return Err(CborError::type_mismatch(offset));
        }

        if additional_info(head) != AI_INDEFINITE {
            return self.read_string_chunk(major, offset).map(Some);
        }

        let mut out = String::new();
        let mut total = 0;
        let mut pos = advance(offset, 1)?;
        loop {
            let h = self.read_uint8(pos)?;
            if h == BREAK_MARKER {
                return Ok(Some(out));
            }
            if MajorType::from_head(h) != major || additional_info(h) == AI_INDEFINITE {
                return Err(CborError::new(ErrorCode::MalformedIndefiniteString, pos));
            }
            let data = self.read_definite_payload(pos)?;
            total = self.add_extracted(total, &data, offset)?;
            try_push_str(&mut out, &decode_chunk(major, &data, pos)?, pos)?;
            pos = self.skip(pos)?;
        }
    }

    fn read_string_chunk(&self, major: MajorType, offset: u64) -> Result<String, CborError> {
        let data = self.read_definite_payload(offset)?;
        decode_chunk(major, &data, offset)
    }

    /// Running payload total of an indefinite string, bounded by the
    /// extraction limit.
    fn add_extracted(&self, total: u64, chunk: &[u8], offset: u64) -> Result<u64, CborError> {
        let n = u64::try_from(chunk.len())
            .map_err(|_| CborError::new(ErrorCode::UnsupportedExtractionSize, offset))?;
        let total = advance(total, n)?;
        extraction_len(total, self.limits.max_extraction_len, offset)?;
        Ok(total)
    }

    /// Raw payload bytes of a byte or text string, chunks concatenated for
    /// indefinite strings. Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-string items, `MalformedIndefiniteString`,
    /// `UnsupportedExtractionSize`.
    pub fn read_bytes(&self, offset: u64) -> Result<Option<Vec<u8>>, CborError> {
        let head = self.read_uint8(offset)?;
        if is_null(head) {
            return Ok(None);
        }
        let major = MajorType::from_head(head);
        if !major.is_string() {
            return Err(CborError::type_mismatch(offset));
        }
        if additional_info(head) != AI_INDEFINITE {
            return self.read_definite_payload(offset).map(Some);
        }

        let mut out = Vec::new();
        let mut total = 0;
        let mut pos = advance(offset, 1)?;
        loop {
            let h = self.read_uint8(pos)?;
            if h == BREAK_MARKER {
                return Ok(Some(out));
            }
            if MajorType::from_head(h) != major || additional_info(h) == AI_INDEFINITE {
                return Err(CborError::new(ErrorCode::MalformedIndefiniteString, pos));
            }
            let chunk = self.read_definite_payload(pos)?;
            total = self.add_extracted(total, &chunk, offset)?;
            try_extend(&mut out, &chunk, pos)?;
            pos = self.skip(pos)?;
        }
    }

    fn read_definite_payload(&self, offset: u64) -> Result<Vec<u8>, CborError> {
        let head = self.read_uint8(offset)?;
        let len = wire::read_argument(self.source, offset, head)?;
        let start = advance(offset, self.head_byte_size(offset)?)?;
        self.read_raw_at(start, len, offset)
    }

    /// Copies `len` raw bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// `UnsupportedExtractionSize` if `len` exceeds the configured or
    /// platform extraction size; source errors otherwise.
    pub fn read_raw(&self, offset: u64, len: u64) -> Result<Vec<u8>, CborError> {
        self.read_raw_at(offset, len, offset)
    }

    fn read_raw_at(&self, offset: u64, len: u64, err_off: u64) -> Result<Vec<u8>, CborError> {
        let n = extraction_len(len, self.limits.max_extraction_len, err_off)?;
        if let Some(total) = self.source.len_hint() {
            if advance(offset, len)? > total {
                return Err(CborError::new(ErrorCode::UnexpectedEof, total));
            }
        }
        let mut buf = try_vec_zeroed(n, err_off)?;
        self.source.read_into(offset, &mut buf)?;
        Ok(buf)
    }

    /// Interprets the simple value at `offset` as a boolean.
    ///
    /// # Errors
    ///
    /// `IllegalBooleanEncoding` for anything but `false`/`true`.
    pub fn boolean_value(&self, offset: u64) -> Result<bool, CborError> {
        let head = self.read_uint8(offset)?;
        if MajorType::from_head(head) == MajorType::FloatingPointOrSimple {
            match additional_info(head) {
                SIMPLE_FALSE => return Ok(false),
                SIMPLE_TRUE => return Ok(true),
                _ => {}
            }
        }
        Err(CborError::new(ErrorCode::IllegalBooleanEncoding, offset))
    }

    /// Tag number of the semantic tag at `offset`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the item is not a tag.
    pub fn tag_number(&self, offset: u64) -> Result<u64, CborError> {
        let head = self.read_uint8(offset)?;
        if MajorType::from_head(head) != MajorType::SemanticTag {
            return Err(CborError::type_mismatch(offset));
        }
        wire::read_argument(self.source, offset, head)
    }

    /// Header size (initial byte plus argument bytes) at `offset`.
    ///
    /// # Errors
    ///
    /// Source errors, `ReservedAdditionalInfo`.
    pub fn head_byte_size(&self, offset: u64) -> Result<u64, CborError> {
        size::head_byte_size(self.source, offset)
    }

    /// Encoded byte length of the item at `offset`, computed per `major`
    /// without decoding its payload.
    ///
    /// # Errors
    ///
    /// Encoding errors, `DepthLimitExceeded`, `LengthOverflow`.
    pub fn length(&self, major: MajorType, offset: u64) -> Result<u64, CborError> {
        size::byte_size(self.source, major, offset, self.limits.max_depth)
    }

    /// Offset just past the item at `offset`.
    ///
    /// # Errors
    ///
    /// See [`Decoder::length`].
    pub fn skip(&self, offset: u64) -> Result<u64, CborError> {
        let major = self.major_type(offset)?;
        self.skip_with(major, offset)
    }

    /// Offset just past the item at `offset`, whose major type is already known.
    ///
    /// # Errors
    ///
    /// See [`Decoder::length`].
    pub fn skip_with(&self, major: MajorType, offset: u64) -> Result<u64, CborError> {
        advance(offset, self.length(major, offset)?)
    }

    /// Element count of the container at `offset` (pairs for dictionaries).
    ///
    /// Indefinite containers are scanned up to their break marker.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-containers, encoding errors during the scan.
    pub fn element_count(&self, offset: u64) -> Result<u64, CborError> {
        size::element_count(self.source, offset, self.limits.max_depth)
    }

    /// Builds a lazy handle for the item at `offset`.
    ///
    /// # Errors
    ///
    /// Classification or length errors for the item.
    pub fn read_value(&self, offset: u64, registry: &'a TagRegistry) -> Result<Value<'a>, CborError> {
        Value::at(*self, registry, offset)
    }

    /// Builds an indexed sequence view. Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-sequences, errors while scanning elements.
    pub fn read_sequence(
        &self,
        offset: u64,
        registry: &'a TagRegistry,
    ) -> Result<Option<Sequence<'a>>, CborError> {
        if is_null(self.read_uint8(offset)?) {
            return Ok(None);
        }
        Sequence::build(*self, registry, offset).map(Some)
    }

    /// Builds an indexed dictionary view. Returns `None` if the item is `null`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-dictionaries, errors while scanning elements.
    pub fn read_dictionary(
        &self,
        offset: u64,
        registry: &'a TagRegistry,
    ) -> Result<Option<Dictionary<'a>>, CborError> {
        if is_null(self.read_uint8(offset)?) {
            return Ok(None);
        }
        Dictionary::build(*self, registry, offset).map(Some)
    }
}

fn decode_chunk(major: MajorType, data: &[u8], offset: u64) -> Result<String, CborError> {
    if major == MajorType::ByteString {
        return Ok(utf8::decode_ascii(data));
    }
    utf8::decode_text(data, offset)
}

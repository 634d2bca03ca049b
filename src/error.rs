use core::fmt;

/// The high-level class of an error.
///
/// Not-found is deliberately absent: navigation reports a missing key or an
/// out-of-range index as `Ok(None)`, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A structural step expected one major/value type and found another.
    TypeMismatch,
    /// A header combination or payload not defined by the format.
    InvalidEncoding,
    /// A requested span cannot be represented by the platform.
    UnsupportedSize,
    /// The byte source could not serve a read.
    Source,
    /// A configured decode limit was exceeded.
    Limit,
    /// Misuse of the per-query evaluation state.
    Query,
}

/// A structured error code identifying why an operation failed.
///
/// This enum is string-free to support `no_std`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The byte source ended before the value did.
    UnexpectedEof,
    /// Arithmetic overflow while computing a length/offset.
    LengthOverflow,
    /// A raw byte span is larger than the platform or the configured limit can extract.
    UnsupportedExtractionSize,
    /// Memory allocation failed while materializing a payload or index table.
    AllocationFailed,
    /// Nesting depth limit exceeded.
    DepthLimitExceeded,

    /// Reserved additional-info value (28..30) was used.
    ReservedAdditionalInfo,
    /// Additional info under major type 7 is not 25/26/27 where a float was requested.
    InvalidFloatEncoding,
    /// Simple value is neither `false` nor `true` where a boolean was requested.
    IllegalBooleanEncoding,
    /// A break marker appeared where a data item was expected.
    UnexpectedBreak,
    /// Indefinite length (ai 31) used on an integer, tag or simple value.
    InvalidIndefiniteLength,
    /// An indefinite-length string contained a chunk of another type or an indefinite chunk.
    MalformedIndefiniteString,
    /// Invalid UTF-8 in a text string.
    Utf8Invalid,
    /// A semantic tag wraps content its decoder cannot interpret.
    InvalidTagContent,

    /// The value at the offset has the wrong type for the requested operation.
    TypeMismatch,

    /// The query stack was popped while empty.
    StackUnderflow,
    /// The top of the query stack holds a value of another type.
    StackTypeMismatch,
}

impl ErrorCode {
    /// Returns the taxonomy class of this code.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::TypeMismatch => ErrorKind::TypeMismatch,
            Self::ReservedAdditionalInfo
            | Self::InvalidFloatEncoding
            | Self::IllegalBooleanEncoding
            | Self::UnexpectedBreak
            | Self::InvalidIndefiniteLength
            | Self::MalformedIndefiniteString
            | Self::Utf8Invalid
            | Self::InvalidTagContent => ErrorKind::InvalidEncoding,
            Self::UnsupportedExtractionSize | Self::LengthOverflow => ErrorKind::UnsupportedSize,
            Self::UnexpectedEof => ErrorKind::Source,
            Self::DepthLimitExceeded | Self::AllocationFailed => ErrorKind::Limit,
            Self::StackUnderflow | Self::StackTypeMismatch => ErrorKind::Query,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::LengthOverflow => "length overflow",
            Self::UnsupportedExtractionSize => "extraction size not supported",
            Self::AllocationFailed => "allocation failed",
            Self::DepthLimitExceeded => "nesting depth limit exceeded",

            Self::ReservedAdditionalInfo => "reserved additional info value",
            Self::InvalidFloatEncoding => "invalid floating-point encoding",
            Self::IllegalBooleanEncoding => "illegal boolean encoding",
            Self::UnexpectedBreak => "unexpected break marker",
            Self::InvalidIndefiniteLength => "indefinite length not allowed for this major type",
            Self::MalformedIndefiniteString => "malformed indefinite-length string chunk",
            Self::Utf8Invalid => "text must be valid UTF-8",
            Self::InvalidTagContent => "semantic tag content cannot be interpreted",

            Self::TypeMismatch => "unexpected value type",

            Self::StackUnderflow => "query stack underflow",
            Self::StackTypeMismatch => "query stack value has a different type",
        }
    }
}

/// An error with a stable code and the absolute byte offset where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CborError {
    /// The error code.
    pub code: ErrorCode,
    /// Absolute offset into the byte source where the error was detected.
    pub offset: u64,
}

impl CborError {
    /// Construct an error at `offset`.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: u64) -> Self {
        Self { code, offset }
    }

    /// Construct a type-mismatch error at `offset`.
    #[inline]
    #[must_use]
    pub const fn type_mismatch(offset: u64) -> Self {
        Self::new(ErrorCode::TypeMismatch, offset)
    }

    /// Returns the taxonomy class of this error.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns true iff this error is a type mismatch.
    #[inline]
    #[must_use]
    pub const fn is_type_mismatch(self) -> bool {
        matches!(self.code, ErrorCode::TypeMismatch)
    }
}

impl fmt::Display for CborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.code.message();
        match self.kind() {
            ErrorKind::TypeMismatch => write!(f, "cbor type mismatch at {}: {msg}", self.offset),
            ErrorKind::Query => write!(f, "cbor query failed at {}: {msg}", self.offset),
            _ => write!(f, "cbor decode failed at {}: {msg}", self.offset),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CborError {}

//! # lazycbor
//!
//! Lazy, offset-addressed CBOR decoding and graph queries.
//!
//! ## Design principles
//!
//! - **Offsets, not cursors.**
//!   Every decoding primitive takes an absolute offset and returns a value, a
//!   length or the next offset. No component keeps a shared read position, so
//!   any number of threads may decode and query the same [`ByteSource`].
//! - **Skip without parsing.**
//!   [`Decoder::length`] and [`Decoder::skip`] compute the encoded size of an
//!   item, nested and indefinite-length containers included, by walking
//!   headers only.
//! - **Decode on demand.**
//!   A [`Value`] is a descriptor (offset, type, length). Payloads and
//!   semantic-tag reinterpretation are computed when asked for.
//! - **Not-found is not an error.**
//!   Queries return `Ok(None)` for a missing key or an out-of-range index;
//!   errors are reserved for type mismatches, invalid encodings and
//!   unsupported sizes.
//!
//! ## Queries
//!
//! [`GraphQuery`] steps are chained to resolve a start offset to a target
//! offset:
//!
//! ```
//! use lazycbor::{Decoder, GraphQuery, TagRegistry, TypeSpec};
//!
//! // { "a": 1, "b": 2 }
//! let bytes = [0xa2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
//! let decoder = Decoder::new(&bytes);
//! let registry = TagRegistry::with_common();
//!
//! let b = GraphQuery::chain([
//!     GraphQuery::dictionary("b"),
//!     GraphQuery::require_type(TypeSpec::Int),
//! ]);
//! let off = b.evaluate(decoder, &registry, None).unwrap().unwrap();
//! let v = decoder.read_value(off, &registry).unwrap();
//! assert_eq!(v.integer().unwrap().and_then(|i| i.as_i64()), Some(2));
//!
//! let missing = GraphQuery::chain([GraphQuery::dictionary("c")]);
//! assert_eq!(missing.evaluate(decoder, &registry, None).unwrap(), None);
//! ```
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`CborError`].
//! - `sha2` *(default)*: enables [`Value::sha256`] over an item's raw bytes.
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation where supported.
//! - `tracing`: emits diagnostic events for query steps and tag dispatch.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible and requires `alloc` (index tables,
//! decoded strings, the tag registry).

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate alloc;

#[macro_use]
mod log;

mod alloc_util;
mod container;
mod context;
mod decoder;
mod error;
mod float;
mod limits;
mod query;
mod size;
mod source;
mod tag;
mod types;
pub(crate) mod utf8;
mod value;
mod wire;

pub use crate::container::{Dictionary, IndexTable, Sequence};
pub use crate::context::QueryContext;
pub use crate::decoder::Decoder;
pub use crate::error::{CborError, ErrorCode, ErrorKind};
pub use crate::float::half_to_f32;
pub use crate::limits::{DecodeLimits, DEFAULT_INDEX_SHARD_LEN, DEFAULT_MAX_DEPTH};
pub use crate::query::{GraphQuery, KeyMatcher, MatchMode, QueryStep};
pub use crate::source::ByteSource;
pub use crate::tag::{
    BigNum, CommonTags, TagDecoder, TagRegistry, TagValue, TAG_DATE_TIME, TAG_ENCODED_CBOR,
    TAG_EPOCH, TAG_NEG_BIGNUM, TAG_POS_BIGNUM, TAG_SELF_DESCRIBED, TAG_URI,
};
pub use crate::types::{MajorType, TypeSpec, ValueType, BREAK_MARKER};
pub use crate::value::{Integer, Number, Value};

//! Offset-based graph queries.
//!
//! A [`GraphQuery`] resolves an absolute offset to another absolute offset, or
//! to not-found (`Ok(None)`). Steps navigate into sequences by index, search
//! dictionaries by key, and assert value types; a chain threads the offset
//! through its steps and stops at the first not-found.
//!
//! ```
//! use lazycbor::{Decoder, GraphQuery, TagRegistry};
//!
//! // { "a": [10, 20, 30] }
//! let bytes = [0xa1, 0x61, 0x61, 0x83, 0x0a, 0x14, 0x18, 0x1e];
//! let decoder = Decoder::new(&bytes);
//! let q = GraphQuery::chain([GraphQuery::dictionary("a"), GraphQuery::sequence(1)]);
//! let off = q.evaluate(decoder, TagRegistry::empty(), None).unwrap();
//! assert_eq!(off, Some(5));
//! ```

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::context::QueryContext;
use crate::decoder::Decoder;
use crate::tag::TagRegistry;
use crate::types::{MajorType, TypeSpec, ValueType};
use crate::value::Value;
use crate::CborError;

type KeyPredicate = dyn Fn(&Value<'_>) -> Result<bool, CborError> + Send + Sync;

/// Test applied to dictionary keys (or values, see [`MatchMode::SkipFirstKey`]).
///
/// Typed matchers only match candidates of their own type: an `Int` matcher
/// never matches a text key and vice versa.
#[derive(Clone)]
pub enum KeyMatcher {
    /// Text string equal to the given string.
    Text(String),
    /// Integer equal to the given value.
    Int(i128),
    /// Float equal to the given value.
    Float(f64),
    /// Arbitrary predicate.
    Predicate(Arc<KeyPredicate>),
}

impl KeyMatcher {
    /// Wraps a closure as a matcher.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value<'_>) -> Result<bool, CborError> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Tests `candidate`.
    ///
    /// # Errors
    ///
    /// Decode errors, or whatever a predicate returns.
    pub fn matches(&self, candidate: &Value<'_>) -> Result<bool, CborError> {
        match self {
            Self::Text(s) => {
                if candidate.value_type() != ValueType::TextString {
                    return Ok(false);
                }
                Ok(candidate.string()?.as_deref() == Some(s.as_str()))
            }
            Self::Int(n) => {
                if !matches!(candidate.value_type(), ValueType::UInt | ValueType::NInt) {
                    return Ok(false);
                }
                Ok(candidate.integer()?.map(|i| i.as_i128()) == Some(*n))
            }
            Self::Float(f) => {
                if candidate.value_type() != ValueType::Float {
                    return Ok(false);
                }
                Ok(candidate.float()? == Some(*f))
            }
            Self::Predicate(p) => p(candidate),
        }
    }
}

impl fmt::Debug for KeyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for KeyMatcher {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl From<String> for KeyMatcher {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for KeyMatcher {
    fn from(n: i64) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<u64> for KeyMatcher {
    fn from(n: u64) -> Self {
        Self::Int(i128::from(n))
    }
}

impl From<f64> for KeyMatcher {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// What a dictionary match returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Test keys, return the offset of the matched key's value.
    #[default]
    Value,
    /// Test keys, return the offset of the matched key.
    Key,
    /// Pass over the first key, then test value slots and return the
    /// matched value's offset.
    SkipFirstKey,
}

/// A navigation step supplied from outside the crate.
pub trait QueryStep: fmt::Debug + Send + Sync {
    /// Resolves `offset` to the next offset, or `None` for not-found.
    ///
    /// # Errors
    ///
    /// Any decode or query error.
    fn access(&self, offset: u64, ctx: &mut QueryContext<'_>) -> Result<Option<u64>, CborError>;
}

/// One navigation step, or a chain of them.
#[derive(Debug, Clone)]
pub enum GraphQuery {
    /// Establishes the offset: a fixed offset, or the incoming one for `None`.
    StreamEntry(Option<u64>),
    /// Element `i` of a sequence.
    SequenceIndex(u64),
    /// First dictionary entry accepted by `matcher`.
    DictionaryMatch {
        /// Candidate test.
        matcher: KeyMatcher,
        /// Which offset to return.
        mode: MatchMode,
    },
    /// Passes the offset through if the value there matches `spec`. A `null`
    /// also passes when `required` is false.
    TypeAssert {
        /// Expected type.
        spec: TypeSpec,
        /// Whether `null` is rejected.
        required: bool,
    },
    /// Steps evaluated in order, exactly as given.
    ///
    /// [`GraphQuery::chain`] is the normalizing constructor: it prepends the
    /// implicit `StreamEntry(None)`. That entry passes the incoming offset
    /// through, so a chain built directly from this variant resolves to the
    /// same offset; only [`GraphQuery::nodes`] differs.
    Chain(Vec<GraphQuery>),
    /// An externally defined step.
    Custom(Arc<dyn QueryStep>),
}

impl GraphQuery {
    /// Jump to a fixed offset.
    #[must_use]
    pub const fn stream(offset: u64) -> Self {
        Self::StreamEntry(Some(offset))
    }

    /// Element `index` of a sequence.
    #[must_use]
    pub const fn sequence(index: u64) -> Self {
        Self::SequenceIndex(index)
    }

    /// Value of the first key equal to `key`.
    pub fn dictionary(key: impl Into<KeyMatcher>) -> Self {
        Self::dictionary_with(key, MatchMode::Value)
    }

    /// Dictionary search with an explicit retrieval mode.
    pub fn dictionary_with(key: impl Into<KeyMatcher>, mode: MatchMode) -> Self {
        Self::DictionaryMatch {
            matcher: key.into(),
            mode,
        }
    }

    /// Type assertion rejecting `null`.
    #[must_use]
    pub const fn require_type(spec: TypeSpec) -> Self {
        Self::TypeAssert {
            spec,
            required: true,
        }
    }

    /// Type assertion letting `null` through.
    #[must_use]
    pub const fn null_or_type(spec: TypeSpec) -> Self {
        Self::TypeAssert {
            spec,
            required: false,
        }
    }

    /// Wraps an external step.
    pub fn custom(step: impl QueryStep + 'static) -> Self {
        Self::Custom(Arc::new(step))
    }

    /// A chain over `steps`, starting with a stream entry.
    ///
    /// If the first step is not a [`GraphQuery::StreamEntry`], a
    /// `StreamEntry(None)` is prepended so the chain always begins from a
    /// concrete offset.
    pub fn chain(steps: impl IntoIterator<Item = GraphQuery>) -> Self {
        let mut nodes: Vec<GraphQuery> = steps.into_iter().collect();
        if !matches!(nodes.first(), Some(Self::StreamEntry(_))) {
            nodes.insert(0, Self::StreamEntry(None));
        }
        Self::Chain(nodes)
    }

    /// The steps of a chain, or this step alone.
    #[must_use]
    pub fn nodes(&self) -> &[GraphQuery] {
        match self {
            Self::Chain(nodes) => nodes,
            other => core::slice::from_ref(other),
        }
    }

    /// Resolves `offset` within `ctx`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when a structural step meets the wrong type, plus any
    /// decode error.
    pub fn access(&self, offset: u64, ctx: &mut QueryContext<'_>) -> Result<Option<u64>, CborError> {
        match self {
            Self::StreamEntry(fixed) => Ok(Some(fixed.unwrap_or(offset))),
            Self::SequenceIndex(index) => sequence_index(ctx, offset, *index),
            Self::DictionaryMatch { matcher, mode } => {
                let decoder = *ctx.decoder();
                if decoder.major_type(offset)? != MajorType::Dictionary {
                    log_debug!(offset, "dictionary match on another type");
                    return Err(CborError::type_mismatch(offset));
                }
                let dict = decoder
                    .read_dictionary(offset, ctx.registry())?
                    .ok_or_else(|| CborError::type_mismatch(offset))?;
                let found = dict.find(matcher, *mode)?;
                if found.is_none() {
                    log_debug!(offset, ?matcher, "dictionary key not found");
                }
                Ok(found)
            }
            Self::TypeAssert { spec, required } => type_assert(ctx.decoder(), offset, *spec, *required),
            Self::Chain(nodes) => {
                let mut current = offset;
                for node in nodes {
                    log_trace!(offset = current, step = ?node, "query step");
                    match node.access(current, ctx)? {
                        Some(next) => {
                            current = next;
                            ctx.set_offset(next);
                        }
                        None => {
                            log_debug!(offset = current, "query chain short-circuited");
                            return Ok(None);
                        }
                    }
                }
                Ok(Some(current))
            }
            Self::Custom(step) => step.access(offset, ctx),
        }
    }

    /// Evaluates this query with a fresh [`QueryContext`].
    ///
    /// # Errors
    ///
    /// See [`GraphQuery::access`].
    pub fn evaluate(
        &self,
        decoder: Decoder<'_>,
        registry: &TagRegistry,
        start: Option<u64>,
    ) -> Result<Option<u64>, CborError> {
        let mut ctx = QueryContext::new(decoder, registry);
        ctx.evaluate(self, start)
    }
}

impl QueryStep for GraphQuery {
    fn access(&self, offset: u64, ctx: &mut QueryContext<'_>) -> Result<Option<u64>, CborError> {
        GraphQuery::access(self, offset, ctx)
    }
}

fn sequence_index(
    ctx: &QueryContext<'_>,
    offset: u64,
    index: u64,
) -> Result<Option<u64>, CborError> {
    let decoder = ctx.decoder();
    if decoder.major_type(offset)? != MajorType::Sequence {
        log_debug!(offset, "sequence index on another type");
        return Err(CborError::type_mismatch(offset));
    }
    let seq = decoder
        .read_sequence(offset, ctx.registry())?
        .ok_or_else(|| CborError::type_mismatch(offset))?;
    if index >= seq.len() {
        log_debug!(offset, index, "sequence index out of range");
        return Ok(None);
    }
    Ok(seq.offset_of(index))
}

fn type_assert(
    decoder: &Decoder<'_>,
    offset: u64,
    spec: TypeSpec,
    required: bool,
) -> Result<Option<u64>, CborError> {
    let value_type = decoder.value_type(offset)?;
    let tag = if value_type == ValueType::Tag {
        Some(decoder.tag_number(offset)?)
    } else {
        None
    };
    if spec.matches(value_type, tag) || (value_type == ValueType::Null && !required) {
        return Ok(Some(offset));
    }
    log_debug!(offset, ?spec, ?value_type, "type assertion failed");
    Err(CborError::type_mismatch(offset))
}

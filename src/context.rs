//! Per-evaluation query state.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::decoder::Decoder;
use crate::query::GraphQuery;
use crate::tag::{TagRegistry, TagValue};
use crate::types::{MajorType, ValueType};
use crate::value::Value;
use crate::{CborError, ErrorCode};

/// Mutable state of one query execution: the current offset, a LIFO value
/// stack for multi-step evaluation, and the decoder and tag registry the
/// query runs against.
///
/// A context belongs to exactly one evaluation. Concurrent queries each
/// create their own.
pub struct QueryContext<'a> {
    decoder: Decoder<'a>,
    registry: &'a TagRegistry,
    offset: u64,
    stack: Vec<Box<dyn Any + Send>>,
}

impl fmt::Debug for QueryContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext")
            .field("offset", &self.offset)
            .field("stack_len", &self.stack.len())
            .field("registry", self.registry)
            .finish_non_exhaustive()
    }
}

impl<'a> QueryContext<'a> {
    /// A fresh context positioned at offset 0 with an empty stack.
    #[must_use]
    pub fn new(decoder: Decoder<'a>, registry: &'a TagRegistry) -> Self {
        Self {
            decoder,
            registry,
            offset: 0,
            stack: Vec::new(),
        }
    }

    /// The decoder queries read through.
    #[must_use]
    pub const fn decoder(&self) -> &Decoder<'a> {
        &self.decoder
    }

    /// The tag registry in effect.
    #[must_use]
    pub const fn registry(&self) -> &'a TagRegistry {
        self.registry
    }

    /// The current offset.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Moves the current offset.
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Pushes a value onto the stack.
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.stack.push(Box::new(value));
    }

    /// Pops the top of the stack as a `T`.
    ///
    /// # Errors
    ///
    /// `StackUnderflow` on an empty stack; `StackTypeMismatch` if the top
    /// holds another type, in which case it stays on the stack.
    pub fn pop<T: Any>(&mut self) -> Result<T, CborError> {
        let top = self
            .stack
            .last()
            .ok_or_else(|| CborError::new(ErrorCode::StackUnderflow, self.offset))?;
        if !top.is::<T>() {
            return Err(CborError::new(ErrorCode::StackTypeMismatch, self.offset));
        }
        self.stack
            .pop()
            .and_then(|b| b.downcast::<T>().ok())
            .map(|b| *b)
            .ok_or_else(|| CborError::new(ErrorCode::StackUnderflow, self.offset))
    }

    /// Borrows the top of the stack as a `T`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`QueryContext::pop`].
    pub fn peek<T: Any>(&self) -> Result<&T, CborError> {
        self.stack
            .last()
            .ok_or_else(|| CborError::new(ErrorCode::StackUnderflow, self.offset))?
            .downcast_ref::<T>()
            .ok_or_else(|| CborError::new(ErrorCode::StackTypeMismatch, self.offset))
    }

    /// Number of values on the stack.
    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// A lazy handle for the item at `offset`.
    ///
    /// # Errors
    ///
    /// Classification or length errors.
    pub fn read_value(&self, offset: u64) -> Result<Value<'a>, CborError> {
        self.decoder.read_value(offset, self.registry)
    }

    /// Runs the registered tag decoders over the item at `offset`, whose
    /// major and value type the caller already knows. `None` means no
    /// decoder handles it and the raw value stands.
    ///
    /// # Errors
    ///
    /// Errors raised by the selected decoder.
    pub fn apply_decoder(
        &self,
        offset: u64,
        major: MajorType,
        value_type: ValueType,
    ) -> Result<Option<TagValue>, CborError> {
        let len = self.decoder.length(major, offset)?;
        let value = Value::from_parts(major, value_type, offset, len, self.decoder, self.registry);
        self.registry.apply(&value)
    }

    /// Evaluates `query` from `start` (offset 0 when `None`), leaving the
    /// context at the resolved offset.
    ///
    /// # Errors
    ///
    /// Errors raised by any step.
    pub fn evaluate(
        &mut self,
        query: &GraphQuery,
        start: Option<u64>,
    ) -> Result<Option<u64>, CborError> {
        let start = start.unwrap_or(0);
        self.offset = start;
        let resolved = query.access(start, self)?;
        if let Some(off) = resolved {
            self.offset = off;
        }
        Ok(resolved)
    }
}

/// Default maximum nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default number of offsets stored per shard of a container index table.
pub const DEFAULT_INDEX_SHARD_LEN: usize = 1 << 20;

/// Largest span the platform can address as a single allocation.
#[allow(clippy::cast_possible_truncation)]
pub const PLATFORM_MAX_EXTRACTION: u64 = if usize::BITS >= u64::BITS {
    u64::MAX
} else {
    usize::MAX as u64
};

/// Decode-time resource limits.
///
/// Limits are enforced deterministically by the decoder and never depend on
/// the contents of previously decoded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting depth walked while computing sizes and element counts.
    pub max_depth: usize,
    /// Maximum raw span, in bytes, copied out of a source in one extraction
    /// (strings, byte strings, raw value bytes). Clamped to the platform's
    /// addressable size.
    pub max_extraction_len: u64,
    /// Number of offsets per shard of a container index table.
    pub index_shard_len: usize,
}

impl DecodeLimits {
    /// Construct the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_extraction_len: PLATFORM_MAX_EXTRACTION,
            index_shard_len: DEFAULT_INDEX_SHARD_LEN,
        }
    }

    /// Default limits with extraction capped at `max_extraction_len` bytes.
    #[must_use]
    pub const fn for_extraction(max_extraction_len: u64) -> Self {
        let max_extraction_len = if max_extraction_len > PLATFORM_MAX_EXTRACTION {
            PLATFORM_MAX_EXTRACTION
        } else {
            max_extraction_len
        };
        Self {
            max_extraction_len,
            ..Self::new()
        }
    }

    /// Returns a copy with a different maximum nesting depth.
    #[must_use]
    pub const fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// Returns a copy with a different index shard length (at least 1).
    #[must_use]
    pub const fn with_index_shard_len(self, index_shard_len: usize) -> Self {
        let index_shard_len = if index_shard_len == 0 { 1 } else { index_shard_len };
        Self {
            index_shard_len,
            ..self
        }
    }

    pub(crate) const fn shard_len(self) -> usize {
        if self.index_shard_len == 0 {
            1
        } else {
            self.index_shard_len
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::new()
    }
}

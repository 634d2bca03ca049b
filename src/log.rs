//! Diagnostic event macros.
//!
//! With the `tracing` feature these forward to the `tracing` crate; without it
//! they expand to nothing, so call sites cost nothing in `no_std` builds.

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    }};
}

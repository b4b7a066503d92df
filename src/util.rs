//! Internal logging helpers.
//!
//! Both macros compile to nothing unless the `tracing` feature is enabled, so
//! call sites do not need their own `cfg` attributes.

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "faultline", $($arg)*);
    }};
}

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "faultline", $($arg)*);
    }};
}

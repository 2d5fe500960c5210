//! Logging hooks for the k-means loop.
//!
//! `enter_span!` opens and enters a span for one segmentation run and
//! `trace_event!` reports loop progress at a chosen level. Both forward to
//! `tracing` under the `tracing` feature. Without it the field expressions
//! are still evaluated by reference and nothing is recorded.

#[cfg(feature = "tracing")]
macro_rules! enter_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*).entered()
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! enter_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        $(let _ = &$value;)*
        $crate::trace::DisabledSpan
    }};
}

// `$level` is a `tracing` macro name: `info`, `debug`, `warn`, ...
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($level:ident, $name:literal, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::$level!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($level:ident, $name:literal, $($key:ident = $value:expr),+ $(,)?) => {{
        $(let _ = &$value;)+
    }};
}

pub(crate) use enter_span;
pub(crate) use trace_event;

/// Guard held for the span's scope when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub(crate) struct DisabledSpan;

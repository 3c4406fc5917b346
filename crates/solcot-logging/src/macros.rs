//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging helpers for quote processing."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! `quote_*` macros: `tracing` events carrying the fields of a [`QuoteLogContext`](crate::QuoteLogContext).

#[doc(hidden)]
#[macro_export]
macro_rules! __quote_log {
    ($level:expr, $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            $level,
            quote_id = ctx.quote_id.unwrap_or(""),
            department = ctx.department.unwrap_or(""),
            sector = ctx.sector.unwrap_or(""),
            phase = ctx.phase.unwrap_or(""),
            catalog_hash = ctx.catalog_hash.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an informational event with quote context.
#[macro_export]
macro_rules! quote_info {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::INFO, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::INFO, $crate::QuoteLogContext::default(), $($arg)+)
    };
}

/// Emit a debug event with quote context.
#[macro_export]
macro_rules! quote_debug {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::DEBUG, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::DEBUG, $crate::QuoteLogContext::default(), $($arg)+)
    };
}

/// Emit an error event with quote context.
#[macro_export]
macro_rules! quote_error {
    (context = $ctx:expr, $($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::ERROR, $ctx, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::__quote_log!(tracing::Level::ERROR, $crate::QuoteLogContext::default(), $($arg)+)
    };
}

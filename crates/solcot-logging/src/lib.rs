//! ---
//! ems_section: "03-persistence-logging"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Structured logging helpers for quote processing."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Structured logging helpers that attach quote context to tracing events.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialise a minimal stderr subscriber for tools that run without an `AppConfig`.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Quote context propagated by the logging macros.
#[derive(Debug, Default, Clone)]
pub struct QuoteLogContext<'a> {
    /// Identifier of the quote being processed.
    pub quote_id: Option<&'a str>,
    /// Department key, e.g. `la_paz`.
    pub department: Option<&'a str>,
    /// Sector key, e.g. `residential`.
    pub sector: Option<&'a str>,
    /// Grid phase, `P1` or `P3`.
    pub phase: Option<&'a str>,
    /// Catalog content hash the quote was computed against.
    pub catalog_hash: Option<&'a str>,
}

impl<'a> QuoteLogContext<'a> {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a quote identifier.
    pub fn with_quote_id(mut self, quote_id: &'a str) -> Self {
        self.quote_id = Some(quote_id);
        self
    }

    /// Attach the department key.
    pub fn with_department(mut self, department: &'a str) -> Self {
        self.department = Some(department);
        self
    }

    /// Attach the sector key.
    pub fn with_sector(mut self, sector: &'a str) -> Self {
        self.sector = Some(sector);
        self
    }

    /// Attach the grid phase.
    pub fn with_phase(mut self, phase: &'a str) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attach the catalog hash.
    pub fn with_catalog_hash(mut self, catalog_hash: &'a str) -> Self {
        self.catalog_hash = Some(catalog_hash);
        self
    }
}

/// Outcome recorded by [`log_quote_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The quote was produced.
    Success,
    /// The quote could not be produced.
    Rejected,
}

impl EventOutcome {
    /// Stable label written into the `outcome` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOutcome::Success => "success",
            EventOutcome::Rejected => "rejected",
        }
    }
}

macro_rules! quote_event {
    ($level:expr, $ctx:expr, $event:expr, $outcome:expr, $message:expr) => {
        tracing::event!(
            $level,
            event = $event,
            outcome = $outcome,
            quote_id = $ctx.quote_id.unwrap_or(""),
            department = $ctx.department.unwrap_or(""),
            sector = $ctx.sector.unwrap_or(""),
            phase = $ctx.phase.unwrap_or(""),
            catalog_hash = $ctx.catalog_hash.unwrap_or(""),
            message = %$message
        )
    };
}

/// Emit a quote lifecycle event; rejections are logged at `WARN`.
pub fn log_quote_event(
    context: Option<&QuoteLogContext>,
    event: &str,
    message: &str,
    outcome: EventOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    match outcome {
        EventOutcome::Success => {
            quote_event!(tracing::Level::INFO, ctx, event, outcome.as_str(), message)
        }
        EventOutcome::Rejected => {
            quote_event!(tracing::Level::WARN, ctx, event, outcome.as_str(), message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = QuoteLogContext::new()
            .with_department("la_paz")
            .with_sector("residential")
            .with_phase("P1");
        quote_info!(context = ctx.clone(), "quote ready");
        quote_debug!("catalog entries: {}", 19);
        quote_error!(context = ctx, "quote failed: {}", "no inverter");
    }

    #[test]
    fn builder_sets_every_field() {
        let ctx = QuoteLogContext::new()
            .with_quote_id("q-1")
            .with_department("beni")
            .with_sector("public")
            .with_phase("P3")
            .with_catalog_hash("ab12");
        assert_eq!(ctx.quote_id, Some("q-1"));
        assert_eq!(ctx.department, Some("beni"));
        assert_eq!(ctx.sector, Some("public"));
        assert_eq!(ctx.phase, Some("P3"));
        assert_eq!(ctx.catalog_hash, Some("ab12"));
    }

    #[test]
    fn quote_event_helper_emits() {
        init();
        let ctx = QuoteLogContext::new().with_quote_id("q-2");
        log_quote_event(Some(&ctx), "quote.computed", "quote computed", EventOutcome::Success);
        log_quote_event(None, "quote.rejected", "quote rejected", EventOutcome::Rejected);
        assert_eq!(EventOutcome::Rejected.as_str(), "rejected");
    }
}

//! Audit trail of gate decisions.
//!
//! Every request handled by the gate produces exactly one [`AuditEntry`]:
//! a warning for either rejection, or an info entry for an accepted request.
//! Entries go to an [`AuditSink`]. The default sink, [`TracingAudit`], emits
//! them as `tracing` events on the [`AUDIT_TARGET`] target, and [`layer`]
//! renders those events as audit log lines:
//!
//! ```text
//! 2026-10-19 09:14:03,512 - WARNING - Unauthorized access attempt
//! 2026-10-19 09:14:05,087 - INFO - Request received: Role=admin, Prompt=hi
//! ```

use crate::registry::Role;
use chrono::Local;
use std::fmt::{self, Write as _};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    Layer,
    filter::filter_fn,
    fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter, format::Writer},
    registry::LookupSpan,
};

/// `tracing` target carrying audit events.
pub const AUDIT_TARGET: &str = "chatgate::audit";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// One gate decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditEntry<'a> {
    Unauthorized,
    InvalidInput { prompt: &'a str },
    Accepted { role: Role, prompt: &'a str },
}

impl AuditEntry<'_> {
    pub fn level(&self) -> Level {
        match self {
            AuditEntry::Unauthorized | AuditEntry::InvalidInput { .. } => Level::WARN,
            AuditEntry::Accepted { .. } => Level::INFO,
        }
    }
}

impl fmt::Display for AuditEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEntry::Unauthorized => f.write_str("Unauthorized access attempt"),
            AuditEntry::InvalidInput { prompt } => {
                write!(f, "Invalid input detected: {}", OneLine(prompt))
            }
            AuditEntry::Accepted { role, prompt } => {
                write!(f, "Request received: Role={role}, Prompt={}", OneLine(prompt))
            }
        }
    }
}

/// Writes caller text with control characters and line separators escaped,
/// so a prompt can never start a new audit line.
struct OneLine<'a>(&'a str);

impl fmt::Display for OneLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}') {
                write!(f, "{}", c.escape_default())?;
            } else {
                f.write_char(c)?;
            }
        }
        Ok(())
    }
}

/// Destination for audit entries.
///
/// `record` is called once per request, before any downstream effect. A
/// sink must write each entry atomically.
pub trait AuditSink: Clone + Send + Sync + 'static {
    fn record(&self, entry: &AuditEntry<'_>);
}

/// Emits entries as `tracing` events on [`AUDIT_TARGET`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, entry: &AuditEntry<'_>) {
        match entry.level() {
            Level::INFO => tracing::info!(target: AUDIT_TARGET, "{entry}"),
            _ => tracing::warn!(target: AUDIT_TARGET, "{entry}"),
        }
    }
}

/// Event format for audit lines: `<timestamp> - <LEVEL> - <message>`.
///
/// Levels use the long names `INFO` and `WARNING`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuditFormat;

impl<S, N> FormatEvent<S, N> for AuditFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = match *event.metadata().level() {
            Level::ERROR => "ERROR",
            Level::WARN => "WARNING",
            Level::INFO => "INFO",
            Level::DEBUG => "DEBUG",
            Level::TRACE => "TRACE",
        };
        write!(
            writer,
            "{} - {level} - ",
            Local::now().format(TIMESTAMP_FORMAT)
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A subscriber layer that writes audit events, and nothing else, to
/// `make_writer` in [`AuditFormat`].
///
/// Events are matched on the exact [`AUDIT_TARGET`], not by prefix, so
/// diagnostics from modules under `chatgate::audit` stay out of the file.
///
/// The fmt layer renders a whole line before writing it, so a writer behind
/// a `Mutex` (e.g. `Mutex<File>`) receives one write per entry.
pub fn layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(AuditFormat)
        .with_writer(make_writer)
        .with_filter(filter_fn(|metadata| metadata.target() == AUDIT_TARGET))
}

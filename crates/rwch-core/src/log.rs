//! Explicit logging context handed to samplers at construction.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::Span;

/// How much a sampler reports on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Nothing at all.
    Quiet,
    /// Recoverable problems only.
    Warn,
    /// Progress and run statistics.
    Info,
    /// Per-stage details.
    Debug,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Info
    }
}

/// Logging handle threaded through sampler construction.
///
/// Events are emitted through `tracing` inside the context's span, so output
/// from the walk and hull layers called while the span is entered is attributed
/// to the same run.
#[derive(Debug, Clone)]
pub struct LogContext {
    verbosity: Verbosity,
    span: Span,
}

impl LogContext {
    /// Creates a context for the run named `label`.
    pub fn new(label: &str, verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            span: tracing::info_span!("run", label = %label),
        }
    }

    /// A context that reports nothing.
    pub fn muted() -> Self {
        Self {
            verbosity: Verbosity::Quiet,
            span: Span::none(),
        }
    }

    /// Derives a context for a worker, sharing the verbosity.
    pub fn child(&self, worker: &str, index: usize) -> Self {
        Self {
            verbosity: self.verbosity,
            span: self
                .span
                .in_scope(|| tracing::debug_span!("worker", kind = %worker, index)),
        }
    }

    /// Configured verbosity.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether messages at `level` are emitted.
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Quiet && self.verbosity >= level
    }

    /// Runs `f` with the context's span entered.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        self.span.in_scope(f)
    }

    /// Emits a warning.
    pub fn warn(&self, message: impl Display) {
        if self.enabled(Verbosity::Warn) {
            self.span.in_scope(|| tracing::warn!("{message}"));
        }
    }

    /// Emits an informational message.
    pub fn info(&self, message: impl Display) {
        if self.enabled(Verbosity::Info) {
            self.span.in_scope(|| tracing::info!("{message}"));
        }
    }

    /// Emits a debug message.
    pub fn debug(&self, message: impl Display) {
        if self.enabled(Verbosity::Debug) {
            self.span.in_scope(|| tracing::debug!("{message}"));
        }
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new("rwch", Verbosity::default())
    }
}

// crates/version-override-core/src/logging.rs
// ============================================================================
// Module: Operator Logging
// Description: Structured operator log events and sinks.
// Purpose: Emit stage-tagged diagnostics through an explicitly passed sink.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The override pipeline never logs through ambient global state. Callers
//! construct an [`OperatorLog`] once and pass it down to every stage. The
//! binary uses [`StderrLogSink`] (JSON lines on stderr); tests use
//! [`MemoryLogSink`] to assert which stages were reached.
//!
//! Security posture: events must never carry secrets (passwords, CA private
//! material). Credentials are logged by endpoint and tag only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event identifier stamped on every log line.
const LOG_EVENT_NAME: &str = "force_agent_version";

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Step-by-step tracing.
    Trace,
    /// Diagnostic detail.
    Debug,
    /// Normal progress.
    Info,
    /// Unexpected but non-fatal.
    Warn,
    /// Fatal for the run.
    Error,
}

/// Pipeline stage that produced an event or error.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Command-line input validation.
    Input,
    /// Machine identity discovery.
    Identity,
    /// Agent config loading.
    Config,
    /// Store connection.
    Connect,
    /// Targeted mutation.
    Mutate,
    /// Session release.
    Close,
}

impl Stage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Identity => "identity",
            Self::Config => "config",
            Self::Connect => "connect",
            Self::Mutate => "mutate",
            Self::Close => "close",
        }
    }

    /// Returns the annotation prefixed to errors raised by the stage.
    #[must_use]
    pub const fn annotation(self) -> &'static str {
        match self {
            Self::Input => "parsing arguments",
            Self::Identity => "finding machine tag",
            Self::Config => "loading agent config",
            Self::Connect => "opening state connection",
            Self::Mutate => "set model agent version",
            Self::Close => "closing state connection",
        }
    }
}

/// One structured operator log event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: LogLevel,
    /// Stage that emitted the event.
    pub stage: Stage,
    /// Human-readable message.
    pub message: String,
    /// Additional key/value context.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<&'static str, String>,
}

impl LogEvent {
    /// Creates a new event with a consistent timestamp.
    #[must_use]
    pub fn new(level: LogLevel, stage: Stage, message: impl Into<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: LOG_EVENT_NAME,
            timestamp_ms,
            level,
            stage,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a context field.
    #[must_use]
    pub fn with_field(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for operator log events.
pub trait OperatorLog: Send + Sync {
    /// Records one event.
    fn record(&self, event: &LogEvent);

    /// Records a message without extra fields.
    fn emit(&self, level: LogLevel, stage: Stage, message: String) {
        self.record(&LogEvent::new(level, stage, message));
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that writes JSON lines to stderr.
pub struct StderrLogSink {
    /// Least severe level that is written.
    min_level: LogLevel,
}

impl StderrLogSink {
    /// Creates a sink that writes events at `min_level` and above.
    #[must_use]
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
        }
    }
}

impl OperatorLog for StderrLogSink {
    fn record(&self, event: &LogEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryLogSink {
    /// Recorded events in emission order.
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns true when any event was recorded for `stage`.
    #[must_use]
    pub fn saw_stage(&self, stage: Stage) -> bool {
        self.events().iter().any(|event| event.stage == stage)
    }
}

impl OperatorLog for MemoryLogSink {
    fn record(&self, event: &LogEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

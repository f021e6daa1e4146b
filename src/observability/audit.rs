/// Run lifecycle event logging for benchbox
/// Every sandbox run emits structured events under the `benchbox::audit`
/// log target, one JSON object per line, tied together by a run id.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log target for audit records
pub const AUDIT_TARGET: &str = "benchbox::audit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

/// Types of run events we track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEventType {
    SandboxCreated,
    SandboxStarted,
    InputDelivered,
    InputFailed,
    StreamClosed,
    SandboxRemoved,
    RemovalFailed,
    ResultClassified,
}

impl RunEventType {
    pub fn default_severity(&self) -> EventSeverity {
        match self {
            RunEventType::InputFailed => EventSeverity::Warning,
            RunEventType::RemovalFailed => EventSeverity::Error,
            _ => EventSeverity::Info,
        }
    }
}

/// Correlation identifiers for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationIds {
    /// Unique run identifier (one per sandbox)
    pub run_id: String,
    /// Result key of the snippet being measured, when known
    pub filename: Option<String>,
    /// Engine id of the sandbox, once created
    pub container_id: Option<String>,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            filename: None,
            container_id: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub event_type: RunEventType,
    pub severity: EventSeverity,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub details: String,
    pub correlation: CorrelationIds,
}

impl RunEvent {
    pub fn new(event_type: RunEventType, correlation: &CorrelationIds, details: String) -> Self {
        Self {
            event_type,
            severity: event_type.default_severity(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details,
            correlation: correlation.clone(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

pub fn log_run_event(event: RunEvent) {
    let record = event.to_json();
    match event.severity {
        EventSeverity::Info => log::info!(target: AUDIT_TARGET, "{}", record),
        EventSeverity::Warning => log::warn!(target: AUDIT_TARGET, "{}", record),
        EventSeverity::Error => log::error!(target: AUDIT_TARGET, "{}", record),
    }
}

pub fn sandbox_created(correlation: &CorrelationIds, image: &str) {
    log_run_event(RunEvent::new(
        RunEventType::SandboxCreated,
        correlation,
        format!("Sandbox created from image {}", image),
    ));
}

pub fn sandbox_started(correlation: &CorrelationIds) {
    log_run_event(RunEvent::new(
        RunEventType::SandboxStarted,
        correlation,
        "Sandbox started".to_string(),
    ));
}

pub fn input_delivered(correlation: &CorrelationIds, bytes: usize) {
    log_run_event(RunEvent::new(
        RunEventType::InputDelivered,
        correlation,
        format!("Delivered {} bytes of source", bytes),
    ));
}

pub fn input_failed(correlation: &CorrelationIds, reason: String) {
    log_run_event(RunEvent::new(
        RunEventType::InputFailed,
        correlation,
        format!("Source delivery failed: {}", reason),
    ));
}

pub fn stream_closed(correlation: &CorrelationIds, stdout_bytes: usize, stderr_bytes: usize) {
    log_run_event(RunEvent::new(
        RunEventType::StreamClosed,
        correlation,
        format!(
            "Output stream closed: stdout={} bytes, stderr={} bytes",
            stdout_bytes, stderr_bytes
        ),
    ));
}

pub fn sandbox_removed(correlation: &CorrelationIds) {
    log_run_event(RunEvent::new(
        RunEventType::SandboxRemoved,
        correlation,
        "Sandbox removed".to_string(),
    ));
}

pub fn removal_failed(correlation: &CorrelationIds, reason: String) {
    log_run_event(RunEvent::new(
        RunEventType::RemovalFailed,
        correlation,
        format!("Sandbox removal failed: {}", reason),
    ));
}

pub fn result_classified(correlation: &CorrelationIds, verdict: String) {
    log_run_event(RunEvent::new(
        RunEventType::ResultClassified,
        correlation,
        format!("Result classified: {}", verdict),
    ));
}

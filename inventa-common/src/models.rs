//! Data models for the inventa inventory service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One normalized inventory article.
///
/// The natural key is `placa`, the external asset tag. Uniqueness is NOT
/// enforced: the upstream spreadsheet occasionally repeats a tag across
/// sheets and the source of record keeps all of them, so we do too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryRecord {
    /// Asset tag ("placa"), required and non-empty after trimming
    pub placa: String,
    /// Display name: description plus brand/model tokens when present
    pub name: String,
    /// Brand, empty string when the source cell was a sentinel
    pub brand: String,
    /// Model, empty string when the source cell was a sentinel
    pub model: String,
    /// Category (base description, or the configured fallback label)
    pub category: String,
    /// Free-text description / attributes column
    pub description: String,
    /// Monetary value parsed from the source cell; 0.0 when unparseable
    pub value: f64,
    /// Acquisition date, verbatim from the sheet
    pub acquired_date: String,
    /// Physical location, with a configured default when absent
    pub location: String,
    /// Resolved owner, never empty (falls back to the unassigned label)
    pub owner: String,
    /// Free-text observations
    pub notes: String,
    /// Secondary running counter from the sheet
    pub sequence: String,
    /// Element type label
    pub item_type: String,
    /// Title of the worksheet the row came from (bookkeeping only)
    pub source_sheet: String,
}

/// Raw contents of one worksheet: header row plus data rows.
///
/// Rows may be ragged (shorter than the header); the normalizer pads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetRows {
    /// Worksheet title
    pub title: String,
    /// Header row
    pub headers: Vec<String>,
    /// Data rows (everything below the header)
    pub rows: Vec<Vec<String>>,
}

/// Outcome classification for a pull or push run.
///
/// `Degraded` replaces the legacy behavior of writing a synthetic
/// placeholder record when the source was unreachable or empty: callers
/// can now tell "zero real records" apart from "source unusable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Run completed and the destination reflects the source
    Ok,
    /// Source was unreachable or empty; destination left untouched
    Degraded,
    /// Run aborted (destination write failure or cancellation)
    Failed,
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    /// Records written (pull) or rows serialized (push)
    pub rows: u64,
    /// Human-readable reason when status is not `Ok`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SyncOutcome {
    pub fn ok(rows: u64) -> Self {
        Self { status: SyncStatus::Ok, rows, reason: None }
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self { status: SyncStatus::Degraded, rows: 0, reason: Some(reason.into()) }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { status: SyncStatus::Failed, rows: 0, reason: Some(reason.into()) }
    }
}

/// Direction of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// Sheet → local store (full replace)
    Pull,
    /// Local store → sheet (full overwrite)
    Push,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Pull => "pull",
            RunKind::Push => "push",
        }
    }
}

/// Lifecycle state of a background sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunState {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// Persisted record of one background pull/push run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub run_id: Uuid,
    pub kind: RunKind,
    pub state: RunState,
    /// Outcome classification, present once the run finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SyncStatus>,
    /// Rows handled by the run so far
    pub rows: u64,
    /// Error text when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl SyncRun {
    /// Create a new run in the Running state
    pub fn new(kind: RunKind) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind,
            state: RunState::Running,
            outcome: None,
            rows: 0,
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a terminal state, stamping `ended_at`
    pub fn finish(&mut self, state: RunState, outcome: SyncOutcome) {
        self.state = state;
        self.rows = outcome.rows;
        self.outcome = Some(outcome.status);
        self.error = outcome.reason;
        self.ended_at = Some(Utc::now());
    }
}

//! Workflow events and EventBus
//!
//! The review workflow broadcasts a [`WorkflowEvent`] for every state change so
//! any number of presentation subscribers can redraw without polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Network operation that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// File upload to `/api/analyze`
    Analyze,
    /// Interest update to `/api/update-person-interests`
    Commit,
}

/// Review workflow events
///
/// Every variant carries the id of the workflow that emitted it and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkflowEvent {
    /// A new input file replaced the previous selection
    FileSelected {
        session_id: Uuid,
        file_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Analyze request sent
    AnalysisStarted {
        session_id: Uuid,
        generation: u64,
        file_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Result store replaced by a service response
    ResultReplaced {
        session_id: Uuid,
        source: RequestKind,
        total_people: u32,
        total_communities: u32,
        timestamp: DateTime<Utc>,
    },

    /// Analyze or commit failed; `message` is what the user sees
    RequestFailed {
        session_id: Uuid,
        operation: RequestKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Edit session opened for a person
    EditStarted {
        session_id: Uuid,
        person_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Edit session closed without saving
    EditCancelled {
        session_id: Uuid,
        person_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Edited interests sent to the service
    SaveStarted {
        session_id: Uuid,
        generation: u64,
        person_name: String,
        interest_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a request that is no longer current
    StaleCompletionDiscarded {
        session_id: Uuid,
        operation: RequestKind,
        generation: u64,
        timestamp: DateTime<Utc>,
    },

    /// Result, file, edit session and error were reset together
    Cleared {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// User dismissed the surfaced error message
    ErrorDismissed {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl WorkflowEvent {
    /// Id of the workflow that emitted this event
    pub fn session_id(&self) -> Uuid {
        match self {
            WorkflowEvent::FileSelected { session_id, .. }
            | WorkflowEvent::AnalysisStarted { session_id, .. }
            | WorkflowEvent::ResultReplaced { session_id, .. }
            | WorkflowEvent::RequestFailed { session_id, .. }
            | WorkflowEvent::EditStarted { session_id, .. }
            | WorkflowEvent::EditCancelled { session_id, .. }
            | WorkflowEvent::SaveStarted { session_id, .. }
            | WorkflowEvent::StaleCompletionDiscarded { session_id, .. }
            | WorkflowEvent::Cleared { session_id, .. }
            | WorkflowEvent::ErrorDismissed { session_id, .. } => *session_id,
        }
    }
}

/// Broadcast channel for [`WorkflowEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WorkflowEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: WorkflowEvent,
    ) -> Result<usize, broadcast::error::SendError<WorkflowEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: WorkflowEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

//! Result store
//!
//! Single authoritative slot for the latest [`AnalysisResult`]. The slot is
//! only ever replaced wholesale; service responses are never merged.

use crate::edit_session::EditSession;
use chrono::{DateTime, Utc};
use cmap_common::events::RequestKind;
use cmap_common::AnalysisResult;

/// The stored result together with its edit session
#[derive(Debug, Clone)]
pub struct Review {
    result: AnalysisResult,
    source: RequestKind,
    received_at: DateTime<Utc>,
    session: EditSession,
}

impl Review {
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    /// Operation whose response filled the slot
    pub fn source(&self) -> RequestKind {
        self.source
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }
}

/// Single-slot result container
#[derive(Debug, Default)]
pub struct ResultStore {
    slot: Option<Review>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&AnalysisResult> {
        self.slot.as_ref().map(Review::result)
    }

    pub fn review(&self) -> Option<&Review> {
        self.slot.as_ref()
    }

    pub(crate) fn review_mut(&mut self) -> Option<&mut Review> {
        self.slot.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Replace the slot; any open edit session is closed with it
    pub fn replace(&mut self, result: AnalysisResult, source: RequestKind) -> Option<AnalysisResult> {
        let previous = self.slot.replace(Review {
            result,
            source,
            received_at: Utc::now(),
            session: EditSession::Closed,
        });
        previous.map(|review| review.result)
    }

    pub fn clear(&mut self) -> Option<AnalysisResult> {
        self.slot.take().map(|review| review.result)
    }
}

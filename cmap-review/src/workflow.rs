//! Review workflow reducer
//!
//! Single owner of all client state: the selected file, the result store with
//! its edit session, the in-flight analyze ticket and the surfaced error.
//!
//! Network calls are split into `begin_*` (hands out a [`Ticket`]) and
//! `complete_*`/`fail_*` (applies the response). A completion is applied only
//! if its ticket is still the current one for that operation; anything else
//! (after `clear()`, a cancelled edit, or a newer result) is discarded.
//!
//! Presentation reads the workflow through [`WorkflowState`]:
//! IDLE → ANALYZING → VIEWING ⇄ EDITING → SAVING

use crate::edit_session::{EditSession, SessionState};
use crate::error::{ClientError, ClientResult};
use crate::store::ResultStore;
use crate::upload::{SelectedFile, UploadCoordinator};
use chrono::Utc;
use cmap_common::events::{EventBus, RequestKind, WorkflowEvent};
use cmap_common::{AnalysisResult, EditBuffer};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Workflow shared between the facade and the orchestrators
pub type SharedWorkflow = Arc<RwLock<Workflow>>;

/// Fence for one in-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    generation: u64,
}

impl Ticket {
    pub(crate) fn new(kind: RequestKind, generation: u64) -> Self {
        Self { kind, generation }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Monotonic per workflow; later requests have larger generations
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No result held, nothing in flight
    Idle,
    /// Analyze request in flight (a previous result may still be held)
    Analyzing,
    /// Result held, no edit session
    Viewing,
    /// Edit session open
    Editing,
    /// Edited interests in flight
    Saving,
}

/// Whether a response changed the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// Ticket no longer current; response ignored
    Discarded,
}

/// Analyze call to perform
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub ticket: Ticket,
    pub file: SelectedFile,
}

/// Update call to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: Ticket,
    pub person_name: String,
    /// Blank entries already removed
    pub interests: Vec<String>,
}

/// Client state reducer
#[derive(Debug)]
pub struct Workflow {
    session_id: Uuid,
    upload: UploadCoordinator,
    store: ResultStore,
    /// Set while analyzing (the `loading` flag)
    analysis: Option<Ticket>,
    error: Option<String>,
    generation: u64,
    events: EventBus,
}

impl Workflow {
    pub fn new(events: EventBus) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            upload: UploadCoordinator::new(),
            store: ResultStore::new(),
            analysis: None,
            error: None,
            generation: 0,
            events,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> WorkflowState {
        if self.analysis.is_some() {
            return WorkflowState::Analyzing;
        }
        match self.store.review().map(|r| r.session().state()) {
            None => WorkflowState::Idle,
            Some(SessionState::Closed) => WorkflowState::Viewing,
            Some(SessionState::Editing) => WorkflowState::Editing,
            Some(SessionState::Saving) => WorkflowState::Saving,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn is_updating(&self) -> bool {
        self.session_state() == SessionState::Saving
    }

    /// Message currently surfaced to the user
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.upload.selected()
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.store.current()
    }

    pub fn session_state(&self) -> SessionState {
        self.store
            .review()
            .map(|r| r.session().state())
            .unwrap_or(SessionState::Closed)
    }

    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.store.review().and_then(|r| r.session().buffer())
    }

    /// Whether the open buffer differs from the person's committed interests
    pub fn has_unsaved_changes(&self) -> bool {
        let Some(buffer) = self.edit_buffer() else {
            return false;
        };
        let committed = self
            .result()
            .and_then(|result| result.interests_of(&buffer.person_name))
            .unwrap_or(&[]);
        buffer.is_dirty(committed)
    }

    // ------------------------------------------------------------------
    // Upload
    // ------------------------------------------------------------------

    /// Replace the selected file and clear any surfaced error
    pub fn select_file(&mut self, file: SelectedFile) {
        info!(
            session_id = %self.session_id,
            file = %file.name(),
            bytes = file.len(),
            "File selected"
        );
        let file_name = file.name().to_string();
        self.upload.select(file);
        self.error = None;
        self.events.emit_lossy(WorkflowEvent::FileSelected {
            session_id: self.session_id,
            file_name,
            timestamp: Utc::now(),
        });
    }

    pub fn clear_file(&mut self) {
        self.upload.clear();
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Start an analyze request for the selected file
    pub fn begin_analyze(&mut self) -> ClientResult<AnalyzeRequest> {
        if let Some(ticket) = self.analysis {
            return Err(ClientError::Busy(format!(
                "analysis #{} is already in progress",
                ticket.generation
            )));
        }

        let Some(file) = self.upload.selected().cloned() else {
            return Err(self.surface(ClientError::Validation("no file selected".to_string())));
        };

        let ticket = self.next_ticket(RequestKind::Analyze);
        self.analysis = Some(ticket);
        self.error = None;

        info!(
            session_id = %self.session_id,
            generation = ticket.generation,
            file = %file.name(),
            "Analysis started"
        );
        self.events.emit_lossy(WorkflowEvent::AnalysisStarted {
            session_id: self.session_id,
            generation: ticket.generation,
            file_name: file.name().to_string(),
            timestamp: Utc::now(),
        });

        Ok(AnalyzeRequest { ticket, file })
    }

    /// Apply a successful analyze response: full replace, edit session closed
    pub fn complete_analyze(&mut self, ticket: Ticket, result: AnalysisResult) -> Completion {
        if self.analysis != Some(ticket) {
            self.discard_stale(ticket);
            return Completion::Discarded;
        }
        self.analysis = None;
        self.replace_result(result, RequestKind::Analyze);
        Completion::Applied
    }

    /// Record a failed analyze; any held result is preserved
    pub fn fail_analyze(&mut self, ticket: Ticket, error: &ClientError) -> Completion {
        if self.analysis != Some(ticket) {
            self.discard_stale(ticket);
            return Completion::Discarded;
        }
        self.analysis = None;
        self.record_failure(RequestKind::Analyze, error);
        Completion::Applied
    }

    // ------------------------------------------------------------------
    // Interest editing
    // ------------------------------------------------------------------

    /// Open an edit session seeded with the person's committed interests
    ///
    /// Requires a held result that carries people data. A person missing
    /// from people data starts with an empty list.
    pub fn start_editing(&mut self, person_name: &str) -> ClientResult<()> {
        if person_name.trim().is_empty() {
            return Err(self.surface(ClientError::Validation(
                "person name is required".to_string(),
            )));
        }

        let review = self
            .store
            .review_mut()
            .ok_or_else(|| ClientError::InvalidState("no analysis result to edit".to_string()))?;
        let committed = match &review.result().people_data {
            Some(people) => people.get(person_name).cloned().unwrap_or_default(),
            None => {
                return Err(ClientError::InvalidState(
                    "result carries no people data; interest editing is unavailable".to_string(),
                ))
            }
        };
        review.session_mut().start(person_name, &committed)?;

        info!(
            session_id = %self.session_id,
            person = %person_name,
            interests = committed.len(),
            "Edit session started"
        );
        self.events.emit_lossy(WorkflowEvent::EditStarted {
            session_id: self.session_id,
            person_name: person_name.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    pub fn remove_interest(&mut self, index: usize) -> ClientResult<bool> {
        Ok(self.buffer_mut()?.remove_interest(index))
    }

    pub fn add_interest(&mut self, text: &str) -> ClientResult<bool> {
        Ok(self.buffer_mut()?.add_interest(text))
    }

    pub fn update_interest(&mut self, index: usize, text: &str) -> ClientResult<bool> {
        Ok(self.buffer_mut()?.update_interest(index, text))
    }

    pub fn set_pending_text(&mut self, text: &str) -> ClientResult<()> {
        self.buffer_mut()?.set_pending_text(text);
        Ok(())
    }

    pub fn add_pending_interest(&mut self) -> ClientResult<bool> {
        Ok(self.buffer_mut()?.add_pending_interest())
    }

    /// Close the edit session without saving
    ///
    /// Returns false when no session was open. Cancelling during a save
    /// abandons it; the late response is discarded.
    pub fn cancel_editing(&mut self) -> bool {
        let Some(discarded) = self
            .store
            .review_mut()
            .and_then(|review| review.session_mut().cancel())
        else {
            return false;
        };

        info!(
            session_id = %self.session_id,
            person = %discarded.person_name,
            "Edit session cancelled"
        );
        self.events.emit_lossy(WorkflowEvent::EditCancelled {
            session_id: self.session_id,
            person_name: discarded.person_name,
            timestamp: Utc::now(),
        });
        true
    }

    /// EDITING → SAVING; returns the update call to perform
    pub fn begin_save(&mut self) -> ClientResult<SaveRequest> {
        let ticket = Ticket::new(RequestKind::Commit, self.generation + 1);
        let begun = self.session_mut().and_then(|session| session.begin_save(ticket));
        let (person_name, interests) = match begun {
            Ok(request) => request,
            Err(e) => return Err(self.surface(e)),
        };
        self.generation = ticket.generation;
        self.error = None;

        info!(
            session_id = %self.session_id,
            generation = ticket.generation,
            person = %person_name,
            interests = interests.len(),
            "Saving interests"
        );
        self.events.emit_lossy(WorkflowEvent::SaveStarted {
            session_id: self.session_id,
            generation: ticket.generation,
            person_name: person_name.clone(),
            interest_count: interests.len(),
            timestamp: Utc::now(),
        });

        Ok(SaveRequest {
            ticket,
            person_name,
            interests,
        })
    }

    /// Apply a regenerated result; replaces the store and closes the session
    pub fn complete_save(&mut self, ticket: Ticket, result: AnalysisResult) -> Completion {
        let pending = self
            .store
            .review()
            .and_then(|review| review.session().pending_save());
        if pending != Some(ticket) {
            self.discard_stale(ticket);
            return Completion::Discarded;
        }
        self.replace_result(result, RequestKind::Commit);
        Completion::Applied
    }

    /// Return to EDITING with the buffer intact and surface the error
    pub fn fail_save(&mut self, ticket: Ticket, error: &ClientError) -> Completion {
        let reverted = self
            .store
            .review_mut()
            .map(|review| review.session_mut().fail_save(ticket))
            .unwrap_or(false);
        if !reverted {
            self.discard_stale(ticket);
            return Completion::Discarded;
        }
        self.record_failure(RequestKind::Commit, error);
        Completion::Applied
    }

    // ------------------------------------------------------------------
    // Reset
    // ------------------------------------------------------------------

    /// Empty the store, close the edit session, drop the file and the error
    ///
    /// An in-flight analyze is abandoned; its response will be discarded.
    pub fn clear(&mut self) {
        let abandoned = self.analysis.take();
        self.store.clear();
        self.upload.clear();
        self.error = None;

        info!(
            session_id = %self.session_id,
            abandoned_generation = abandoned.map(|t| t.generation),
            "Workflow cleared"
        );
        self.events.emit_lossy(WorkflowEvent::Cleared {
            session_id: self.session_id,
            timestamp: Utc::now(),
        });
    }

    pub fn dismiss_error(&mut self) {
        if self.error.take().is_some() {
            self.events.emit_lossy(WorkflowEvent::ErrorDismissed {
                session_id: self.session_id,
                timestamp: Utc::now(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn next_ticket(&mut self, kind: RequestKind) -> Ticket {
        self.generation += 1;
        Ticket::new(kind, self.generation)
    }

    fn session_mut(&mut self) -> ClientResult<&mut EditSession> {
        self.store
            .review_mut()
            .map(|review| review.session_mut())
            .ok_or_else(|| ClientError::InvalidState("no analysis result to edit".to_string()))
    }

    fn buffer_mut(&mut self) -> ClientResult<&mut EditBuffer> {
        self.session_mut()?.buffer_mut()
    }

    /// Validation errors are shown inline; other rejections are only returned
    fn surface(&mut self, error: ClientError) -> ClientError {
        if matches!(error, ClientError::Validation(_)) {
            self.error = Some(error.to_string());
        }
        error
    }

    fn replace_result(&mut self, result: AnalysisResult, source: RequestKind) {
        let total_people = result.total_people;
        let total_communities = result.total_communities;
        self.store.replace(result, source);

        info!(
            session_id = %self.session_id,
            ?source,
            total_people,
            total_communities,
            "Result replaced"
        );
        self.events.emit_lossy(WorkflowEvent::ResultReplaced {
            session_id: self.session_id,
            source,
            total_people,
            total_communities,
            timestamp: Utc::now(),
        });
    }

    fn record_failure(&mut self, operation: RequestKind, error: &ClientError) {
        let message = error.to_string();
        warn!(
            session_id = %self.session_id,
            ?operation,
            status = error.status(),
            error = %message,
            "Request failed"
        );
        self.error = Some(message.clone());
        self.events.emit_lossy(WorkflowEvent::RequestFailed {
            session_id: self.session_id,
            operation,
            message,
            timestamp: Utc::now(),
        });
    }

    fn discard_stale(&self, ticket: Ticket) {
        warn!(
            session_id = %self.session_id,
            operation = ?ticket.kind,
            generation = ticket.generation,
            "Discarding stale completion"
        );
        debug!(current_analysis = ?self.analysis, "Ticket no longer current");
        self.events.emit_lossy(WorkflowEvent::StaleCompletionDiscarded {
            session_id: self.session_id,
            operation: ticket.kind,
            generation: ticket.generation,
            timestamp: Utc::now(),
        });
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}

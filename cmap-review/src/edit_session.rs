//! Interest edit session
//!
//! State machine for editing one person's interests before commit:
//! CLOSED → EDITING → SAVING → CLOSED (success) or back to EDITING (failure).
//!
//! A session only exists inside a filled result store slot, so it can never
//! be open without a result to edit.

use crate::error::{ClientError, ClientResult};
use crate::workflow::Ticket;
use cmap_common::EditBuffer;

/// Edit session phase, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Editing,
    Saving,
}

/// Edit session holding at most one [`EditBuffer`]
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Closed,
    /// Buffer open for edits
    Editing(EditBuffer),
    /// Filtered interests sent; buffer kept for retry on failure
    Saving { buffer: EditBuffer, ticket: Ticket },
}

impl EditSession {
    pub fn state(&self) -> SessionState {
        match self {
            EditSession::Closed => SessionState::Closed,
            EditSession::Editing(_) => SessionState::Editing,
            EditSession::Saving { .. } => SessionState::Saving,
        }
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match self {
            EditSession::Closed => None,
            EditSession::Editing(buffer) | EditSession::Saving { buffer, .. } => Some(buffer),
        }
    }

    /// Open a buffer for `person_name` seeded with `committed`
    ///
    /// Starting while already editing switches person and drops the old buffer.
    pub fn start(&mut self, person_name: &str, committed: &[String]) -> ClientResult<()> {
        if person_name.trim().is_empty() {
            return Err(ClientError::Validation("person name is required".to_string()));
        }
        if let EditSession::Saving { buffer, .. } = self {
            return Err(ClientError::Busy(format!(
                "interests for '{}' are being saved",
                buffer.person_name
            )));
        }
        *self = EditSession::Editing(EditBuffer::new(person_name, committed));
        Ok(())
    }

    /// Mutable buffer, only while editing
    pub fn buffer_mut(&mut self) -> ClientResult<&mut EditBuffer> {
        match self {
            EditSession::Editing(buffer) => Ok(buffer),
            EditSession::Saving { .. } => Err(ClientError::Busy(
                "interests are being saved".to_string(),
            )),
            EditSession::Closed => Err(ClientError::InvalidState(
                "no edit session is open".to_string(),
            )),
        }
    }

    /// Close the session, returning the discarded buffer
    ///
    /// Cancelling while saving abandons the request; its response is fenced
    /// out by the ticket.
    pub fn cancel(&mut self) -> Option<EditBuffer> {
        match std::mem::take(self) {
            EditSession::Closed => None,
            EditSession::Editing(buffer) | EditSession::Saving { buffer, .. } => Some(buffer),
        }
    }

    /// EDITING → SAVING; returns the person and blank-filtered interests to send
    pub fn begin_save(&mut self, ticket: Ticket) -> ClientResult<(String, Vec<String>)> {
        let buffer = match std::mem::take(self) {
            EditSession::Editing(buffer) => buffer,
            other => {
                let state = other.state();
                *self = other;
                return Err(match state {
                    SessionState::Saving => {
                        ClientError::Busy("interests are already being saved".to_string())
                    }
                    _ => ClientError::InvalidState("no edit session is open".to_string()),
                });
            }
        };

        if buffer.person_name.trim().is_empty() {
            *self = EditSession::Editing(buffer);
            return Err(ClientError::Validation("person name is required".to_string()));
        }

        let request = (buffer.person_name.clone(), buffer.filtered_interests());
        *self = EditSession::Saving { buffer, ticket };
        Ok(request)
    }

    /// Ticket of the in-flight save, if any
    pub fn pending_save(&self) -> Option<Ticket> {
        match self {
            EditSession::Saving { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// SAVING → EDITING with the buffer untouched; false if `ticket` is stale
    pub fn fail_save(&mut self, ticket: Ticket) -> bool {
        if self.pending_save() != Some(ticket) {
            return false;
        }
        if let EditSession::Saving { buffer, .. } = std::mem::take(self) {
            *self = EditSession::Editing(buffer);
        }
        true
    }
}

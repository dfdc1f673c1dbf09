//! Update orchestrator
//!
//! Drives "submit edited interests → receive regenerated grouping". On
//! success the response replaces the result store wholesale.

use crate::error::{ClientError, ClientResult};
use crate::service::ServiceClient;
use crate::workflow::{Completion, SaveRequest, SharedWorkflow};
use std::sync::Arc;
use tracing::debug;

/// Runs interest updates against the shared workflow
#[derive(Debug, Clone)]
pub struct UpdateOrchestrator {
    workflow: SharedWorkflow,
    service: Arc<ServiceClient>,
}

impl UpdateOrchestrator {
    pub fn new(workflow: SharedWorkflow, service: Arc<ServiceClient>) -> Self {
        Self { workflow, service }
    }

    /// Save the open edit session
    pub async fn save(&self) -> ClientResult<Completion> {
        let request = self.workflow.write().await.begin_save()?;
        self.commit(request).await
    }

    /// Send a prepared save and apply the response
    ///
    /// No automatic retry: on failure the session is back in editing with
    /// its buffer intact.
    pub async fn commit(&self, request: SaveRequest) -> ClientResult<Completion> {
        let SaveRequest {
            ticket,
            person_name,
            interests,
        } = request;
        debug!(generation = ticket.generation(), person = %person_name, "Commit ticket issued");

        let outcome = if person_name.trim().is_empty() {
            Err(ClientError::Validation("person name is required".to_string()))
        } else {
            self.service
                .update_person_interests(&person_name, &interests)
                .await
        };

        let mut workflow = self.workflow.write().await;
        match outcome {
            Ok(result) => Ok(workflow.complete_save(ticket, result)),
            Err(e) => match workflow.fail_save(ticket, &e) {
                Completion::Applied => Err(e),
                Completion::Discarded => Ok(Completion::Discarded),
            },
        }
    }
}

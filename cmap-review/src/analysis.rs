//! Analysis request orchestrator
//!
//! Drives "submit file → receive grouping". The workflow lock is held only
//! while handing out and applying the ticket, never across the network call.

use crate::error::ClientResult;
use crate::service::ServiceClient;
use crate::workflow::{Completion, SharedWorkflow};
use std::sync::Arc;
use tracing::debug;

/// Runs analyze requests against the shared workflow
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    workflow: SharedWorkflow,
    service: Arc<ServiceClient>,
}

impl AnalysisOrchestrator {
    pub fn new(workflow: SharedWorkflow, service: Arc<ServiceClient>) -> Self {
        Self { workflow, service }
    }

    /// Upload the selected file and apply the response
    ///
    /// Returns `Err` when the request was refused (no file, already loading)
    /// or when it failed and the failure was applied. A response that arrives
    /// after its ticket was invalidated yields `Ok(Completion::Discarded)`.
    pub async fn analyze(&self) -> ClientResult<Completion> {
        let request = self.workflow.write().await.begin_analyze()?;
        debug!(generation = request.ticket.generation(), "Analyze ticket issued");

        let outcome = self.service.analyze(&request.file).await;

        let mut workflow = self.workflow.write().await;
        match outcome {
            Ok(result) => Ok(workflow.complete_analyze(request.ticket, result)),
            Err(e) => match workflow.fail_analyze(request.ticket, &e) {
                Completion::Applied => Err(e),
                Completion::Discarded => Ok(Completion::Discarded),
            },
        }
    }
}

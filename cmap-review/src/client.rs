//! Review client facade
//!
//! Entry point for a presentation layer: wires the workflow, the service
//! client and both orchestrators, and exposes every user action as one call.

use crate::analysis::AnalysisOrchestrator;
use crate::edit_session::SessionState;
use crate::error::ClientResult;
use crate::service::{HealthStatus, PersonInterests, ServiceClient};
use crate::update::UpdateOrchestrator;
use crate::upload::SelectedFile;
use crate::view::{self, CommunityCard, PersonEntry, SummaryView};
use crate::workflow::{Completion, SharedWorkflow, Workflow, WorkflowState};
use cmap_common::config::{ResolvedConfig, ServiceConfig};
use cmap_common::events::{EventBus, WorkflowEvent};
use cmap_common::{AnalysisResult, EditBuffer};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

/// Everything a view needs to render, read under one lock
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: WorkflowState,
    pub loading: bool,
    pub updating: bool,
    pub error: Option<String>,
    pub selected_file: Option<String>,
    pub result: Option<AnalysisResult>,
    pub edit_buffer: Option<EditBuffer>,
    pub unsaved_changes: bool,
}

impl Snapshot {
    fn of(workflow: &Workflow) -> Self {
        Self {
            state: workflow.state(),
            loading: workflow.is_loading(),
            updating: workflow.is_updating(),
            error: workflow.error().map(str::to_string),
            selected_file: workflow.selected_file().map(|f| f.name().to_string()),
            result: workflow.result().cloned(),
            edit_buffer: workflow.edit_buffer().cloned(),
            unsaved_changes: workflow.has_unsaved_changes(),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, WorkflowState::Editing | WorkflowState::Saving)
    }
}

/// Community review client
#[derive(Debug, Clone)]
pub struct ReviewClient {
    workflow: SharedWorkflow,
    service: Arc<ServiceClient>,
    analysis: AnalysisOrchestrator,
    update: UpdateOrchestrator,
    events: EventBus,
}

impl ReviewClient {
    pub fn new(config: ServiceConfig) -> ClientResult<Self> {
        Self::with_event_bus(config, EventBus::default())
    }

    pub fn from_resolved(resolved: &ResolvedConfig) -> ClientResult<Self> {
        Self::new(resolved.service.clone())
    }

    pub fn with_event_bus(config: ServiceConfig, events: EventBus) -> ClientResult<Self> {
        let service = Arc::new(ServiceClient::new(config)?);
        let workflow: SharedWorkflow = Arc::new(RwLock::new(Workflow::new(events.clone())));

        info!(
            base_url = %service.config().base_url,
            timeout_secs = service.config().request_timeout.as_secs(),
            "Review client created"
        );

        Ok(Self {
            analysis: AnalysisOrchestrator::new(Arc::clone(&workflow), Arc::clone(&service)),
            update: UpdateOrchestrator::new(Arc::clone(&workflow), Arc::clone(&service)),
            workflow,
            service,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub fn service_config(&self) -> &ServiceConfig {
        self.service.config()
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot::of(&*self.workflow.read().await)
    }

    pub async fn state(&self) -> WorkflowState {
        self.workflow.read().await.state()
    }

    pub async fn result(&self) -> Option<AnalysisResult> {
        self.workflow.read().await.result().cloned()
    }

    // Upload

    pub async fn select_file(&self, file: SelectedFile) {
        self.workflow.write().await.select_file(file);
    }

    /// Read `path` and select it
    pub async fn select_path(&self, path: &Path) -> ClientResult<()> {
        let file = SelectedFile::from_path(path).await?;
        self.select_file(file).await;
        Ok(())
    }

    pub async fn clear_file(&self) {
        self.workflow.write().await.clear_file();
    }

    // Analysis

    pub async fn analyze(&self) -> ClientResult<Completion> {
        self.analysis.analyze().await
    }

    // Interest editing

    pub async fn start_editing(&self, person_name: &str) -> ClientResult<()> {
        self.workflow.write().await.start_editing(person_name)
    }

    pub async fn remove_interest(&self, index: usize) -> ClientResult<bool> {
        self.workflow.write().await.remove_interest(index)
    }

    pub async fn add_interest(&self, text: &str) -> ClientResult<bool> {
        self.workflow.write().await.add_interest(text)
    }

    pub async fn update_interest(&self, index: usize, text: &str) -> ClientResult<bool> {
        self.workflow.write().await.update_interest(index, text)
    }

    pub async fn set_pending_text(&self, text: &str) -> ClientResult<()> {
        self.workflow.write().await.set_pending_text(text)
    }

    pub async fn add_pending_interest(&self) -> ClientResult<bool> {
        self.workflow.write().await.add_pending_interest()
    }

    /// Whether adding `text` would change the open buffer
    pub async fn can_add(&self, text: &str) -> bool {
        let workflow = self.workflow.read().await;
        workflow.session_state() == SessionState::Editing
            && workflow.edit_buffer().is_some_and(|buffer| buffer.accepts(text))
    }

    pub async fn cancel_editing(&self) -> bool {
        self.workflow.write().await.cancel_editing()
    }

    pub async fn save(&self) -> ClientResult<Completion> {
        self.update.save().await
    }

    // Reset

    pub async fn clear(&self) {
        self.workflow.write().await.clear();
    }

    pub async fn dismiss_error(&self) {
        self.workflow.write().await.dismiss_error();
    }

    // View model

    pub async fn summary(&self) -> Option<SummaryView> {
        self.workflow.read().await.result().map(SummaryView::from_result)
    }

    pub async fn community_cards(&self) -> Vec<CommunityCard> {
        self.workflow
            .read()
            .await
            .result()
            .map(view::community_cards)
            .unwrap_or_default()
    }

    pub async fn people_directory(&self) -> Vec<PersonEntry> {
        self.workflow
            .read()
            .await
            .result()
            .map(view::people_directory)
            .unwrap_or_default()
    }

    // Service lookups (no workflow state change)

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.service.health().await
    }

    pub async fn person_interests(&self, person_name: &str) -> ClientResult<PersonInterests> {
        self.service.person_interests(person_name).await
    }
}

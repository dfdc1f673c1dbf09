//! # cmap Review Client
//!
//! Client-side workflow for reviewing community groupings returned by the
//! analysis service and editing one person's interests at a time.
//!
//! **Architecture:**
//! - Workflow reducer owns upload, result store and edit session state
//! - Orchestrators perform the two network round trips without holding the lock
//! - Generation tickets fence out stale responses
//! - EventBus broadcasts every transition to presentation subscribers

pub mod analysis;
pub mod client;
pub mod edit_session;
pub mod error;
pub mod service;
pub mod store;
pub mod update;
pub mod upload;
pub mod view;
pub mod workflow;

pub use client::{ReviewClient, Snapshot};
pub use edit_session::{EditSession, SessionState};
pub use error::{ClientError, ClientResult, ANALYZE_FAILURE_MESSAGE, UPDATE_FAILURE_MESSAGE};
pub use service::{HealthStatus, PersonInterests, ServiceClient, UpdateInterestsRequest};
pub use upload::SelectedFile;
pub use workflow::{Completion, Ticket, Workflow, WorkflowState};

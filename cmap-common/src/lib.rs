//! # cmap Common Library
//!
//! Shared code for the community review client:
//! - Data model returned by the community-detection service
//! - Edit buffer shape and its list operations
//! - Error types
//! - Service location and logging configuration
//! - Workflow events (WorkflowEvent enum) and EventBus

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;

pub use error::{Error, Result};
pub use model::{AnalysisResult, Community, EditBuffer, PeopleData, Person, SharedCategory};

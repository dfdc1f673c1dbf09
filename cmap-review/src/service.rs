//! Community analysis service client
//!
//! Typed HTTP boundary to the external service. Every 2xx payload that should
//! carry an [`AnalysisResult`] is decoded and validated here, so malformed
//! data never reaches the result store.

use crate::error::{ClientError, ClientResult, ANALYZE_FAILURE_MESSAGE, UPDATE_FAILURE_MESSAGE};
use crate::upload::SelectedFile;
use cmap_common::config::ServiceConfig;
use cmap_common::AnalysisResult;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("cmap-review/", env!("CARGO_PKG_VERSION"));

const ANALYZE_PATH: &str = "/api/analyze";
const UPDATE_INTERESTS_PATH: &str = "/api/update-person-interests";
const HEALTH_PATH: &str = "/api/health";
const PERSON_INTERESTS_PATH: &str = "/api/get-person-interests";

/// Body of `PUT /api/update-person-interests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInterestsRequest {
    pub person_name: String,
    pub interests: Vec<String>,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Body of `GET /api/get-person-interests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonInterests {
    pub person_name: String,
    pub interests: Vec<String>,
}

/// Error body the service sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Analysis service HTTP client
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http_client: reqwest::Client,
    config: ServiceConfig,
}

impl ServiceClient {
    pub fn new(config: ServiceConfig) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Service {
                status: None,
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Upload a file as multipart field `file` and return the grouping
    ///
    /// Every failure surfaces the same generic message; details are logged.
    pub async fn analyze(&self, file: &SelectedFile) -> ClientResult<AnalysisResult> {
        let url = self.config.endpoint(ANALYZE_PATH);

        let part = multipart::Part::bytes(file.data().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.content_type())
            .map_err(|e| {
                warn!(error = %e, "Invalid upload content type");
                analyze_failure(None)
            })?;
        let form = multipart::Form::new().part("file", part);

        debug!(url = %url, file = %file.name(), bytes = file.len(), "Uploading file for analysis");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Analyze request failed");
                analyze_failure(None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = service_error_message(&body);
            warn!(
                status = status.as_u16(),
                reason = reason.as_deref().unwrap_or(""),
                "Analysis service rejected upload"
            );
            return Err(analyze_failure(Some(status.as_u16())));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read analyze response body");
            analyze_failure(Some(status.as_u16()))
        })?;
        let result = decode_analysis(&body)?;

        info!(
            total_people = result.total_people,
            total_communities = result.total_communities,
            editable = result.is_editable(),
            "Analysis received"
        );
        Ok(result)
    }

    /// Replace one person's interests and return the regenerated grouping
    ///
    /// A non-2xx `error` string from the service is surfaced verbatim.
    pub async fn update_person_interests(
        &self,
        person_name: &str,
        interests: &[String],
    ) -> ClientResult<AnalysisResult> {
        let url = self.config.endpoint(UPDATE_INTERESTS_PATH);
        let body = UpdateInterestsRequest {
            person_name: person_name.to_string(),
            interests: interests.to_vec(),
        };

        debug!(url = %url, person = %person_name, interests = interests.len(), "Sending interest update");

        let response = self
            .http_client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Update request failed");
                update_failure(None, None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = service_error_message(&text);
            warn!(
                status = status.as_u16(),
                reason = reason.as_deref().unwrap_or(""),
                "Analysis service rejected interest update"
            );
            return Err(update_failure(Some(status.as_u16()), reason));
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read update response body");
            update_failure(Some(status.as_u16()), None)
        })?;
        let result = decode_analysis(&bytes)?;

        info!(
            person = %person_name,
            total_people = result.total_people,
            total_communities = result.total_communities,
            "Regenerated analysis received"
        );
        Ok(result)
    }

    /// Probe service reachability
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let url = self.config.endpoint(HEALTH_PATH);
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            debug!(url = %url, error = %e, "Health probe failed");
            ClientError::Service {
                status: None,
                message: format!("analysis service unreachable: {}", e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Service {
                status: Some(status.as_u16()),
                message: format!("health check failed with status {}", status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| ClientError::Service {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Read the service's authoritative interest list for one person
    pub async fn person_interests(&self, person_name: &str) -> ClientResult<PersonInterests> {
        if person_name.trim().is_empty() {
            return Err(ClientError::Validation("person name is required".to_string()));
        }

        let url = self.config.endpoint(PERSON_INTERESTS_PATH);
        let response = self
            .http_client
            .get(&url)
            .query(&[("person_name", person_name)])
            .send()
            .await
            .map_err(|e| ClientError::Service {
                status: None,
                message: format!("analysis service unreachable: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = service_error_message(&text).unwrap_or_else(|| {
                format!("person lookup failed with status {}", status.as_u16())
            });
            debug!(person = %person_name, status = status.as_u16(), "Person lookup rejected");
            return Err(ClientError::Service {
                status: Some(status.as_u16()),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| ClientError::Service {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Decode and validate an analysis payload
pub fn decode_analysis(body: &[u8]) -> ClientResult<AnalysisResult> {
    let result: AnalysisResult =
        serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    result.validate().map_err(|e| {
        warn!(error = %e, "Service payload failed validation");
        match e {
            cmap_common::Error::Schema(message) => ClientError::Decode(message),
            other => ClientError::Decode(other.to_string()),
        }
    })?;

    Ok(result)
}

/// Non-empty `error` string from a JSON error body
fn service_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|message| !message.is_empty())
}

fn analyze_failure(status: Option<u16>) -> ClientError {
    ClientError::Service {
        status,
        message: ANALYZE_FAILURE_MESSAGE.to_string(),
    }
}

fn update_failure(status: Option<u16>, reason: Option<String>) -> ClientError {
    ClientError::Service {
        status,
        message: reason.unwrap_or_else(|| UPDATE_FAILURE_MESSAGE.to_string()),
    }
}

//! Thin HTTP client for the EachLabs flow API.
//!
//! - `trigger_cloth_change` posts both image URLs to `/{flow_id}/trigger`.
//! - `get_execution` fetches `/{flow_id}/executions/{id}`.
//! - `get_executions` fetches the full execution list as JSON.
//! - `wait_for_execution` polls an execution at a fixed interval until it
//!   reaches a terminal state or the attempt budget runs out.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct EachlabsClient {
    client: Client,
    base_url: String,
    flow_id: String,
    api_key: String,
}

/// Response from the flow trigger endpoint. Depending on the API version the
/// execution id arrives as `trigger_id` or `execution_id`; both are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub trigger_id: Option<String>,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TriggerResponse {
    pub fn id(&self) -> Option<&str> {
        self.trigger_id.as_deref().or(self.execution_id.as_deref())
    }
}

/// Normalized execution status. The wire value is a free-form string; unknown
/// values land in `Processing` so they stay pollable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "queued" | "pending" | "starting" => ExecutionStatus::Pending,
            "succeeded" | "success" | "completed" => ExecutionStatus::Succeeded,
            "failed" | "error" => ExecutionStatus::Failed,
            _ => ExecutionStatus::Processing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded | ExecutionStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Processing => "processing",
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
        }
    }
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        ExecutionStatus::Pending
    }
}

impl<'de> Deserialize<'de> for ExecutionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ExecutionStatus::parse(&raw))
    }
}

/// One execution as reported by the status endpoint. The result URL may
/// arrive under `result_url` or `output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default, alias = "output")]
    pub result_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl EachlabsClient {
    pub fn new(base_url: String, flow_id: String, api_key: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        EachlabsClient { client: Client::new(), base_url: base, flow_id, api_key }
    }

    /// Trigger a cloth-change execution for the two hosted image URLs.
    ///
    /// Returns the trigger response, which carries the execution id to poll.
    pub async fn trigger_cloth_change(
        &self,
        person_image_url: &str,
        cloth_image_url: &str,
        clothing_type: Option<&str>,
    ) -> AppResult<TriggerResponse> {
        let url = format!("{}/{}/trigger", self.base_url, self.flow_id);
        let payload = json!({
            "parameters": {
                "Person": person_image_url,
                "Cloth": cloth_image_url,
                "clothing_type": clothing_type.unwrap_or(""),
            },
            "webhook_url": "",
        });

        tracing::info!("Triggering cloth change. Person: {}, Cloth: {}", person_image_url, cloth_image_url);
        tracing::debug!("Trigger payload: {:?}", payload);

        let response = self.client.post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            let trigger: TriggerResponse = response.json().await.map_err(AppError::HttpClient)?;
            tracing::info!(
                "Successfully triggered execution. Id: {}",
                trigger.id().unwrap_or("unknown")
            );
            Ok(trigger)
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            let error_message = format!("Failed to trigger flow. Status: {}, Body: {}", status, error_body);
            tracing::error!("{}", error_message);
            Err(AppError::Upstream(error_message))
        }
    }

    /// Fetch details of a specific execution.
    pub async fn get_execution(&self, execution_id: &str) -> AppResult<Execution> {
        let url = format!("{}/{}/executions/{}", self.base_url, self.flow_id, execution_id);
        let response = self.client.get(&url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(AppError::Upstream(format!(
                "Failed to get execution {}: {:?}",
                execution_id,
                response.status()
            )))
        }
    }

    /// Retrieve all executions for the flow as raw JSON.
    pub async fn get_executions(&self) -> AppResult<Value> {
        let url = format!("{}/{}/executions", self.base_url, self.flow_id);
        let response = self.client.get(&url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(AppError::Upstream(format!("Failed to list executions: {:?}", response.status())))
        }
    }

    /// Poll an execution until it reaches a terminal state.
    ///
    /// Performs at most `max_attempts` status fetches, sleeping `interval`
    /// between them. Stops immediately on a terminal state: succeeded returns
    /// the execution, failed surfaces the upstream reason. Exhausting the
    /// budget is a timeout.
    pub async fn wait_for_execution(
        &self,
        execution_id: &str,
        interval: Duration,
        max_attempts: u32,
    ) -> AppResult<Execution> {
        tracing::info!("Waiting for execution {}", execution_id);

        for attempt in 1..=max_attempts {
            let execution = self.get_execution(execution_id).await?;
            tracing::info!(
                "Execution {} status: {} (attempt {}/{})",
                execution_id,
                execution.status.as_str(),
                attempt,
                max_attempts
            );

            match execution.status {
                ExecutionStatus::Succeeded => return Ok(execution),
                ExecutionStatus::Failed => {
                    let reason = execution.error
                        .unwrap_or_else(|| "Unknown error".to_string());
                    tracing::error!("Execution {} failed: {}", execution_id, reason);
                    return Err(AppError::Generation(reason));
                }
                _ => {}
            }

            // No sleep after the final attempt; the budget bounds wall-clock time.
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }

        tracing::error!("Timeout waiting for execution {} after {} attempts", execution_id, max_attempts);
        Err(AppError::Timeout(max_attempts))
    }
}

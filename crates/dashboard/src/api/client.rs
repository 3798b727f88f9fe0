use farmvibes_common::{Paginated, RunSubmission, SystemMetrics, Workflow, WorkflowRun};
use reqwest::{header, Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

use super::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Filters for `GET /runs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery {
    pub ids: Vec<String>,
    pub fields: Vec<String>,
    pub skip: u64,
    pub take: u64,
}

impl Default for RunQuery {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            fields: Vec::new(),
            skip: 0,
            take: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RunQuery {
    pub fn for_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("skip", self.skip.to_string()), ("take", self.take.to_string())];
        if !self.ids.is_empty() {
            params.push(("ids", self.ids.join(",")));
        }
        if !self.fields.is_empty() {
            params.push(("fields", self.fields.join(",")));
        }
        params
    }
}

/// Client for the FarmVibes.AI REST API. Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct VibeClient {
    http: Client,
    base_url: String,
}

impl VibeClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Workflow names contain slashes which are part of the route.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(operation, error = %e, "Request to FarmVibes.AI failed.");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, %status, "Request succeeded.");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        error!(operation, %status, error = %err, "FarmVibes.AI returned an error status.");
        Err(err)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, ApiError> {
        let body = self.fetch_text(request, operation).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(operation, error = %e, "Failed to decode FarmVibes.AI response.");
            ApiError::Decode(format!("{operation}: {e}"))
        })
    }

    async fn fetch_text(&self, request: RequestBuilder, operation: &str) -> Result<String, ApiError> {
        let response = self.send(request, operation).await?;
        response.text().await.map_err(|e| {
            error!(operation, error = %e, "Failed to read FarmVibes.AI response body.");
            ApiError::Transport(e)
        })
    }

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, ApiError> {
        let request = self.http.get(self.url("/workflows"));
        self.fetch_json(request, "list_workflows").await
    }

    pub async fn describe_workflow(&self, name: &str) -> Result<Workflow, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/workflows/{name}")))
            .query(&[("return_format", "description")]);
        self.fetch_json(request, "describe_workflow").await
    }

    pub async fn workflow_yaml(&self, name: &str) -> Result<String, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/workflows/{name}")))
            .query(&[("return_format", "yaml")]);
        self.fetch_text(request, "workflow_yaml").await
    }

    pub async fn submit_run(&self, submission: &RunSubmission) -> Result<WorkflowRun, ApiError> {
        let request = self.http.post(self.url("/runs")).json(submission);
        self.fetch_json(request, "submit_run").await
    }

    pub async fn get_run(&self, id: &str) -> Result<WorkflowRun, ApiError> {
        let request = self.http.get(self.url(&format!("/runs/{id}")));
        self.fetch_json(request, "get_run").await
    }

    pub async fn list_runs(&self, query: &RunQuery) -> Result<Paginated<WorkflowRun>, ApiError> {
        let request = self.http.get(self.url("/runs")).query(&query.to_params());
        self.fetch_json(request, "list_runs").await
    }

    pub async fn cancel_run(&self, id: &str) -> Result<(), ApiError> {
        let request = self.http.post(self.url(&format!("/runs/{id}/cancel")));
        self.send(request, "cancel_run").await.map(|_| ())
    }

    pub async fn delete_run(&self, id: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&format!("/runs/{id}")));
        self.send(request, "delete_run").await.map(|_| ())
    }

    pub async fn resubmit_run(&self, id: &str) -> Result<WorkflowRun, ApiError> {
        let request = self.http.post(self.url(&format!("/runs/{id}/resubmit")));
        self.fetch_json(request, "resubmit_run").await
    }

    pub async fn system_metrics(&self) -> Result<SystemMetrics, ApiError> {
        let request = self.http.get(self.url("/system-metrics"));
        self.fetch_json(request, "system_metrics").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_validated() {
        assert!(matches!(
            VibeClient::new("localhost:31108"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            VibeClient::new(""),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        let client = VibeClient::new("http://localhost:31108/v0/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:31108/v0");
    }

    #[test]
    fn test_run_query_params() {
        let params = RunQuery::default().to_params();
        assert_eq!(
            params,
            vec![("skip", "0".to_string()), ("take", "50".to_string())]
        );

        let query = RunQuery {
            fields: vec!["id".into(), "status".into()],
            ..RunQuery::for_ids(["a", "b"])
        };
        let params = query.to_params();
        assert!(params.contains(&("ids", "a,b".to_string())));
        assert!(params.contains(&("fields", "id,status".to_string())));
    }
}

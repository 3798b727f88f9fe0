//! Fetchers for the resources the dashboard keeps fresh.

use async_trait::async_trait;
use farmvibes_common::{Paginated, SystemMetrics, Workflow, WorkflowRun};
use std::time::Duration;

use super::{Fetcher, PollHandle, Poller};
use crate::api::{ApiError, RunQuery, VibeClient};

pub const RUNS_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const METRICS_POLL_INTERVAL: Duration = Duration::from_millis(10000);

pub struct RunListSource {
    client: VibeClient,
    query: RunQuery,
}

impl RunListSource {
    pub fn new(client: VibeClient, query: RunQuery) -> Self {
        Self { client, query }
    }

    pub fn poll(self) -> PollHandle<Self> {
        Poller::start(self, Some(RUNS_POLL_INTERVAL))
    }
}

#[async_trait]
impl Fetcher for RunListSource {
    type Output = Paginated<WorkflowRun>;
    type Error = ApiError;

    async fn fetch(&self) -> Result<Self::Output, ApiError> {
        self.client.list_runs(&self.query).await
    }

    fn name(&self) -> &'static str {
        "runs"
    }
}

pub struct RunSource {
    client: VibeClient,
    id: String,
}

impl RunSource {
    pub fn new(client: VibeClient, id: impl Into<String>) -> Self {
        Self {
            client,
            id: id.into(),
        }
    }

    pub fn poll(self) -> PollHandle<Self> {
        Poller::start(self, Some(RUNS_POLL_INTERVAL))
    }
}

#[async_trait]
impl Fetcher for RunSource {
    type Output = WorkflowRun;
    type Error = ApiError;

    async fn fetch(&self) -> Result<WorkflowRun, ApiError> {
        self.client.get_run(&self.id).await
    }

    fn name(&self) -> &'static str {
        "run"
    }
}

pub struct MetricsSource {
    client: VibeClient,
}

impl MetricsSource {
    pub fn new(client: VibeClient) -> Self {
        Self { client }
    }

    pub fn poll(self) -> PollHandle<Self> {
        Poller::start(self, Some(METRICS_POLL_INTERVAL))
    }
}

#[async_trait]
impl Fetcher for MetricsSource {
    type Output = SystemMetrics;
    type Error = ApiError;

    async fn fetch(&self) -> Result<SystemMetrics, ApiError> {
        self.client.system_metrics().await
    }

    fn name(&self) -> &'static str {
        "metrics"
    }
}

/// The workflow catalog. Fetched once.
pub struct WorkflowListSource {
    client: VibeClient,
}

impl WorkflowListSource {
    pub fn new(client: VibeClient) -> Self {
        Self { client }
    }

    pub fn load(self) -> PollHandle<Self> {
        Poller::start(self, None)
    }
}

#[async_trait]
impl Fetcher for WorkflowListSource {
    type Output = Vec<Workflow>;
    type Error = ApiError;

    async fn fetch(&self) -> Result<Vec<Workflow>, ApiError> {
        self.client.list_workflows().await
    }

    fn name(&self) -> &'static str {
        "workflows"
    }
}

pub struct WorkflowSource {
    client: VibeClient,
    name: String,
}

impl WorkflowSource {
    pub fn new(client: VibeClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn load(self) -> PollHandle<Self> {
        Poller::start(self, None)
    }
}

#[async_trait]
impl Fetcher for WorkflowSource {
    type Output = Workflow;
    type Error = ApiError;

    async fn fetch(&self) -> Result<Workflow, ApiError> {
        self.client.describe_workflow(&self.name).await
    }

    fn name(&self) -> &'static str {
        "workflow"
    }
}

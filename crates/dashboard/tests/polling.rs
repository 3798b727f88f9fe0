use farmvibes_dashboard::api::{RunQuery, VibeClient};
use farmvibes_dashboard::polling::{MetricsSource, Poller, RunListSource, WorkflowListSource};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> VibeClient {
    VibeClient::new(&format!("{}/v0", server.uri())).unwrap()
}

#[tokio::test]
async fn test_metrics_source_publishes_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/system-metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_percent": 10.0,
            "memory_percent": 20.0,
            "disk_percent": 30.0
        })))
        .mount(&server)
        .await;

    let handle = MetricsSource::new(client_for(&server).await).poll();
    assert_eq!(handle.interval(), Some(Duration::from_millis(10000)));
    let mut rx = handle.subscribe();
    let state = timeout(Duration::from_secs(10), rx.wait_for(|s| s.data.is_some()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(state.data.unwrap().memory_percent, 20.0);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_failed_fetch_is_stored_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/runs"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "cluster offline"})))
        .mount(&server)
        .await;

    let handle = RunListSource::new(client_for(&server).await, RunQuery::default()).poll();
    let mut rx = handle.subscribe();
    let state = timeout(Duration::from_secs(10), rx.wait_for(|s| s.error.is_some()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert!(state.data.is_none());
    assert!(state.error.unwrap().message.contains("cluster offline"));
}

#[tokio::test]
async fn test_workflow_catalog_is_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "helloworld"}])))
        .expect(1)
        .mount(&server)
        .await;

    let handle = WorkflowListSource::new(client_for(&server).await).load();
    assert_eq!(handle.interval(), None);
    let mut rx = handle.subscribe();
    timeout(Duration::from_secs(10), rx.wait_for(|s| s.data.is_some()))
        .await
        .unwrap()
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.shutdown().await;
}

#[tokio::test]
async fn test_generic_poller_over_a_client_call() {
    // Any fetcher works, not only the bundled sources.
    struct Workflows(VibeClient);

    #[async_trait::async_trait]
    impl farmvibes_dashboard::polling::Fetcher for Workflows {
        type Output = usize;
        type Error = farmvibes_dashboard::api::ApiError;

        async fn fetch(&self) -> Result<usize, Self::Error> {
            Ok(self.0.list_workflows().await?.len())
        }
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "a"}, {"name": "b"}])))
        .mount(&server)
        .await;

    let handle = Poller::start(Workflows(client_for(&server).await), None);
    let mut rx = handle.subscribe();
    let state = timeout(Duration::from_secs(10), rx.wait_for(|s| s.data.is_some()))
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(state.data, Some(2));
}

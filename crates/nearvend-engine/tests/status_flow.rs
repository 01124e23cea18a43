//! Online-status cache against HTTP mocks: coalescing and error sharing.

use std::sync::Arc;
use std::time::Duration;

use nearvend_client::{ApiError, DiscoveryClient};
use nearvend_core::AppConfig;
use nearvend_engine::online_status_cache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> Arc<DiscoveryClient> {
    let config = AppConfig {
        api_base_url: base_url.to_string(),
        log_level: "info".to_string(),
        default_region_city: "Toronto".to_string(),
        request_timeout_secs: 30,
        user_agent: "nearvend-test".to_string(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        location_ttl_hours: 24,
        status_min_fetch_interval_secs: 30,
        status_poll_interval_secs: 300,
        bounds_debounce_ms: 800,
        state_path: std::path::PathBuf::from("/tmp/nearvend-test/state.json"),
    };
    Arc::new(DiscoveryClient::new(&config).expect("client construction"))
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn concurrent_components_share_one_batch_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vendors/online-status/batch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(50))
                .set_body_json(serde_json::json!({
                    "success": true,
                    "statuses": {
                        "1": { "isOnline": true },
                        "2": { "isOnline": false }
                    }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cache = online_status_cache(test_client(&server.uri()), Duration::from_secs(30));

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.fetch_batch(&ids(&["1", "2"])).await })
        })
        .collect();
    for task in tasks {
        let statuses = task.await.expect("task").expect("fetch");
        assert!(statuses["1"].is_online);
        assert!(!statuses["2"].is_online);
    }
}

#[tokio::test]
async fn within_the_interval_no_second_request_goes_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vendors/online-status/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "statuses": { "1": { "isOnline": true } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = online_status_cache(test_client(&server.uri()), Duration::from_secs(30));
    cache.fetch_batch(&ids(&["1"])).await.expect("first fetch");
    let second = cache.fetch_batch(&ids(&["1"])).await.expect("cached");
    assert!(second["1"].is_online);
}

#[tokio::test]
async fn a_failed_batch_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vendors/online-status/batch"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vendors/online-status/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "statuses": { "1": { "isOnline": true } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = online_status_cache(test_client(&server.uri()), Duration::from_secs(30));

    let err = cache.fetch_batch(&ids(&["1"])).await.expect_err("first fails");
    assert!(matches!(*err, ApiError::Http(_)));

    let recovered = cache.fetch_batch(&ids(&["1"])).await.expect("retry succeeds");
    assert!(recovered["1"].is_online);
}

//! End-to-end discovery flows: session orchestration against HTTP mocks.

use std::sync::Arc;

use nearvend_client::{ApiError, DiscoveryClient};
use nearvend_core::{AppConfig, GeoPoint, LocationState};
use nearvend_engine::{
    BoundsQuery, DiscoverySession, MapCommand, MapSurface, MapSyncBridge, Outcome, SearchMode,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
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
    }
}

fn session_with_bridge(base_url: &str) -> (DiscoverySession, Arc<MapSyncBridge>) {
    let config = test_config(base_url);
    let client = Arc::new(DiscoveryClient::new(&config).expect("client construction"));
    let bridge = Arc::new(MapSyncBridge::new());
    (
        DiscoverySession::new(client, Arc::clone(&bridge), &config),
        bridge,
    )
}

fn session(base_url: &str) -> DiscoverySession {
    session_with_bridge(base_url).0
}

fn toronto() -> LocationState {
    LocationState::detected(43.65, -79.38, "Toronto", None)
}

fn vendor(id: i64, city: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "displayName": format!("Vendor {id}"), "city": city })
}

fn listing(vendors: Vec<serde_json::Value>) -> serde_json::Value {
    let total = vendors.len();
    serde_json::json!({ "vendors": vendors, "totalCount": total })
}

#[tokio::test]
async fn initial_search_without_location_queries_the_default_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("city", "Toronto"))
        .and(query_param("pageNumber", "1"))
        .and(query_param("pageSize", "24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            vendor(1, "Toronto"),
            vendor(2, "Toronto"),
            vendor(1, "Toronto"),
            vendor(3, "Ottawa"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    let outcome = session.initial_search().await.expect("search succeeds");

    assert_eq!(outcome, Outcome::Applied { vendors_added: 3 });
    assert_eq!(session.mode(), SearchMode::NearMe);
    assert_eq!(session.sections().len(), 2);
    assert_eq!(session.sections()[0].city, "Toronto");
    assert_eq!(session.sections()[0].total_count, 2, "duplicate id deduped");
    assert_eq!(session.display_city(), "Toronto");
}

#[tokio::test]
async fn initial_search_with_location_requests_the_innermost_ring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("city", "Toronto"))
        .and(query_param("latitude", "43.65"))
        .and(query_param("longitude", "-79.38"))
        .and(query_param("radiusMiles", "50"))
        .and(query_param("sortBy", "distance"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![vendor(1, "Toronto")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    let outcome = session.initial_search().await.expect("search succeeds");

    assert_eq!(outcome, Outcome::Applied { vendors_added: 1 });
    assert_eq!(session.radius_level(), 0);
}

#[tokio::test]
async fn expand_radius_excludes_the_already_covered_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("radiusMiles", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            vendor(1, "Toronto"),
            vendor(2, "Toronto"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("radiusMiles", "100"))
        .and(query_param("minRadiusMiles", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            vendor(3, "Toronto"),
            vendor(4, "Barrie"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");
    let outcome = session.expand_radius().await.expect("expansion succeeds");

    assert_eq!(outcome, Outcome::Applied { vendors_added: 2 });
    assert_eq!(session.radius_level(), 1);

    let by_city = |city: &str| {
        session
            .sections()
            .iter()
            .find(|s| s.city == city)
            .unwrap_or_else(|| panic!("missing section for {city}"))
    };
    assert_eq!(by_city("Toronto").total_count, 3, "ring extends in place");
    assert_eq!(by_city("Toronto").radius_level_introduced, 0);
    assert_eq!(by_city("Barrie").radius_level_introduced, 1);
}

#[tokio::test]
async fn failed_expansion_leaves_the_level_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("radiusMiles", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![vendor(1, "Toronto")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("radiusMiles", "100"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");

    let result = session.expand_radius().await;
    assert!(matches!(result, Err(ApiError::Http(_))));
    assert_eq!(session.radius_level(), 0, "failure must not consume a level");
    assert_eq!(session.sections().len(), 1, "previous results kept");
}

#[tokio::test]
async fn the_ladder_top_reports_max_radius_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");
    for _ in 0..4 {
        let outcome = session.expand_radius().await.expect("expansion succeeds");
        assert_eq!(outcome, Outcome::Applied { vendors_added: 0 });
    }

    assert_eq!(session.radius_level(), 4);
    let outcome = session.expand_radius().await.expect("no request issued");
    assert_eq!(outcome, Outcome::MaxRadiusReached);
    assert_eq!(session.radius_level(), 4);
}

#[tokio::test]
async fn bounds_search_replaces_ring_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("latitude", "43.65"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            vendor(1, "Toronto"),
            vendor(2, "Toronto"),
        ])))
        .mount(&server)
        .await;
    // City-tier viewport: pageSize 24 and the 100 mile floor.
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("latitude", "43.59"))
        .and(query_param("radiusMiles", "100"))
        .and(query_param("pageSize", "24"))
        .and(query_param("sortBy", "distance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            vendor(10, "Mississauga"),
            vendor(10, "Mississauga"),
            vendor(11, "Mississauga"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");

    let bounds = BoundsQuery {
        center: GeoPoint::new(43.59, -79.64),
        north: 43.63,
        south: 43.55,
        east: -79.58,
        west: -79.7,
        zoom: 12,
    };
    let outcome = session.bounds_search(&bounds).await.expect("bounds succeeds");

    assert_eq!(outcome, Outcome::Applied { vendors_added: 2 });
    assert_eq!(session.mode(), SearchMode::Bounds);
    assert_eq!(session.bounds_results().len(), 2, "replaced and deduped");
    assert!(session.sections().is_empty(), "ring state cleared");
    assert_eq!(session.radius_level(), 0);
    assert_eq!(session.display_city(), "Mississauga");
}

#[tokio::test]
async fn load_more_from_bounds_reseeds_the_innermost_ring() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("radiusMiles", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![vendor(1, "Toronto")])),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .and(query_param("latitude", "43.59"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![vendor(10, "Mississauga")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");
    let bounds = BoundsQuery {
        center: GeoPoint::new(43.59, -79.64),
        north: 43.63,
        south: 43.55,
        east: -79.58,
        west: -79.7,
        zoom: 12,
    };
    session.bounds_search(&bounds).await.expect("bounds succeeds");
    assert_eq!(session.mode(), SearchMode::Bounds);

    let outcome = session.expand_radius().await.expect("reseed succeeds");
    assert_eq!(outcome, Outcome::Applied { vendors_added: 1 });
    assert_eq!(session.mode(), SearchMode::NearMe);
    assert_eq!(session.radius_level(), 0);
    assert!(session.bounds_results().is_empty());
    assert_eq!(session.sections().len(), 1);
}

#[tokio::test]
async fn category_filters_route_to_the_category_endpoint() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "sections": [
            {
                "category": "coffee",
                "vendors": [ vendor(1, "Toronto"), vendor(2, "Toronto") ],
                "totalCount": 5
            },
            {
                "category": "snacks",
                "vendors": [ vendor(2, "Toronto"), vendor(3, "Toronto") ],
                "totalCount": 4
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/vendors/search-by-categories"))
        .and(query_param("category", "coffee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server.uri());
    session.set_categories(vec!["coffee".to_string(), "snacks".to_string()]);
    let outcome = session.initial_search().await.expect("search succeeds");

    assert_eq!(
        outcome,
        Outcome::Applied { vendors_added: 3 },
        "vendor shared by two sections counts once"
    );
    assert_eq!(session.total_count(), 9, "sum of section totals");
    assert_eq!(session.sections().len(), 1);
    assert_eq!(session.sections()[0].total_count, 3);
}

struct RecordingSurface {
    commands: std::sync::Mutex<Vec<MapCommand>>,
}

impl MapSurface for RecordingSurface {
    fn apply(&self, command: &MapCommand) {
        self.commands
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(command.clone());
    }
}

#[tokio::test]
async fn map_surfaces_follow_the_search_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let (mut session, bridge) = session_with_bridge(&server.uri());
    let surface = Arc::new(RecordingSurface {
        commands: std::sync::Mutex::new(Vec::new()),
    });
    bridge.register(Arc::clone(&surface) as Arc<dyn MapSurface>);

    session.set_location(Some(toronto()));
    session.initial_search().await.expect("initial succeeds");
    session.expand_radius().await.expect("expansion succeeds");

    let commands = surface.commands.lock().unwrap().clone();
    assert!(commands.contains(&MapCommand::RefreshMarkers));
    assert!(
        commands.iter().any(|command| matches!(
            command,
            MapCommand::Recenter { radius_miles, .. } if (*radius_miles - 100.0).abs() < f64::EPSILON
        )),
        "expansion recenters to the new ring: {commands:?}"
    );
}

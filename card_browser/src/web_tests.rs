//! Router tests. Requests go through the full axum stack with `oneshot`,
//! the Pokemon TCG API is a wiremock server.

use super::*;
use crate::images::ImageAllowList;
use crate::pokemon_api::PokemonTcgClient;
use crate::test_support::{cards_page_json, sets_page_json};
use axum::http::Request;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOUR: Duration = Duration::from_secs(3600);

fn test_state(mock_uri: &str) -> AppState {
    let client = PokemonTcgClient::new(mock_uri, None).unwrap();
    AppState {
        api: Arc::new(PokemonApi::new(client.clone(), HOUR)),
        pages: Arc::new(PageCache::new(HOUR)),
        images: Arc::new(ImageProxy::new(
            client,
            ImageAllowList::new(["127.0.0.1"]),
            HOUR,
        )),
        page_size: 50,
    }
}

fn test_router(state: AppState) -> Router {
    create_router(state, Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")))
}

async fn send(router: Router, method: &str, uri: &str) -> Response {
    router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mock_cards(mock_server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/cards"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cards_page_json(1, 50)))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

// ── admin routes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_clear_cache_returns_success() {
    let state = test_state("http://127.0.0.1:9");
    let response = send(test_router(state), "POST", "/api/cache/clear").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Cache cleared successfully");
}

#[tokio::test]
async fn test_clear_cache_requires_post() {
    let state = test_state("http://127.0.0.1:9");
    let response = send(test_router(state), "GET", "/api/cache/clear").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_stats_on_fresh_server() {
    let state = test_state("http://127.0.0.1:9");
    let response = send(test_router(state), "GET", "/api/cache/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["api"]["totalEntries"], 0);
    assert_eq!(json["api"]["cards"]["ttlSeconds"], 3600);
    assert_eq!(json["pages"]["entries"], 0);
    assert_eq!(json["images"]["entries"], 0);
}

#[tokio::test]
async fn test_clear_then_stats_shows_zero_entries() {
    let mock_server = MockServer::start().await;
    mock_cards(&mock_server, 1).await;

    let state = test_state(&mock_server.uri());
    let router = test_router(state);

    let response = send(router.clone(), "GET", "/api/cards?page=1&pageSize=50").await;
    assert_eq!(response.status(), StatusCode::OK);

    let stats = body_json(send(router.clone(), "GET", "/api/cache/stats").await).await;
    assert_eq!(stats["api"]["totalEntries"], 1);

    send(router.clone(), "POST", "/api/cache/clear").await;
    send(router.clone(), "POST", "/api/cache/clear").await;

    let stats = body_json(send(router, "GET", "/api/cache/stats").await).await;
    assert_eq!(stats["api"]["totalEntries"], 0);
    assert!(stats["api"]["cards"]["lastCleared"].is_string());
}

// ── JSON data routes ─────────────────────────────────────────────────

#[tokio::test]
async fn test_api_cards_served_from_cache() {
    let mock_server = MockServer::start().await;
    mock_cards(&mock_server, 1).await;

    let router = test_router(test_state(&mock_server.uri()));

    let first = body_json(send(router.clone(), "GET", "/api/cards?page=1&pageSize=50").await).await;
    let second = body_json(send(router, "GET", "/api/cards").await).await;

    assert_eq!(first, second);
    assert_eq!(first["data"][0]["name"], "Pikachu");
    assert_eq!(first["totalCount"], 102);
}

#[tokio::test]
async fn test_api_sets_passes_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sets"))
        .and(query_param("q", "series:base"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sets_page_json(1, 50)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let router = test_router(test_state(&mock_server.uri()));
    let response = send(router, "GET", "/api/sets?q=series%3Abase").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][1]["name"], "Jungle");
}

#[tokio::test]
async fn test_upstream_failure_is_generic_500() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let router = test_router(test_state(&mock_server.uri()));
    let response = send(router, "GET", "/api/cards").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to fetch card data");
}

#[tokio::test]
async fn test_network_failure_does_not_leak_upstream_url() {
    // Nothing listens on the discard port
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/api/cards").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(!body.contains("127.0.0.1"));
    assert!(body.contains("Failed to fetch card data"));
}

#[tokio::test]
async fn test_bad_page_number_is_json_400() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/cards?page=abc").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_negative_page_size_is_json_400() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/api/cards?pageSize=-1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_missing_image_url_is_json_400() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/api/image").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

// ── rendered pages ───────────────────────────────────────────────────

#[tokio::test]
async fn test_index_page() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Pokemon Card Browser"));
}

#[tokio::test]
async fn test_cards_page_renders_initial_page() {
    let mock_server = MockServer::start().await;
    mock_cards(&mock_server, 1).await;

    let router = test_router(test_state(&mock_server.uri()));
    let response = send(router.clone(), "GET", "/cards").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, s-maxage=3600, stale-while-revalidate"
    );
    let html = body_text(response).await;
    assert!(html.contains("<h2>Pikachu</h2>"));

    // Second request is served from the page cache
    let response = send(router, "GET", "/cards?page=1").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sets_page_renders_newest_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sets"))
        .and(query_param("orderBy", "-releaseDate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sets_page_json(1, 50)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let router = test_router(test_state(&mock_server.uri()));
    let response = send(router, "GET", "/sets").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h2>Base</h2>"));
}

#[tokio::test]
async fn test_cleared_pages_regenerate() {
    let mock_server = MockServer::start().await;
    mock_cards(&mock_server, 2).await;

    let router = test_router(test_state(&mock_server.uri()));

    send(router.clone(), "GET", "/cards").await;
    send(router.clone(), "POST", "/api/cache/clear").await;
    let response = send(router, "GET", "/cards").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cards_page_upstream_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cards"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let router = test_router(test_state(&mock_server.uri()));
    let response = send(router, "GET", "/cards").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());
}

// ── image proxy and static assets ────────────────────────────────────

#[tokio::test]
async fn test_image_proxy_serves_allowed_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/base1/4.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]),
        )
        .mount(&mock_server)
        .await;

    let router = test_router(test_state(&mock_server.uri()));
    let image_url = format!("{}/base1/4.png", mock_server.uri());
    let uri = format!("/api/image?url={}", urlencoding::encode(&image_url));
    let response = send(router, "GET", &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), &[0x89, 0x50, 0x4E, 0x47]);
}

#[tokio::test]
async fn test_image_proxy_rejects_other_hosts() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let uri = format!(
        "/api/image?url={}",
        urlencoding::encode("https://evil.example.com/x.png")
    );
    let response = send(router, "GET", &uri).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("evil.example.com"));
}

#[tokio::test]
async fn test_static_stylesheet_served() {
    let router = test_router(test_state("http://127.0.0.1:9"));
    let response = send(router, "GET", "/static/styles.css").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_route_error_status_mapping() {
    let err: RouteError = TcgError::ImageHostNotAllowed("x".into()).into();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let err: RouteError = TcgError::InvalidUrl("x".into()).into();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    let err: RouteError = TcgError::HttpStatus(reqwest::StatusCode::NOT_FOUND).into();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_panic_response_is_500_json() {
    let response = panic_response(Box::new("boom"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_internal_errors_use_generic_message() {
    let err: RouteError = TcgError::Api {
        status: 500,
        message: "upstream detail".to_string(),
    }
    .into();
    assert_eq!(err.message, FETCH_FAILED_MESSAGE);
}

//! Web server for the card browser
//!
//! Serves the rendered card/set pages, JSON passthrough endpoints backed by
//! the response cache, the image proxy, and the cache administration routes.

use axum::{
    body::Body,
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tcg_common::{ApiPage, Card, CardSet, ListQuery, TcgError};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;

use crate::cache::CacheStats;
use crate::cached_api::{ApiCacheStats, PokemonApi};
use crate::images::ImageProxy;
use crate::pages::{render_cards_page, render_index, render_sets_page, PageCache};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<PokemonApi>,
    pub pages: Arc<PageCache>,
    pub images: Arc<ImageProxy>,
    /// Page size used by the rendered pages
    pub page_size: u32,
}

/// Body of every 500 answer; the detail only goes to the log
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch card data";

/// Error surfaced at the route boundary as `{"error": "..."}`
#[derive(Debug)]
pub struct RouteError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl RouteError {
    /// Log `detail` and answer with the generic 500 message
    fn internal(detail: impl std::fmt::Display) -> Self {
        log::error!("Request failed: {}", detail);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: FETCH_FAILED_MESSAGE.to_string(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<TcgError> for RouteError {
    fn from(err: TcgError) -> Self {
        if !err.is_rejected_input() {
            return Self::internal(err);
        }

        let status = match err {
            TcgError::ImageHostNotAllowed(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            log::warn!("Request rejected: {}", self.message);
        }
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Query string extractor whose rejection is the usual `{"error": ...}` body
struct ApiQuery<T>(T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RouteError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(RouteError::bad_request(rejection.body_text())),
        }
    }
}

/// `?page=N` on the rendered pages
#[derive(Deserialize)]
struct PageParams {
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(Deserialize)]
struct ImageParams {
    url: String,
}

/// Response of POST /api/cache/clear
#[derive(Serialize)]
struct ClearResponse {
    success: bool,
    message: String,
}

/// Response of GET /api/cache/stats
#[derive(Serialize)]
struct CacheStatsResponse {
    api: ApiCacheStats,
    pages: CacheStats,
    images: CacheStats,
}

/// Attach the regeneration headers for a rendered page
fn page_response(html: String, revalidate_secs: u64) -> Response {
    let mut response = Html(html).into_response();
    let cache_control = format!("public, s-maxage={revalidate_secs}, stale-while-revalidate");
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    response
}

/// GET / - Landing page
async fn index_handler() -> Html<String> {
    Html(render_index())
}

/// GET /cards?page={page}
async fn cards_page_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Response, RouteError> {
    let query = ListQuery::new(params.page, state.page_size).normalized();
    let key = format!("cards:{}", query.page);

    let api = Arc::clone(&state.api);
    let html = state
        .pages
        .get_or_render(&key, || async move {
            let page = api.get_cards(&query).await?;
            Ok(render_cards_page(&page))
        })
        .await?;

    Ok(page_response(html, state.pages.revalidate().as_secs()))
}

/// GET /sets?page={page}
async fn sets_page_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Response, RouteError> {
    let query = ListQuery::new(params.page, state.page_size)
        .with_order_by("-releaseDate")
        .normalized();
    let key = format!("sets:{}", query.page);

    let api = Arc::clone(&state.api);
    let html = state
        .pages
        .get_or_render(&key, || async move {
            let page = api.get_sets(&query).await?;
            Ok(render_sets_page(&page))
        })
        .await?;

    Ok(page_response(html, state.pages.revalidate().as_secs()))
}

/// GET /api/cards?page={page}&pageSize={size}&q={query}&orderBy={fields}
async fn api_cards_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Arc<ApiPage<Card>>>, RouteError> {
    Ok(Json(state.api.get_cards(&query).await?))
}

/// GET /api/sets?page={page}&pageSize={size}&q={query}&orderBy={fields}
async fn api_sets_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Arc<ApiPage<CardSet>>>, RouteError> {
    Ok(Json(state.api.get_sets(&query).await?))
}

/// GET /api/image?url={url}
/// Proxies an image from an allow-listed host
async fn image_handler(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ImageParams>,
) -> Result<Response, RouteError> {
    let image = state.images.get(&params.url).await?;

    let mut response = Body::from(image.bytes.clone()).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&image.content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    Ok(response)
}

/// POST /api/cache/clear
async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.api.clear_cache();
    state.pages.clear();
    state.images.clear();
    log::info!("All caches cleared via admin endpoint");

    Json(ClearResponse {
        success: true,
        message: "Cache cleared successfully".to_string(),
    })
}

/// GET /api/cache/stats
async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        api: state.api.cache_stats(),
        pages: state.pages.stats(),
        images: state.images.stats(),
    })
}

/// Turn a handler panic into the same `500 {"error": ...}` shape as other failures
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    RouteError::internal(format!("handler panicked: {detail}")).into_response()
}

/// Build the web server router
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/cards", get(cards_page_handler))
        .route("/sets", get(sets_page_handler))
        .route("/api/cards", get(api_cards_handler))
        .route("/api/sets", get(api_sets_handler))
        .route("/api/image", get(image_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .route("/api/cache/stats", get(cache_stats_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Resolves when Ctrl-C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// Start the web server (async)
pub async fn serve(
    state: AppState,
    addr: &str,
    static_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state, static_dir);

    log::info!("Card browser listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;

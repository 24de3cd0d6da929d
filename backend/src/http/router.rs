//! Router configuration for the HTTP API.
//!
//! Sets up the routes and middleware (CORS, compression, tracing).

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS: the renderer is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/night-sky", post(handlers::compute_night_sky))
        .route("/night-sky/is-night", post(handlers::is_night))
        .route("/night-sky/planetary", post(handlers::compute_planetary_sky))
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache", delete(handlers::clear_cache))
        .route("/cache/planets/{planet_id}", delete(handlers::invalidate_planet));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use crate::services::{NightSkyCache, TimeContext, TimeScales};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(time: TimeContext) -> Router {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::new(repo, Arc::new(time), Arc::new(NightSkyCache::default()));
        create_router(state)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = router(TimeContext::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["time_initialized"], false);
    }

    #[tokio::test]
    async fn test_invalid_latitude_is_bad_request() {
        let request = Request::post("/v1/night-sky")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "planet_id": "terra",
                    "host_star_id": "sun",
                    "instant": "2030-01-01T00:00:00Z",
                    "observer_lat_deg": 120.0
                })
                .to_string(),
            ))
            .unwrap();

        let response = router(TimeContext::initialized(TimeScales::default()))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = router(TimeContext::new())
            .oneshot(Request::get("/v1/stars").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalidate_planet_route() {
        let response = router(TimeContext::new())
            .oneshot(
                Request::delete("/v1/cache/planets/terra")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["removed"], 0);
    }
}

//! HTTP handlers for the REST API.
//!
//! Each handler converts the wire DTO, delegates to [`NightSkyService`] and
//! converts back.
//!
//! [`NightSkyService`]: crate::services::NightSkyService

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{
    CacheClearedResponse, CacheStats, HealthResponse, IsNightResponse, NightSkyRequestDto,
    NightSkyResponse, PlanetarySkyModel,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::PlanetId;
use crate::db::repository::StarRepository;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let store = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        store,
        time_initialized: state.night_sky.time().context().is_initialized(),
    }))
}

// =============================================================================
// Night sky
// =============================================================================

/// POST /v1/night-sky
pub async fn compute_night_sky(
    State(state): State<AppState>,
    Json(body): Json<NightSkyRequestDto>,
) -> HandlerResult<NightSkyResponse> {
    let request = body.into_request()?;
    let result = state.night_sky.compute_night_sky(&request).await?;
    Ok(Json(NightSkyResponse::from(&result)))
}

/// POST /v1/night-sky/is-night
pub async fn is_night(
    State(state): State<AppState>,
    Json(body): Json<NightSkyRequestDto>,
) -> HandlerResult<IsNightResponse> {
    let request = body.into_request()?;
    let is_night = state.night_sky.is_night_time(&request).await?;
    Ok(Json(IsNightResponse {
        planet_id: request.planet_id.to_string(),
        is_night,
    }))
}

/// POST /v1/night-sky/planetary
pub async fn compute_planetary_sky(
    State(state): State<AppState>,
    Json(body): Json<NightSkyRequestDto>,
) -> HandlerResult<PlanetarySkyModel> {
    let request = body.into_request()?;
    Ok(Json(state.night_sky.compute_planetary_sky(&request).await?))
}

// =============================================================================
// Cache administration
// =============================================================================

/// GET /v1/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> HandlerResult<CacheStats> {
    Ok(Json(state.night_sky.cache_stats()))
}

/// DELETE /v1/cache
pub async fn clear_cache(State(state): State<AppState>) -> HandlerResult<CacheClearedResponse> {
    let removed = state.night_sky.cache_stats().entry_count;
    state.night_sky.clear_cache();
    Ok(Json(CacheClearedResponse {
        removed,
        message: "Sky cache cleared".to_string(),
    }))
}

/// DELETE /v1/cache/planets/{planet_id}
pub async fn invalidate_planet(
    State(state): State<AppState>,
    Path(planet_id): Path<String>,
) -> HandlerResult<CacheClearedResponse> {
    let planet_id = PlanetId::new(planet_id);
    let removed = state.night_sky.invalidate_planet(&planet_id);
    Ok(Json(CacheClearedResponse {
        removed,
        message: format!("Invalidated cached skies for planet {}", planet_id),
    }))
}

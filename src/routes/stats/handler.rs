use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    AppState,
    cache::RequestRecord,
    error::{AppError, AppResult},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{CacheStatsResponse, ClearCacheResponse, LimitQuery, UserStatsResponse};

#[axum::debug_handler]
pub async fn cache_stats(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<CacheStatsResponse>>> {
    let stats = state.cache.stats(query.resolve()).await?;

    Ok(success_to_api_response(CacheStatsResponse {
        total_entries: stats.total_entries,
        expiration_secs: state.cache.expiration_secs(),
        recent: stats.recent,
    }))
}

#[axum::debug_handler]
pub async fn clear_cache(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ClearCacheResponse>>> {
    let removed = state.cache.clear_all().await?;
    Ok(success_to_api_response(ClearCacheResponse { removed }))
}

#[axum::debug_handler]
pub async fn user_stats(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<UserStatsResponse>>> {
    let limit = query.resolve();
    let summary = state.ledger.summary().await?;
    let top_sources = state.ledger.top_by_activity(limit).await?;
    let recent_sources = state.ledger.most_recent(limit).await?;

    Ok(success_to_api_response(UserStatsResponse {
        total_sources: summary.total_sources,
        total_requests: summary.total_requests,
        top_sources,
        recent_sources,
    }))
}

#[axum::debug_handler]
pub async fn request_history(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> AppResult<Json<ApiResponse<RequestRecord>>> {
    match state.ledger.get(&source).await? {
        Some(record) => Ok(success_to_api_response(record)),
        None => Err(AppError::NotFound(format!("没有来自 {} 的请求记录", source))),
    }
}

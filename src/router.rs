use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::{log_errors, record_request},
    routes,
};

// 预测相关的路由
pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(routes::predict::index))
        .route("/predict-user/", post(routes::predict::predict_user))
        .route("/predict-csv/", post(routes::predict::predict_csv))
}

// 缓存与请求统计相关的路由
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/cache/stats", get(routes::stats::cache_stats))
        .route("/cache", delete(routes::stats::clear_cache))
        .route("/stats/users", get(routes::stats::user_stats))
        .route("/stats/requests/{source}", get(routes::stats::request_history))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(predict_routes())
        .merge(stats_routes())
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(
            state.ledger.clone(),
            record_request,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

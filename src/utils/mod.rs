use axum::{
    Json,
    body::Body,
    extract::ConnectInfo,
    http::Request,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

// 统一响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

/// 当前 UTC 时间戳（秒）
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 解析请求来源地址：优先 x-real-ip，其次 x-forwarded-for 第一个非空值，最后是连接地址
pub fn client_ip(req: &Request<Body>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const NOT_FOUND: i32 = 1004;
    pub const UPSTREAM_FAILURE: i32 = 2001;
    pub const FEATURE_ERROR: i32 = 2002;
    pub const CLASSIFIER_ERROR: i32 = 2003;
    pub const STORAGE_UNAVAILABLE: i32 = 5001;
}

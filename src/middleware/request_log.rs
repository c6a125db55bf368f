use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{cache::RequestLedger, utils::client_ip};

/// 记录每个请求的来源地址
///
/// 写入在独立任务中完成，失败只记日志，不影响当前请求。
pub async fn record_request(
    State(ledger): State<RequestLedger>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let source = client_ip(&req);
    tracing::debug!("request from {} {} {}", source, req.method(), req.uri().path());

    tokio::spawn(async move {
        if let Err(e) = ledger.record(&source).await {
            tracing::warn!("Failed to record request from {}: {}", source, e);
        }
    });

    next.run(req).await
}

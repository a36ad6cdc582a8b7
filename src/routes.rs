//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{handlers, middleware::AppState};

/// 请求体上限（字节）
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    // SSH 会话
    let session_routes = Router::new()
        .route("/api/v1/session", get(handlers::session::get_status))
        .route("/api/v1/session/connect", post(handlers::session::connect))
        .route("/api/v1/session/disconnect", post(handlers::session::disconnect));

    // Docker 操作
    let operation_routes = Router::new().route(
        "/api/v1/operations",
        get(handlers::operation::list_operations).post(handlers::operation::run_operation),
    );

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(operation_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

//! SSH 会话处理器
//! 连接、断开与状态查询

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use secrecy::Secret;
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppError, middleware::AppState, services::SessionStatus};

/// 连接请求
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// `host` 或 `host:port`
    pub host: String,
    pub username: String,
    pub password: Secret<String>,
}

/// 查询会话状态
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.session_service.status().await)
}

/// 建立 SSH 会话
pub async fn connect(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<SessionStatus>, AppError> {
    let Json(request) = payload?;
    state
        .session_service
        .connect(&request.host, &request.username, request.password)
        .await?;

    Ok(Json(state.session_service.status().await))
}

/// 断开 SSH 会话
pub async fn disconnect(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    state.session_service.disconnect().await;
    Json(state.session_service.status().await)
}

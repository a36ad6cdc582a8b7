//! Docker 操作处理器
//! 操作目录与操作执行

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    docker::{OperationField, OperationKind, OperationRequest},
    error::AppError,
    execution::ExecutionOutcome,
    middleware::AppState,
    services::OperationResult,
};

/// 操作目录项
#[derive(Serialize)]
pub struct OperationInfo {
    pub kind: OperationKind,
    pub label: &'static str,
    pub fields: &'static [OperationField],
}

/// 操作执行响应
///
/// `status` 取值: not_connected, invalid, failed, completed
#[derive(Debug, Serialize)]
pub struct OperationResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeResponse>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub exit_succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    /// 展示用输出（stdout 为空时取 stderr）
    pub display: String,
}

impl From<ExecutionOutcome> for OutcomeResponse {
    fn from(outcome: ExecutionOutcome) -> Self {
        Self {
            display: outcome.display_output().to_string(),
            exit_succeeded: outcome.exit_succeeded,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        }
    }
}

impl From<OperationResult> for OperationResponse {
    fn from(result: OperationResult) -> Self {
        match result {
            OperationResult::NotConnected => Self {
                status: "not_connected",
                error: Some("Not connected to SSH server".to_string()),
                outcome: None,
            },
            OperationResult::Invalid(e) => Self {
                status: "invalid",
                error: Some(e.to_string()),
                outcome: None,
            },
            OperationResult::Failed(e) => Self {
                status: "failed",
                error: Some(e.to_string()),
                outcome: None,
            },
            OperationResult::Completed(outcome) => Self {
                status: "completed",
                error: None,
                outcome: Some(outcome.into()),
            },
        }
    }
}

/// 列出支持的操作
pub async fn list_operations() -> Json<Vec<OperationInfo>> {
    let catalog = OperationKind::ALL
        .iter()
        .map(|kind| OperationInfo {
            kind: *kind,
            label: kind.label(),
            fields: kind.fields(),
        })
        .collect();

    Json(catalog)
}

/// 执行操作
///
/// 所有结果（包括未连接和校验失败）都以 200 返回，由 `status` 区分。
/// 无法解析的请求体返回 400。
pub async fn run_operation(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(request) = payload?;
    let result = state.session_service.run_operation(request).await;
    Ok(Json(result.into()))
}

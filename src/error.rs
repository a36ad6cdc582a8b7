//! 统一错误模型
//! 定义会话各层的错误类型和 HTTP 错误响应格式
//!
//! 每个组件边界都有独立的错误类型：
//! - `ConnectError`: 建立 SSH 会话失败
//! - `ValidationError`: 操作请求校验失败（不会触达网络）
//! - `ExecutionError`: 命令执行期间的传输层故障
//!
//! 远程命令自身的失败（stderr 有输出）不是错误，而是 `ExecutionOutcome` 中的数据。

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// SSH 连接错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Invalid SSH target: {0}")]
    InvalidTarget(String),

    #[error("SSH connection timed out: {0}")]
    Timeout(String),

    #[error("SSH network error: {0}")]
    Network(String),

    #[error("SSH authentication failed: {0}")]
    Authentication(String),

    #[error("SSH protocol error: {0}")]
    Protocol(String),
}

/// 操作请求校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必填的镜像名或容器标识为空
    #[error("Missing required identifier: {0}")]
    MissingIdentifier(&'static str),
}

/// 命令执行期间的传输层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Failed to open SSH channel: {0}")]
    ChannelOpen(String),

    #[error("SSH transport failure: {0}")]
    Transport(String),

    #[error("Command timed out after {0}s")]
    Timeout(u64),
}

/// 应用错误类型（HTTP 层）
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求体不是合法的 JSON 或缺少字段
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Connect(e) => match e {
                ConnectError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
                ConnectError::Authentication(_) => StatusCode::UNAUTHORIZED,
                ConnectError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ConnectError::Network(_) | ConnectError::Protocol(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Connect(e) => format!("SSH connection failed: {}", e),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        tracing::error!(
            code = self.code(),
            message = %self,
            request_id = %error_response.error.request_id,
            "Application error"
        );

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_codes() {
        let invalid: AppError = ConnectError::InvalidTarget("".to_string()).into();
        assert_eq!(invalid.code(), 400);

        let auth: AppError = ConnectError::Authentication("denied".to_string()).into();
        assert_eq!(auth.code(), 401);

        let timeout: AppError = ConnectError::Timeout("host:22".to_string()).into();
        assert_eq!(timeout.code(), 504);

        let network: AppError = ConnectError::Network("refused".to_string()).into();
        assert_eq!(network.code(), 502);
    }

    #[test]
    fn test_bad_request_code() {
        let error = AppError::BadRequest("missing field `username`".to_string());
        assert_eq!(error.code(), 400);
        assert_eq!(error.user_message(), "missing field `username`");
    }

    #[test]
    fn test_auth_message_has_no_password() {
        let error: AppError =
            ConnectError::Authentication("root@host:22 rejected password authentication".to_string())
                .into();
        assert_eq!(
            error.user_message(),
            "SSH connection failed: SSH authentication failed: root@host:22 rejected password authentication"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ValidationError::MissingIdentifier("image").to_string(),
            "Missing required identifier: image"
        );
        assert_eq!(ExecutionError::Timeout(30).to_string(), "Command timed out after 30s");
    }
}

//! 会话服务层
//! 持有进程内唯一的 SSH 会话，对外提供连接、断开和执行 docker 操作的入口

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::SshSettings;
use crate::docker::{self, OperationRequest};
use crate::error::{ConnectError, ExecutionError, ValidationError};
use crate::execution::{self, ExecutionOutcome};
use crate::ssh::{CommandExecutor, Connector, RemoteShell, SshCredentials, SshTarget};

/// 会话状态
///
/// 只有 Connected 状态持有传输句柄。
enum Session {
    Disconnected,
    Connected(ConnectedSession),
}

struct ConnectedSession {
    shell: Arc<dyn RemoteShell>,
    target: String,
    username: String,
    connected_at: DateTime<Utc>,
}

/// 执行操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// 当前没有 SSH 会话，未构建也未执行任何命令
    NotConnected,
    /// 请求校验失败，命令未发送
    Invalid(ValidationError),
    /// 传输层故障
    Failed(ExecutionError),
    /// 命令已执行（成功与否见 outcome）
    Completed(ExecutionOutcome),
}

/// 会话状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

/// 会话服务
pub struct SessionService {
    connector: Arc<dyn Connector>,
    executor: CommandExecutor,
    default_port: u16,
    // 只在读写状态时短暂持有，不跨越远程命令
    session: Mutex<Session>,
    // 同一时刻只允许一条命令占用连接
    command_lock: Mutex<()>,
}

impl SessionService {
    /// 创建新的会话服务（初始为未连接）
    pub fn new(connector: Arc<dyn Connector>, settings: &SshSettings) -> Self {
        Self {
            connector,
            executor: CommandExecutor::new(settings.command_timeout()),
            default_port: settings.default_port,
            session: Mutex::new(Session::Disconnected),
            command_lock: Mutex::new(()),
        }
    }

    /// 建立 SSH 会话
    ///
    /// 已有会话时先断开旧会话。失败时保持未连接状态。
    /// 目标地址或用户名无效时直接返回，不影响当前会话。
    #[instrument(skip(self, password))]
    pub async fn connect(
        &self,
        host: &str,
        username: &str,
        password: Secret<String>,
    ) -> Result<(), ConnectError> {
        let target = SshTarget::parse(host, self.default_port)?;
        let username = username.trim();
        if username.is_empty() {
            return Err(ConnectError::InvalidTarget("username is empty".to_string()));
        }
        let credentials = SshCredentials::new(username, password);

        let mut session = self.session.lock().await;

        if let Session::Connected(previous) =
            std::mem::replace(&mut *session, Session::Disconnected)
        {
            info!(remote = %previous.target, "Replacing existing SSH session");
            previous.shell.close().await;
        }

        let shell = self.connector.connect(&target, &credentials).await.map_err(|e| {
            warn!(remote = %target, error = %e, "SSH connection failed");
            e
        })?;

        info!(remote = %target, user = %credentials.username, "SSH session established");

        *session = Session::Connected(ConnectedSession {
            shell: Arc::from(shell),
            target: target.to_string(),
            username: credentials.username,
            connected_at: Utc::now(),
        });

        Ok(())
    }

    /// 断开 SSH 会话，未连接时无操作
    ///
    /// 不等待正在执行的命令；连接关闭后该命令以传输错误结束。
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;

        match std::mem::replace(&mut *session, Session::Disconnected) {
            Session::Connected(current) => {
                current.shell.close().await;
                info!(remote = %current.target, "SSH session disconnected");
            }
            Session::Disconnected => {}
        }
    }

    /// 进程退出前关闭会话
    pub async fn shutdown(&self) {
        info!("Closing SSH session for shutdown");
        self.disconnect().await;
    }

    /// 当前会话状态
    pub async fn status(&self) -> SessionStatus {
        match &*self.session.lock().await {
            Session::Connected(current) => SessionStatus {
                connected: true,
                target: Some(current.target.clone()),
                username: Some(current.username.clone()),
                connected_at: Some(current.connected_at),
            },
            Session::Disconnected => SessionStatus {
                connected: false,
                target: None,
                username: None,
                connected_at: None,
            },
        }
    }

    /// 执行 docker 操作
    ///
    /// 传输故障不会断开会话，由调用方决定是否重试。
    #[instrument(skip(self, request), fields(operation = %request.kind()))]
    pub async fn run_operation(&self, request: OperationRequest) -> OperationResult {
        let _command = self.command_lock.lock().await;

        let (shell, target) = match &*self.session.lock().await {
            Session::Connected(current) => (current.shell.clone(), current.target.clone()),
            Session::Disconnected => {
                warn!("Operation requested without an SSH session");
                return OperationResult::NotConnected;
            }
        };

        let spec = match docker::build(&request) {
            Ok(spec) => spec,
            Err(e) => return OperationResult::Invalid(e),
        };

        match self.executor.execute(shell.as_ref(), &spec).await {
            Ok(raw) => OperationResult::Completed(execution::normalize(raw.stdout, raw.stderr)),
            Err(e) => {
                warn!(remote = %target, error = %e, "Remote command failed at transport level");
                OperationResult::Failed(e)
            }
        }
    }
}

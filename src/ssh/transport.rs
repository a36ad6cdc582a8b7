//! SSH 传输会话
//!
//! 使用 russh 建立经过认证的 SSH 连接。
//!
//! 主机密钥策略：首次使用即信任，无条件接受服务端密钥，只记录指纹。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;
use russh_keys::PublicKeyBase64;
use secrecy::{ExposeSecret, Secret};
use sha2::Digest;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::{ConnectError, ExecutionError};
use crate::execution::RawOutput;

/// 连接目标（主机 + 端口）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
}

impl SshTarget {
    /// 解析 `host`、`host:port` 或 `[v6addr]:port`
    ///
    /// 未带端口时使用 `default_port`。不带方括号的 IPv6 地址整体视为主机。
    pub fn parse(input: &str, default_port: u16) -> Result<Self, ConnectError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConnectError::InvalidTarget("host is empty".to_string()));
        }

        if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(|| {
                ConnectError::InvalidTarget(format!("unterminated IPv6 address: {}", input))
            })?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port, input)?,
                None if tail.is_empty() => default_port,
                None => {
                    return Err(ConnectError::InvalidTarget(format!(
                        "unexpected characters after address: {}",
                        input
                    )))
                }
            };
            return Self::checked(host, port);
        }

        match input.split_once(':') {
            Some((host, port)) if !port.contains(':') => {
                Self::checked(host, parse_port(port, input)?)
            }
            _ => Self::checked(input, default_port),
        }
    }

    fn checked(host: &str, port: u16) -> Result<Self, ConnectError> {
        if host.is_empty() {
            return Err(ConnectError::InvalidTarget("host is empty".to_string()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

fn parse_port(port: &str, input: &str) -> Result<u16, ConnectError> {
    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConnectError::InvalidTarget(format!("invalid port in {}", input))),
    }
}

impl std::fmt::Display for SshTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// 登录凭据，密码使用 Secret 包装，防止日志泄露
#[derive(Debug, Clone)]
pub struct SshCredentials {
    pub username: String,
    pub password: Secret<String>,
}

impl SshCredentials {
    pub fn new(username: impl Into<String>, password: Secret<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// 已认证的远程 shell
///
/// 每次 `exec` 打开一个新通道执行单条命令行，并在返回前读完全部输出。
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// 执行命令行，返回完整的 stdout/stderr
    async fn exec(&self, command_line: &str) -> Result<RawOutput, ExecutionError>;

    /// 关闭连接，可重复调用
    async fn close(&self);
}

/// 建立远程 shell 的连接器
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        target: &SshTarget,
        credentials: &SshCredentials,
    ) -> Result<Box<dyn RemoteShell>, ConnectError>;
}

/// 基于 russh 的连接器
pub struct SshConnector {
    connect_timeout: Duration,
}

impl SshConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(
        &self,
        target: &SshTarget,
        credentials: &SshCredentials,
    ) -> Result<Box<dyn RemoteShell>, ConnectError> {
        if credentials.username.trim().is_empty() {
            return Err(ConnectError::InvalidTarget("username is empty".to_string()));
        }

        debug!(remote = %target, user = %credentials.username, "Opening SSH connection");

        let client_config = Arc::new(client::Config {
            preferred: russh::Preferred::default(),
            ..Default::default()
        });
        let handler = SshClientHandler {
            target: target.to_string(),
        };

        let mut handle = timeout(
            self.connect_timeout,
            client::connect(client_config, (target.host.clone(), target.port), handler),
        )
        .await
        .map_err(|_| ConnectError::Timeout(target.to_string()))?
        .map_err(|e| {
            error!(remote = %target, error = %e, "SSH connection failed");
            classify_connect_error(e)
        })?;

        let authenticated = timeout(
            self.connect_timeout,
            handle.authenticate_password(
                credentials.username.clone(),
                credentials.password.expose_secret().clone(),
            ),
        )
        .await
        .map_err(|_| ConnectError::Timeout(target.to_string()))?
        .map_err(|e| {
            error!(remote = %target, error = %e, "SSH authentication aborted");
            classify_connect_error(e)
        })?;

        if !authenticated {
            error!(remote = %target, user = %credentials.username, "SSH认证失败");
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "")
                .await;
            return Err(ConnectError::Authentication(format!(
                "{}@{} rejected password authentication",
                credentials.username, target
            )));
        }

        info!(remote = %target, user = %credentials.username, "SSH认证成功");

        Ok(Box::new(SshTransport::new(handle, target.to_string())))
    }
}

fn classify_connect_error(e: russh::Error) -> ConnectError {
    match e {
        russh::Error::IO(io) => ConnectError::Network(io.to_string()),
        other => ConnectError::Protocol(other.to_string()),
    }
}

/// 已认证的 SSH 连接
pub struct SshTransport {
    pub(crate) handle: Mutex<Option<client::Handle<SshClientHandler>>>,
    pub(crate) target: String,
}

impl SshTransport {
    fn new(handle: client::Handle<SshClientHandler>, target: String) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
            target,
        }
    }

    /// 断开连接；已断开时直接返回
    pub(crate) async fn shutdown(&self) {
        let Some(handle) = self.handle.lock().await.take() else {
            debug!(remote = %self.target, "SSH connection already closed");
            return;
        };

        if let Err(e) = handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
        {
            warn!(remote = %self.target, error = %e, "SSH disconnect reported an error");
        }
        info!(remote = %self.target, "SSH connection closed");
    }
}

/// SSH 客户端会话处理器
pub struct SshClientHandler {
    target: String,
}

#[async_trait]
impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let key_data = server_public_key.public_key_base64();
        let mut hasher = sha2::Sha256::new();
        hasher.update(key_data.as_bytes());
        let fingerprint = hex::encode(hasher.finalize());

        warn!(
            remote = %self.target,
            fingerprint = %fingerprint,
            "Accepting host key without verification"
        );
        Ok(true)
    }
}

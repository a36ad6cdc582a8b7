//! 测试公共模块
//! 提供内存中的 SSH 连接器替身和测试应用状态

#![allow(dead_code)]

use async_trait::async_trait;
use docker_dashboard::{
    config::{AppConfig, LoggingConfig, ServerConfig, SshSettings},
    error::{ConnectError, ExecutionError},
    execution::RawOutput,
    middleware::AppState,
    services::SessionService,
    ssh::{Connector, RemoteShell, SshCredentials, SshTarget},
};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_PASSWORD: &str = "correct-horse";

/// 远程主机替身的共享状态
#[derive(Default)]
pub struct FakeHost {
    /// 收到的命令行（按顺序）
    pub commands: Mutex<Vec<String>>,
    /// 预设响应：命令行 -> 输出
    pub responses: Mutex<HashMap<String, Result<RawOutput, ExecutionError>>>,
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub last_target: Mutex<Option<SshTarget>>,
}

impl FakeHost {
    pub fn respond(&self, command_line: &str, stdout: &str, stderr: &str) {
        self.responses.lock().unwrap().insert(
            command_line.to_string(),
            Ok(RawOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_status: Some(0),
                duration_secs: 0.01,
            }),
        );
    }

    pub fn fail(&self, command_line: &str, error: ExecutionError) {
        self.responses
            .lock()
            .unwrap()
            .insert(command_line.to_string(), Err(error));
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

struct FakeShell {
    host: Arc<FakeHost>,
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn exec(&self, command_line: &str) -> Result<RawOutput, ExecutionError> {
        self.host
            .commands
            .lock()
            .unwrap()
            .push(command_line.to_string());

        self.host
            .responses
            .lock()
            .unwrap()
            .get(command_line)
            .cloned()
            .unwrap_or_else(|| Ok(RawOutput::default()))
    }

    async fn close(&self) {
        self.host.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// 只接受 TEST_PASSWORD 的连接器；主机名 "unreachable" 模拟网络故障
pub struct FakeConnector {
    pub host: Arc<FakeHost>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            host: Arc::new(FakeHost::default()),
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        target: &SshTarget,
        credentials: &SshCredentials,
    ) -> Result<Box<dyn RemoteShell>, ConnectError> {
        if target.host == "unreachable" {
            return Err(ConnectError::Network(format!("{}: connection refused", target)));
        }
        if credentials.password.expose_secret() != TEST_PASSWORD {
            return Err(ConnectError::Authentication(format!(
                "{}@{} rejected password authentication",
                credentials.username, target
            )));
        }

        self.host.connects.fetch_add(1, Ordering::SeqCst);
        *self.host.last_target.lock().unwrap() = Some(target.clone());

        Ok(Box::new(FakeShell {
            host: self.host.clone(),
        }))
    }
}

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 1,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        ssh: SshSettings {
            default_port: 22,
            connect_timeout_secs: 5,
            command_timeout_secs: 5,
        },
    }
}

/// 创建测试会话服务，返回服务和远程主机替身
pub fn create_test_session_service() -> (Arc<SessionService>, Arc<FakeHost>) {
    let connector = FakeConnector::new();
    let host = connector.host.clone();
    let config = create_test_config();
    let service = Arc::new(SessionService::new(Arc::new(connector), &config.ssh));
    (service, host)
}

/// 创建测试应用状态
pub fn create_test_app_state() -> (Arc<AppState>, Arc<FakeHost>) {
    let (session_service, host) = create_test_session_service();
    let state = Arc::new(AppState { session_service });
    (state, host)
}

/// 连接密码
pub fn password(value: &str) -> secrecy::Secret<String> {
    secrecy::Secret::new(value.to_string())
}

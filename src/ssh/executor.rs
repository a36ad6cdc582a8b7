//! SSH执行器模块
//! 在已认证的连接上执行 docker 命令并收集完整输出

use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::ChannelMsg;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::docker::CommandSpec;
use crate::error::ExecutionError;
use crate::execution::RawOutput;
use crate::ssh::transport::{RemoteShell, SshTransport};

/// SSH_EXTENDED_DATA_STDERR
const EXTENDED_DATA_STDERR: u32 = 1;

/// 命令执行器
///
/// 负责把参数列表拼成远程 shell 命令行，并对等待输出设置上限。
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    command_timeout: Duration,
}

impl CommandExecutor {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    /// 在远程 shell 上执行命令
    ///
    /// 远程命令的非零退出不是错误；只有传输层故障和超时返回 `ExecutionError`。
    pub async fn execute(
        &self,
        shell: &dyn RemoteShell,
        spec: &CommandSpec,
    ) -> Result<RawOutput, ExecutionError> {
        let command_line = command_line(spec);
        debug!(command = %command_line, "Executing remote command");

        let output = timeout(self.command_timeout, shell.exec(&command_line))
            .await
            .map_err(|_| {
                warn!(command = %command_line, "命令执行超时");
                ExecutionError::Timeout(self.command_timeout.as_secs())
            })??;

        info!(
            command = %command_line,
            exit_status = ?output.exit_status,
            duration_secs = output.duration_secs,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Command executed"
        );

        Ok(output)
    }
}

/// 将参数列表拼接为单条命令行
///
/// 含有安全字符集之外字符的参数使用单引号转义，避免镜像名或容器名中的 shell 语法被解释。
pub fn command_line(spec: &CommandSpec) -> String {
    spec.args()
        .iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c);

    if !arg.is_empty() && arg.chars().all(is_safe) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

#[async_trait]
impl RemoteShell for SshTransport {
    async fn exec(&self, command_line: &str) -> Result<RawOutput, ExecutionError> {
        let start_time = Instant::now();

        let mut channel = {
            let guard = self.handle.lock().await;
            let handle = guard.as_ref().ok_or_else(|| {
                ExecutionError::Transport(format!("connection to {} is closed", self.target))
            })?;
            handle.channel_open_session().await.map_err(|e| {
                error!(remote = %self.target, error = %e, "打开SSH通道失败");
                ExecutionError::ChannelOpen(e.to_string())
            })?
        };

        channel.exec(true, command_line).await.map_err(|e| {
            error!(remote = %self.target, error = %e, "执行命令失败");
            ExecutionError::Transport(e.to_string())
        })?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;
        let mut finished = false;

        // 读到通道关闭为止，确保 stdout 和 stderr 都已收完
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    stdout.extend_from_slice(data);
                }
                ChannelMsg::ExtendedData { ref data, ext } => {
                    if ext == EXTENDED_DATA_STDERR {
                        stderr.extend_from_slice(data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status: code } => {
                    exit_status = Some(code);
                    finished = true;
                }
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    warn!(remote = %self.target, signal = ?signal_name, "Remote command killed by signal");
                    finished = true;
                }
                ChannelMsg::Eof => {
                    finished = true;
                }
                ChannelMsg::Close => {
                    finished = true;
                    break;
                }
                _ => {}
            }
        }

        if !finished {
            error!(remote = %self.target, "SSH connection dropped during command");
            return Err(ExecutionError::Transport(format!(
                "connection to {} dropped before the command finished",
                self.target
            )));
        }

        let _ = channel.close().await;

        Ok(RawOutput {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_status,
            duration_secs: start_time.elapsed().as_secs_f64(),
        })
    }

    async fn close(&self) {
        self.shutdown().await;
    }
}

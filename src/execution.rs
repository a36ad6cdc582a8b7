//! 统一执行结果模型
//!
//! 远程命令的原始输出，以及规范化后交给前端展示的结果

use serde::{Deserialize, Serialize};

/// 远程命令的原始输出
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    /// 标准输出
    pub stdout: String,

    /// 标准错误
    pub stderr: String,

    /// 远程退出码（服务端上报时才有，仅用于日志）
    pub exit_status: Option<u32>,

    /// 执行时长（秒）
    pub duration_secs: f64,
}

/// 规范化后的执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// 是否成功
    pub exit_succeeded: bool,

    /// 标准输出
    pub stdout: String,

    /// 标准错误
    pub stderr: String,
}

impl ExecutionOutcome {
    /// 展示用输出：优先 stdout，为空时回退到 stderr
    pub fn display_output(&self) -> &str {
        if self.stdout.is_empty() {
            &self.stderr
        } else {
            &self.stdout
        }
    }
}

impl From<RawOutput> for ExecutionOutcome {
    fn from(raw: RawOutput) -> Self {
        normalize(raw.stdout, raw.stderr)
    }
}

/// 规范化输出
///
/// 判定规则：stderr 为空即成功。远程退出码不参与判定，
/// 因此向 stderr 写诊断信息的命令即使实际成功也会被报告为失败。
pub fn normalize(stdout: String, stderr: String) -> ExecutionOutcome {
    ExecutionOutcome {
        exit_succeeded: stderr.is_empty(),
        stdout,
        stderr,
    }
}

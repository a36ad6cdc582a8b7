//! 配置系统
//! 从环境变量加载所有配置（前缀 DOCKDASH_）

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8501"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// SSH 会话设置
#[derive(Debug, Clone, Deserialize)]
pub struct SshSettings {
    /// 目标未带端口时使用的默认端口
    pub default_port: u16,
    /// 连接与认证超时（秒）
    pub connect_timeout_secs: u64,
    /// 单条命令等待输出的上限（秒）
    pub command_timeout_secs: u64,
}

impl SshSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            default_port: 22,
            connect_timeout_secs: 10,
            command_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub ssh: SshSettings,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = SshSettings::default();

        let settings = Config::builder()
            .set_default("server.addr", "0.0.0.0:8501")?
            .set_default("server.graceful_shutdown_timeout_secs", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("ssh.default_port", i64::from(defaults.default_port))?
            .set_default("ssh.connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("ssh.command_timeout_secs", defaults.command_timeout_secs as i64)?
            .add_source(
                Environment::with_prefix("DOCKDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.ssh.default_port == 0 {
            return Err(ConfigError::Message("ssh.default_port must be non-zero".to_string()));
        }

        if self.ssh.connect_timeout_secs == 0 || self.ssh.command_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "ssh timeouts must be at least 1 second".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "DOCKDASH_SERVER__ADDR",
        "DOCKDASH_LOGGING__LEVEL",
        "DOCKDASH_LOGGING__FORMAT",
        "DOCKDASH_SSH__DEFAULT_PORT",
        "DOCKDASH_SSH__COMMAND_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8501");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.ssh.default_port, 22);
        assert_eq!(config.ssh.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.ssh.command_timeout(), Duration::from_secs(300));
    }

    #[test]
    #[serial]
    fn test_config_from_env_overrides() {
        clear_env();
        std::env::set_var("DOCKDASH_SSH__DEFAULT_PORT", "2222");
        std::env::set_var("DOCKDASH_LOGGING__FORMAT", "json");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.ssh.default_port, 2222);
        assert_eq!(config.logging.format, "json");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        clear_env();
        std::env::set_var("DOCKDASH_LOGGING__LEVEL", "invalid");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_zero_timeout() {
        clear_env();
        std::env::set_var("DOCKDASH_SSH__COMMAND_TIMEOUT_SECS", "0");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }
}

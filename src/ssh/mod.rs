//! SSH执行模块
//! 传输会话与远程命令执行

pub mod executor;
pub mod transport;

pub use executor::{command_line, CommandExecutor};
pub use transport::{Connector, RemoteShell, SshConnector, SshCredentials, SshTarget, SshTransport};

//! Docker 操作模块
//! 操作请求模型与命令构建

pub mod command;
pub mod operation;

pub use command::{build, CommandSpec};
pub use operation::{OperationField, OperationKind, OperationRequest};

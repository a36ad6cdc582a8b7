//! Docker 控制面板后端
//! 通过单个 SSH 会话远程驱动 docker CLI

pub mod config;
pub mod docker;
pub mod error;
pub mod execution;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod ssh;
pub mod telemetry;

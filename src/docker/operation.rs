//! Docker 操作模型
//!
//! 前端可选择的六种容器管理操作，以及每种操作携带的参数

use serde::{Deserialize, Serialize};

/// 操作请求
///
/// 每个变体只携带与之相关的字段。标识类字段在构建命令前统一校验，
/// 空字符串或纯空白会被拒绝。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationRequest {
    /// 从 Docker Hub 拉取镜像
    PullImage { image: String },

    /// 启动新容器
    LaunchContainer {
        image: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        port_mapping: Option<String>,
        #[serde(default = "default_detached")]
        detached: bool,
    },

    /// 列出运行中的容器
    ListContainers,

    /// 停止容器（名称或 ID）
    StopContainer { target: String },

    /// 删除容器（名称或 ID）
    RemoveContainer { target: String },

    /// 列出本地镜像
    ListImages,
}

fn default_detached() -> bool {
    true
}

impl OperationRequest {
    /// 获取操作类型
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::PullImage { .. } => OperationKind::PullImage,
            OperationRequest::LaunchContainer { .. } => OperationKind::LaunchContainer,
            OperationRequest::ListContainers => OperationKind::ListContainers,
            OperationRequest::StopContainer { .. } => OperationKind::StopContainer,
            OperationRequest::RemoveContainer { .. } => OperationKind::RemoveContainer,
            OperationRequest::ListImages => OperationKind::ListImages,
        }
    }
}

/// 操作类型（不含参数），用于操作目录和日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    PullImage,
    LaunchContainer,
    ListContainers,
    StopContainer,
    RemoveContainer,
    ListImages,
}

impl OperationKind {
    /// 所有支持的操作，按菜单顺序
    pub const ALL: [OperationKind; 6] = [
        OperationKind::PullImage,
        OperationKind::LaunchContainer,
        OperationKind::ListContainers,
        OperationKind::StopContainer,
        OperationKind::RemoveContainer,
        OperationKind::ListImages,
    ];

    /// 菜单显示名称
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::PullImage => "Pull image from Docker Hub",
            OperationKind::LaunchContainer => "Launch a new container",
            OperationKind::ListContainers => "List running containers",
            OperationKind::StopContainer => "Stop a container",
            OperationKind::RemoveContainer => "Remove a container",
            OperationKind::ListImages => "List all Docker images",
        }
    }

    /// 请求体中可用的字段
    pub fn fields(&self) -> &'static [OperationField] {
        const IMAGE: OperationField = OperationField::required("image");
        const TARGET: OperationField = OperationField::required("target");
        const NAME: OperationField = OperationField::optional("name");
        const PORT_MAPPING: OperationField = OperationField::optional("port_mapping");
        const DETACHED: OperationField = OperationField::optional("detached");

        match self {
            OperationKind::PullImage => &[IMAGE],
            OperationKind::LaunchContainer => &[IMAGE, NAME, PORT_MAPPING, DETACHED],
            OperationKind::StopContainer | OperationKind::RemoveContainer => &[TARGET],
            OperationKind::ListContainers | OperationKind::ListImages => &[],
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::PullImage => "pull_image",
            OperationKind::LaunchContainer => "launch_container",
            OperationKind::ListContainers => "list_containers",
            OperationKind::StopContainer => "stop_container",
            OperationKind::RemoveContainer => "remove_container",
            OperationKind::ListImages => "list_images",
        };
        f.write_str(name)
    }
}

/// 操作字段描述
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationField {
    pub name: &'static str,
    pub required: bool,
}

impl OperationField {
    const fn required(name: &'static str) -> Self {
        Self { name, required: true }
    }

    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

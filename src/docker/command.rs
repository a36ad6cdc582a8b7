//! Docker 命令构建
//!
//! 将操作请求映射为远程 docker CLI 的参数列表。纯函数，无 I/O。

use crate::docker::operation::OperationRequest;
use crate::error::ValidationError;

/// 远程 docker 可执行文件
pub const DOCKER_BINARY: &str = "docker";

/// 命令参数列表
///
/// 构建后不可变。参数始终以独立 token 保存，拼接为命令行的工作由执行器负责。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    args: Vec<String>,
}

impl CommandSpec {
    fn new(subcommand: &str) -> Self {
        Self {
            args: vec![DOCKER_BINARY.to_string(), subcommand.to_string()],
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 获取参数列表
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// 根据操作请求构建命令
///
/// `run` 的参数顺序固定为：`-d`、`--name <name>`、`-p <mapping>`、镜像。
/// 所有标志必须出现在镜像参数之前。
pub fn build(request: &OperationRequest) -> Result<CommandSpec, ValidationError> {
    let spec = match request {
        OperationRequest::PullImage { image } => {
            CommandSpec::new("pull").arg(required(image, "image")?)
        }
        OperationRequest::LaunchContainer {
            image,
            name,
            port_mapping,
            detached,
        } => {
            let image = required(image, "image")?;

            let mut spec = CommandSpec::new("run");
            if *detached {
                spec = spec.arg("-d");
            }
            if let Some(name) = optional(name) {
                spec = spec.arg("--name").arg(name);
            }
            if let Some(mapping) = optional(port_mapping) {
                spec = spec.arg("-p").arg(mapping);
            }
            spec.arg(image)
        }
        OperationRequest::ListContainers => CommandSpec::new("ps"),
        OperationRequest::StopContainer { target } => {
            CommandSpec::new("stop").arg(required(target, "target")?)
        }
        OperationRequest::RemoveContainer { target } => {
            CommandSpec::new("rm").arg(required(target, "target")?)
        }
        OperationRequest::ListImages => CommandSpec::new("images"),
    };

    Ok(spec)
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingIdentifier(field));
    }
    Ok(trimmed)
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(request: OperationRequest) -> Vec<String> {
        build(&request).unwrap().args().to_vec()
    }

    #[test]
    fn test_build_pull_image() {
        let request = OperationRequest::PullImage {
            image: "nginx".to_string(),
        };
        assert_eq!(args(request), vec!["docker", "pull", "nginx"]);
    }

    #[test]
    fn test_build_launch_container_full() {
        let request = OperationRequest::LaunchContainer {
            image: "nginx".to_string(),
            name: Some("web".to_string()),
            port_mapping: Some("8080:80".to_string()),
            detached: true,
        };
        assert_eq!(
            args(request),
            vec!["docker", "run", "-d", "--name", "web", "-p", "8080:80", "nginx"]
        );
    }

    #[test]
    fn test_build_launch_container_minimal() {
        let request = OperationRequest::LaunchContainer {
            image: "redis:7".to_string(),
            name: Some("   ".to_string()),
            port_mapping: Some(String::new()),
            detached: false,
        };
        assert_eq!(args(request), vec!["docker", "run", "redis:7"]);
    }

    #[test]
    fn test_build_launch_container_port_without_name() {
        let request = OperationRequest::LaunchContainer {
            image: "nginx".to_string(),
            name: None,
            port_mapping: Some("8080:80".to_string()),
            detached: true,
        };
        assert_eq!(args(request), vec!["docker", "run", "-d", "-p", "8080:80", "nginx"]);
    }

    #[test]
    fn test_build_parameterless_operations() {
        assert_eq!(args(OperationRequest::ListContainers), vec!["docker", "ps"]);
        assert_eq!(args(OperationRequest::ListImages), vec!["docker", "images"]);
    }

    #[test]
    fn test_build_stop_and_remove_trim_target() {
        let stop = OperationRequest::StopContainer {
            target: "  web  ".to_string(),
        };
        assert_eq!(args(stop), vec!["docker", "stop", "web"]);

        let remove = OperationRequest::RemoveContainer {
            target: "3f2a9c".to_string(),
        };
        assert_eq!(args(remove), vec!["docker", "rm", "3f2a9c"]);
    }

    #[test]
    fn test_build_rejects_missing_identifiers() {
        let requests = vec![
            OperationRequest::PullImage {
                image: "".to_string(),
            },
            OperationRequest::LaunchContainer {
                image: " \t".to_string(),
                name: Some("web".to_string()),
                port_mapping: None,
                detached: true,
            },
            OperationRequest::StopContainer {
                target: "   ".to_string(),
            },
            OperationRequest::RemoveContainer {
                target: "\n".to_string(),
            },
        ];

        for request in requests {
            let result = build(&request);
            assert!(
                matches!(result, Err(ValidationError::MissingIdentifier(_))),
                "expected MissingIdentifier for {:?}",
                request
            );
        }
    }

    #[test]
    fn test_build_keeps_hostile_input_as_single_token() {
        let request = OperationRequest::StopContainer {
            target: "web; rm -rf /".to_string(),
        };
        let spec = build(&request).unwrap();
        assert_eq!(spec.args().len(), 3);
        assert_eq!(spec.args()[2], "web; rm -rf /");
    }
}

//! 统一的错误处理类型
//!
//! 容器层使用 `ContainerError`，启动层（配置加载、日志初始化）使用
//! `ApplicationError`。用户回调（工厂、注入、初始化、后置处理器）返回
//! `anyhow::Error`，容器会把它作为 `source` 保留下来。

use thiserror::Error;

/// 容器操作的结果类型
pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动层的结果类型
pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 同名 Bean 重复声明
    #[error("Bean '{0}' is already defined")]
    DuplicateBeanName(String),

    /// Bean 未定义；`required_by` 为发起依赖的 Bean
    #[error("No bean named '{name}' is defined{}", required_by_suffix(.required_by))]
    BeanNotFound {
        name: String,
        required_by: Option<String>,
    },

    /// 实例化（工厂调用）失败
    #[error("Failed to instantiate bean '{name}'")]
    Instantiation {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 依赖注入失败
    #[error("Failed to inject '{target}' into field '{field}' of bean '{name}'")]
    Injection {
        name: String,
        field: String,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// InitializingBean 回调失败
    #[error("Initialization of bean '{name}' failed")]
    Initialization {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 后置处理器失败
    #[error("Post-processor '{processor}' failed while processing bean '{name}'")]
    PostProcessing {
        processor: String,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// 循环依赖
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// Bean 定义不合法
    #[error("Invalid definition for bean '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    /// Bean 无法以请求的类型访问
    #[error("Bean '{name}' of type '{found}' cannot be viewed as '{expected}'")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    match required_by {
        Some(bean) => format!(" (required by bean '{}')", bean),
        None => String::new(),
    }
}

impl ContainerError {
    /// 创建未找到错误
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::BeanNotFound {
            name: name.into(),
            required_by: None,
        }
    }

    /// 出错的 Bean 名称（若有）
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateBeanName(name) => Some(name),
            Self::BeanNotFound { name, .. }
            | Self::Instantiation { name, .. }
            | Self::Injection { name, .. }
            | Self::Initialization { name, .. }
            | Self::PostProcessing { name, .. }
            | Self::InvalidDefinition { name, .. }
            | Self::TypeMismatch { name, .. } => Some(name),
            Self::CircularDependency { chain } => chain.last().map(String::as_str),
        }
    }
}

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Failed to read configuration file '{path}'")]
    ConfigLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Component '{component}' references unknown implementation type '{type_name}'")]
    UnknownComponentType { component: String, type_name: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_message_names_requester() {
        let err = ContainerError::BeanNotFound {
            name: "repo".to_string(),
            required_by: Some("service".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("'repo'"));
        assert!(message.contains("'service'"));

        assert_eq!(
            ContainerError::not_found("repo").to_string(),
            "No bean named 'repo' is defined"
        );
    }

    #[test]
    fn test_initialization_keeps_cause() {
        let err = ContainerError::Initialization {
            name: "service".to_string(),
            source: anyhow::anyhow!("connection refused"),
        };
        assert_eq!(err.bean_name(), Some("service"));
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
    }

    #[test]
    fn test_cycle_message() {
        let err = ContainerError::CircularDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }
}

//! 框架常量
//!
//! 集中定义环境变量和默认文件名，避免在各模块中硬编码

/// 默认的组件清单文件
pub const DEFAULT_MANIFEST_FILE: &str = "sprig.toml";

/// 覆盖组件清单路径的环境变量
pub const MANIFEST_PATH_ENV: &str = "SPRIG_MANIFEST";

/// 标准的 tracing 过滤器环境变量
pub const RUST_LOG_ENV: &str = "RUST_LOG";

/// 日志级别环境变量
pub const LOG_LEVEL_ENV: &str = "SPRIG_LOG_LEVEL";

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "SPRIG_LOG_FORMAT";

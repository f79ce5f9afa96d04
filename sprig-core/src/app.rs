use crate::constants::{DEFAULT_MANIFEST_FILE, MANIFEST_PATH_ENV};
use crate::declaration::ComponentDeclaration;
use crate::logging::LoggingConfig;
use crate::manifest::ComponentManifest;
use crate::{ApplicationContext, ApplicationResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Sprig 应用程序
///
/// 提供便捷的启动方式：初始化日志、收集组件声明、构建上下文
///
/// 声明来源：
/// - 存在组件清单文件时，按清单声明组件
/// - 否则扫描所有 `#[derive(Component)]` 注册的组件
///
/// 手动添加的声明（[`SprigApplication::declare`]）总是追加在后面
pub struct SprigApplication {
    /// 应用名称
    name: String,

    /// 清单文件路径
    manifest_path: PathBuf,

    /// 日志配置（未设置时从环境变量读取）
    logging_config: Option<LoggingConfig>,

    /// 是否初始化全局日志订阅者
    init_logging: bool,

    /// 启动前静态校验依赖图
    validate_dependencies: bool,

    /// 手动声明
    declarations: Vec<ComponentDeclaration>,
}

impl SprigApplication {
    /// 创建新的应用
    pub fn new(name: impl Into<String>) -> Self {
        let manifest_path = std::env::var(MANIFEST_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MANIFEST_FILE));

        Self {
            name: name.into(),
            manifest_path,
            logging_config: None,
            init_logging: true,
            validate_dependencies: true,
            declarations: Vec::new(),
        }
    }

    /// 设置清单文件路径
    pub fn manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// 在指定目录下查找默认清单文件，而不是当前工作目录
    ///
    /// 设置了 `SPRIG_MANIFEST` 环境变量时以环境变量为准
    pub fn manifest_dir(mut self, dir: impl AsRef<Path>) -> Self {
        if std::env::var_os(MANIFEST_PATH_ENV).is_none() {
            self.manifest_path = dir.as_ref().join(DEFAULT_MANIFEST_FILE);
        }
        self
    }

    /// 设置日志配置
    ///
    /// 如果不设置，将使用默认配置（从环境变量读取）
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 是否由应用初始化全局日志订阅者（默认：true）
    pub fn init_logging(mut self, init: bool) -> Self {
        self.init_logging = init;
        self
    }

    /// 是否在启动前校验依赖图（默认：true）
    pub fn validate_dependencies(mut self, validate: bool) -> Self {
        self.validate_dependencies = validate;
        self
    }

    /// 追加一个手动声明
    pub fn declare(mut self, declaration: ComponentDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// 运行应用
    pub fn run(self) -> ApplicationResult<Arc<ApplicationContext>> {
        let start_time = std::time::Instant::now();

        let manifest = if self.manifest_path.exists() {
            Some(ComponentManifest::from_file(&self.manifest_path)?)
        } else {
            None
        };

        if self.init_logging {
            let base = self
                .logging_config
                .clone()
                .unwrap_or_else(LoggingConfig::from_env);
            let config = match &manifest {
                Some(manifest) => manifest.apply_logging(base),
                None => base,
            };
            config.init()?;
        }

        tracing::info!("Starting {} application", self.name);

        let mut builder = ApplicationContext::builder();

        match &manifest {
            Some(manifest) => {
                tracing::info!(
                    "Declaring components from manifest: {}",
                    self.manifest_path.display()
                );
                builder = builder.declare_all(manifest.declarations()?);
            }
            None => {
                tracing::debug!(
                    "Manifest file not found: {}, scanning registered components",
                    self.manifest_path.display()
                );
                builder = builder.scan_components();
            }
        }

        let context = builder
            .declare_all(self.declarations)
            .validate_dependencies(self.validate_dependencies)
            .build()?;

        tracing::info!(
            "Started {} in {}ms",
            self.name,
            start_time.elapsed().as_millis()
        );

        Ok(context)
    }
}

impl Default for SprigApplication {
    fn default() -> Self {
        Self::new("SprigApplication")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Component;
    use crate::ApplicationError;

    #[derive(Default)]
    struct Standalone;
    impl Component for Standalone {}

    #[test]
    fn test_run_with_manual_declarations() {
        let context = SprigApplication::new("test")
            .manifest("/definitely/not/here/sprig.toml")
            .init_logging(false)
            .declare(ComponentDeclaration::of::<Standalone>("standaloneBean"))
            .run()
            .unwrap();

        assert!(context.contains_bean("standaloneBean"));
        assert!(context.get_bean_as::<Standalone>("standaloneBean").is_ok());
    }

    #[test]
    fn test_container_errors_are_wrapped() {
        let result = SprigApplication::new("test")
            .manifest("/definitely/not/here/sprig.toml")
            .init_logging(false)
            .declare(ComponentDeclaration::of::<Standalone>("dup"))
            .declare(ComponentDeclaration::of::<Standalone>("dup"))
            .run();

        assert!(matches!(result, Err(ApplicationError::Container(_))));
    }

    /// 清单目录与工作目录无关
    #[test]
    fn test_manifest_dir_uses_default_file_name() {
        if std::env::var_os(MANIFEST_PATH_ENV).is_some() {
            return;
        }
        let app = SprigApplication::new("test").manifest_dir("/srv/orders");
        assert_eq!(app.manifest_path, Path::new("/srv/orders").join(DEFAULT_MANIFEST_FILE));
    }
}

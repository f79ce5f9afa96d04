//! TOML 组件清单
//!
//! 第三种声明来源：用配置文件列出组件，按类型名引用
//! `#[derive(Component)]` 注册过的实现。
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [[components]]
//! name = "userService"
//! type = "UserServiceImpl"
//! scope = "prototype"
//!
//! [components.dependencies]
//! order_service = "orderService"
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::component::find_registration;
use crate::declaration::ComponentDeclaration;
use crate::error::{ApplicationError, ApplicationResult};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::Scope;

/// 组件清单
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentManifest {
    #[serde(default)]
    pub logging: Option<LoggingSection>,

    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

/// `[logging]` 表
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
    pub filter: Option<String>,
}

/// `[[components]]` 条目
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    /// Bean 名称，缺省时使用类型注册的默认名称
    pub name: Option<String>,

    /// 实现类型（结构体名）
    #[serde(rename = "type")]
    pub type_name: String,

    pub scope: Option<Scope>,

    /// 字段 -> 目标 Bean，覆盖或补充类型自身声明的依赖
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

impl ComponentManifest {
    /// 读取清单文件
    pub fn from_file(path: impl AsRef<Path>) -> ApplicationResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ApplicationError::ConfigLoad {
                path: path.display().to_string(),
                source,
            })?;

        let manifest: Self = content.parse()?;
        tracing::info!(
            "Loaded component manifest from: {} ({} component(s))",
            path.display(),
            manifest.components.len()
        );
        Ok(manifest)
    }

    /// 将条目解析为组件声明（按清单顺序）
    pub fn declarations(&self) -> ApplicationResult<Vec<ComponentDeclaration>> {
        self.components.iter().map(ComponentEntry::declaration).collect()
    }

    /// 在给定配置上应用 `[logging]` 表
    pub fn apply_logging(&self, mut config: LoggingConfig) -> LoggingConfig {
        if let Some(logging) = &self.logging {
            if let Some(level) = logging.level {
                config.level = level;
            }
            if let Some(format) = logging.format {
                config.format = format;
            }
            if let Some(filter) = &logging.filter {
                config.filter = Some(filter.clone());
            }
        }
        config
    }
}

impl FromStr for ComponentManifest {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl ComponentEntry {
    fn declaration(&self) -> ApplicationResult<ComponentDeclaration> {
        let registration = find_registration(&self.type_name).ok_or_else(|| {
            ApplicationError::UnknownComponentType {
                component: self.name.clone().unwrap_or_default(),
                type_name: self.type_name.clone(),
            }
        })?;

        let mut declaration = (registration.declare)();

        if let Some(name) = &self.name {
            declaration = declaration.with_name(name.clone());
        }

        if let Some(scope) = self.scope {
            declaration = declaration.with_scope(scope);
        }

        for (field, target) in &self.dependencies {
            declaration = declaration.with_dependency(field.clone(), target.clone());
        }

        tracing::debug!(
            "Manifest component '{}' resolved to type '{}'",
            declaration.name(),
            declaration.type_name()
        );
        Ok(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Component;
    use crate::component::ComponentRegistration;
    use crate::declaration::Dependency;

    #[derive(Default)]
    struct ManifestRepo;
    impl Component for ManifestRepo {}

    fn declare_repo() -> ComponentDeclaration {
        ComponentDeclaration::of::<ManifestRepo>("manifestRepo")
    }

    inventory::submit! {
        ComponentRegistration::new("manifestRepo", "ManifestRepo", declare_repo)
    }

    #[test]
    fn test_parse_manifest() {
        let manifest: ComponentManifest = r#"
            [logging]
            level = "debug"
            format = "json"

            [[components]]
            name = "primaryRepo"
            type = "ManifestRepo"
            scope = "prototype"

            [components.dependencies]
            clock = "systemClock"
            cache = "cache"

            [[components]]
            type = "ManifestRepo"
        "#
        .parse()
        .unwrap();

        assert_eq!(manifest.components.len(), 2);

        let declarations = manifest.declarations().unwrap();
        assert_eq!(declarations[0].name(), "primaryRepo");
        assert_eq!(declarations[0].scope(), Scope::Prototype);
        assert_eq!(
            declarations[0].dependencies(),
            &[Dependency::new("clock", "systemClock"), Dependency::new("cache", "cache")]
        );
        assert_eq!(declarations[1].name(), "manifestRepo");
        assert_eq!(declarations[1].scope(), Scope::Singleton);

        let logging = manifest.apply_logging(LoggingConfig::default());
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_type() {
        let manifest: ComponentManifest = r#"
            [[components]]
            name = "ghost"
            type = "DoesNotExist"
        "#
        .parse()
        .unwrap();

        match manifest.declarations() {
            Err(ApplicationError::UnknownComponentType { component, type_name }) => {
                assert_eq!(component, "ghost");
                assert_eq!(type_name, "DoesNotExist");
            }
            other => panic!("Expected UnknownComponentType, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_scope_is_a_parse_error() {
        let result = r#"
            [[components]]
            type = "ManifestRepo"
            scope = "session"
        "#
        .parse::<ComponentManifest>();

        assert!(matches!(result, Err(ApplicationError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ComponentManifest::from_file("/definitely/not/here/sprig.toml");
        assert!(matches!(result, Err(ApplicationError::ConfigLoad { .. })));
    }
}

//! Bean 定义注册表

use indexmap::IndexMap;
use std::fmt;

use crate::capability::{Capability, CapabilitySet};
use crate::declaration::{ComponentDeclaration, ComponentFactory, Dependency};
use crate::error::{ContainerError, ContainerResult};
use crate::utils::dependency::{validate_dependency_graph, DependencyValidationError};
use crate::Scope;

/// Bean 定义 - 描述如何创建和管理 Bean
///
/// 注册后不再修改
pub struct BeanDefinition {
    /// Bean 的名称
    pub name: String,

    /// 实现类型名称
    pub type_name: &'static str,

    /// Bean 的作用域
    pub scope: Scope,

    /// 分配函数
    pub factory: ComponentFactory,

    /// 字段依赖，按声明顺序注入
    pub dependencies: Vec<Dependency>,

    /// 声明的生命周期能力
    pub capabilities: CapabilitySet,
}

impl BeanDefinition {
    pub fn is_post_processor(&self) -> bool {
        self.capabilities.contains(Capability::PostProcessor)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

impl From<ComponentDeclaration> for BeanDefinition {
    fn from(declaration: ComponentDeclaration) -> Self {
        Self {
            scope: declaration.scope(),
            name: declaration.name,
            type_name: declaration.type_name,
            factory: declaration.factory,
            dependencies: declaration.dependencies,
            capabilities: declaration.capabilities,
        }
    }
}

impl fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("scope", &self.scope)
            .field("dependencies", &self.dependencies)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// 名称到定义的映射，保持声明顺序
///
/// 启动时一次性构建，之后只读，因此并发查找无需加锁
#[derive(Debug, Default)]
pub struct BeanDefinitionRegistry {
    definitions: IndexMap<String, BeanDefinition>,
}

impl BeanDefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 Bean 定义，同名定义已存在时失败
    pub fn register(&mut self, definition: BeanDefinition) -> ContainerResult<()> {
        tracing::trace!(
            "Attempting to register bean: name='{}', type='{}', scope={}",
            definition.name,
            definition.type_name,
            definition.scope
        );

        if definition.name.is_empty() {
            return Err(ContainerError::InvalidDefinition {
                name: definition.name,
                reason: format!("empty bean name for type '{}'", definition.type_name),
            });
        }

        if self.definitions.contains_key(&definition.name) {
            tracing::warn!("Bean '{}' already exists, registration failed", definition.name);
            return Err(ContainerError::DuplicateBeanName(definition.name));
        }

        tracing::debug!("Bean definition registered successfully: '{}'", definition.name);
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> ContainerResult<&BeanDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| ContainerError::not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// 所有 Bean 名称（声明顺序）
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.definitions.keys().map(String::as_str)
    }

    /// 后置处理器的名称（声明顺序）
    pub fn post_processor_names(&self) -> Vec<String> {
        self.definitions
            .values()
            .filter(|def| def.is_post_processor())
            .map(|def| def.name.clone())
            .collect()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &BeanDefinition> + '_ {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// 静态校验声明的依赖图：缺失的目标和循环
    pub fn validate_dependencies(&self) -> ContainerResult<()> {
        let graph: IndexMap<String, Vec<String>> = self
            .definitions
            .iter()
            .map(|(name, def)| {
                (
                    name.clone(),
                    def.dependencies.iter().map(|d| d.target.clone()).collect(),
                )
            })
            .collect();

        validate_dependency_graph(&graph).map_err(|e| {
            tracing::error!("Dependency validation failed: {}", e);
            match e {
                DependencyValidationError::MissingDependency { bean, missing } => {
                    ContainerError::BeanNotFound {
                        name: missing,
                        required_by: Some(bean),
                    }
                }
                DependencyValidationError::CircularDependency { cycle } => {
                    ContainerError::CircularDependency { chain: cycle }
                }
            }
        })
    }
}

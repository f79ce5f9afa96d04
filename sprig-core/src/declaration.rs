//! 组件声明 - 容器的输入
//!
//! 所有声明来源（手动注册、`#[derive(Component)]` 扫描、TOML 清单）
//! 最终都产出 `ComponentDeclaration`。

use std::fmt;
use std::sync::Arc;

use crate::bean::Component;
use crate::capability::{Capability, CapabilitySet};
use crate::utils::naming;
use crate::Scope;

/// 实例分配函数
pub type ComponentFactory =
    Arc<dyn Fn() -> anyhow::Result<Box<dyn Component>> + Send + Sync>;

/// 依赖边：把名为 `target` 的 Bean 注入字段 `field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub field: String,
    pub target: String,
}

impl Dependency {
    pub fn new(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
        }
    }
}

/// 组件声明
#[derive(Clone)]
pub struct ComponentDeclaration {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) factory: ComponentFactory,
    pub(crate) scope: Option<Scope>,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) capabilities: CapabilitySet,
}

impl ComponentDeclaration {
    /// 以 `T::default()` 作为分配方式声明组件
    pub fn of<T: Component + Default>(name: impl Into<String>) -> Self {
        Self::from_factory::<T, _>(name, || Ok(T::default()))
    }

    /// 以类型名的 camelCase 形式作为 Bean 名称
    pub fn of_type<T: Component + Default>() -> Self {
        Self::of::<T>(naming::default_bean_name::<T>())
    }

    /// 使用自定义工厂声明组件；工厂错误会作为 `Instantiation` 报告
    pub fn from_factory<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Component,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            type_name: std::any::type_name::<T>(),
            factory: Arc::new(move || Ok(Box::new(factory()?) as Box<dyn Component>)),
            scope: None,
            dependencies: Vec::new(),
            capabilities: CapabilitySet::empty(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 声明一条依赖；同一字段重复声明时以最后一次为准
    pub fn with_dependency(mut self, field: impl Into<String>, target: impl Into<String>) -> Self {
        let dependency = Dependency::new(field, target);
        match self
            .dependencies
            .iter_mut()
            .find(|d| d.field == dependency.field)
        {
            Some(existing) => existing.target = dependency.target,
            None => self.dependencies.push(dependency),
        }
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        for capability in capabilities.iter() {
            self.capabilities.insert(capability);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 未指定时为单例
    pub fn scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }
}

impl fmt::Debug for ComponentDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDeclaration")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("scope", &self.scope())
            .field("dependencies", &self.dependencies)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// 能够描述自身声明的组件类型，通常由 `#[derive(Component)]` 实现
pub trait Declare: Component + Sized {
    fn declaration() -> ComponentDeclaration;
}

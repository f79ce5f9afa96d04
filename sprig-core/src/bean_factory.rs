//! Bean Factory - 核心容器接口
//!
//! 负责按定义创建 Bean、驱动生命周期并缓存单例

use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    bean::{Bean, Component},
    capability::Capability,
    error::{ContainerError, ContainerResult},
    lifecycle::BeanPostProcessor,
    registry::{BeanDefinition, BeanDefinitionRegistry},
    singleton::SingletonCache,
    utils::dependency::CreationStack,
    Scope,
};

/// BeanFactory - 最基础的容器接口
///
/// 不包含泛型方法，因此可以作为 trait object 使用
pub trait BeanFactory: Send + Sync {
    /// 通过名称获取 Bean
    fn get_bean(&self, name: &str) -> ContainerResult<Bean>;

    /// 检查是否包含指定名称的 Bean
    fn contains_bean(&self, name: &str) -> bool;
}

/// ListableBeanFactory - 可列举的 Bean 工厂
pub trait ListableBeanFactory: BeanFactory {
    /// 获取所有 Bean 的名称（声明顺序）
    fn get_bean_names(&self) -> Vec<String>;

    /// 获取 Bean 定义的数量
    fn get_bean_definition_count(&self) -> usize;
}

/// 默认的 Bean 工厂实现
pub struct DefaultBeanFactory {
    /// Bean 定义存储，构建完成后只读
    registry: BeanDefinitionRegistry,

    /// 单例 Bean 缓存
    singletons: SingletonCache,

    /// Bean 后置处理器列表（按声明顺序）
    post_processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,
}

impl DefaultBeanFactory {
    pub fn new(registry: BeanDefinitionRegistry) -> Self {
        Self {
            registry,
            singletons: SingletonCache::new(),
            post_processors: RwLock::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &BeanDefinitionRegistry {
        &self.registry
    }

    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    pub fn post_processor_count(&self) -> usize {
        self.post_processors.read().len()
    }

    /// 追加一个后置处理器，对之后创建的 Bean 生效
    pub fn add_post_processor(&self, processor: Arc<dyn BeanPostProcessor>) {
        tracing::debug!("Registering bean post processor '{}'", processor.name());
        self.post_processors.write().push(processor);
    }

    /// 实例化所有后置处理器并按声明顺序加入处理链
    ///
    /// 处理器本身不经过任何处理器。处理器只能依赖其他处理器：
    /// 否则被依赖的 Bean 会在处理链就绪前创建并缓存，永远不被处理
    pub fn register_post_processors(&self) -> ContainerResult<()> {
        let names = self.registry.post_processor_names();
        tracing::debug!("Instantiating {} bean post processor(s)", names.len());

        for name in &names {
            let definition = self.registry.lookup(name)?;
            for dependency in &definition.dependencies {
                let Ok(target) = self.registry.lookup(&dependency.target) else {
                    // 缺失的目标留给解析阶段报告 BeanNotFound
                    continue;
                };
                if !target.is_post_processor() {
                    return Err(ContainerError::InvalidDefinition {
                        name: name.clone(),
                        reason: format!(
                            "post-processor depends on '{}' which is not a post-processor; \
                             it would be created before the processor chain is ready",
                            dependency.target
                        ),
                    });
                }
            }
        }

        for name in names {
            let definition = self.registry.lookup(&name)?;
            if definition.scope != Scope::Singleton {
                return Err(ContainerError::InvalidDefinition {
                    name,
                    reason: format!(
                        "post-processors must be singleton-scoped, found '{}'",
                        definition.scope
                    ),
                });
            }

            let bean = self.resolve(&name, &mut CreationStack::new())?;
            let processor = bean.get::<dyn BeanPostProcessor>().ok_or_else(|| {
                ContainerError::InvalidDefinition {
                    name: name.clone(),
                    reason: format!(
                        "type '{}' is declared as a post-processor but does not expose BeanPostProcessor",
                        bean.type_name()
                    ),
                }
            })?;
            self.add_post_processor(processor);
        }

        Ok(())
    }

    /// 按声明顺序预实例化所有单例
    pub fn preinstantiate_singletons(&self) -> ContainerResult<()> {
        let names: Vec<String> = self
            .registry
            .definitions()
            .filter(|def| def.scope == Scope::Singleton && !def.is_post_processor())
            .map(|def| def.name.clone())
            .collect();

        tracing::debug!("Pre-instantiating {} singleton beans", names.len());

        for name in names {
            self.resolve(&name, &mut CreationStack::new())?;
        }

        Ok(())
    }

    /// 按名称解析 Bean；`stack` 为本次请求中正在创建的 Bean 链
    pub fn resolve(&self, name: &str, stack: &mut CreationStack) -> ContainerResult<Bean> {
        tracing::trace!("Requesting bean: '{}'", name);

        let definition = self.registry.lookup(name)?;

        match definition.scope {
            Scope::Singleton => {
                if let Some(bean) = self.singletons.get(name) {
                    tracing::trace!("Returning cached instance of singleton bean '{}'", name);
                    return Ok(bean);
                }

                tracing::debug!("Creating shared instance of singleton bean '{}'", name);
                let bean = self.create_bean(definition, stack)?;
                Ok(self.singletons.insert_if_absent(bean))
            }
            Scope::Prototype => {
                tracing::debug!("Creating new instance of prototype bean '{}'", name);
                self.create_bean(definition, stack)
            }
        }
    }

    /// 创建 Bean 实例并调用生命周期回调
    ///
    /// # 生命周期顺序
    /// 1. 实例化
    /// 2. 依赖注入
    /// 3. BeanNameAware.set_bean_name
    /// 4. BeanPostProcessor.before_initialization
    /// 5. InitializingBean.after_properties_set
    /// 6. BeanPostProcessor.after_initialization
    fn create_bean(
        &self,
        definition: &BeanDefinition,
        stack: &mut CreationStack,
    ) -> ContainerResult<Bean> {
        let name = definition.name.as_str();

        stack
            .enter(name)
            .map_err(|chain| ContainerError::CircularDependency { chain })?;

        let result = self.run_lifecycle(definition, stack);
        stack.leave(name);

        match &result {
            Ok(bean) => tracing::debug!("Bean '{}' created as '{}'", name, bean.type_name()),
            Err(e) => tracing::debug!("Creation of bean '{}' failed: {}", name, e),
        }
        result
    }

    fn run_lifecycle(
        &self,
        definition: &BeanDefinition,
        stack: &mut CreationStack,
    ) -> ContainerResult<Bean> {
        let name = definition.name.as_str();

        // 1. 实例化
        let mut instance =
            (definition.factory)().map_err(|source| ContainerError::Instantiation {
                name: name.to_string(),
                source,
            })?;

        // 2. 依赖注入
        for dependency in &definition.dependencies {
            tracing::trace!(
                "Injecting '{}' into field '{}' of bean '{}'",
                dependency.target,
                dependency.field,
                name
            );

            let target = self.resolve(&dependency.target, stack).map_err(|e| match e {
                ContainerError::BeanNotFound {
                    name: missing,
                    required_by: None,
                } => ContainerError::BeanNotFound {
                    name: missing,
                    required_by: Some(name.to_string()),
                },
                other => other,
            })?;

            instance
                .inject(&dependency.field, &target)
                .map_err(|source| ContainerError::Injection {
                    name: name.to_string(),
                    field: dependency.field.clone(),
                    target: dependency.target.clone(),
                    source,
                })?;
        }

        // 3. Aware 回调
        if definition.has_capability(Capability::NameAware) {
            match instance.as_bean_name_aware() {
                Some(aware) => aware.set_bean_name(name),
                None => tracing::warn!(
                    "Bean '{}' is declared NameAware but '{}' does not implement BeanNameAware, skipping",
                    name,
                    definition.type_name
                ),
            }
        }

        let processors = if definition.is_post_processor() {
            Vec::new()
        } else {
            self.post_processors.read().clone()
        };

        // 4. 初始化前处理
        instance = Self::apply_post_processors(&processors, instance, name, |p, bean, name| {
            p.before_initialization(bean, name)
        })?;

        // 5. 初始化回调
        if definition.has_capability(Capability::InitializingBean) {
            match instance.as_initializing_bean() {
                Some(initializing) => {
                    tracing::debug!("Invoking after_properties_set on bean '{}'", name);
                    initializing.after_properties_set().map_err(|source| {
                        ContainerError::Initialization {
                            name: name.to_string(),
                            source,
                        }
                    })?;
                }
                None => tracing::warn!(
                    "Bean '{}' is declared InitializingBean but '{}' does not implement it, skipping",
                    name,
                    definition.type_name
                ),
            }
        }

        // 6. 初始化后处理（代理替换点）
        instance = Self::apply_post_processors(&processors, instance, name, |p, bean, name| {
            p.after_initialization(bean, name)
        })?;

        Ok(Bean::new(name, instance))
    }

    fn apply_post_processors<F>(
        processors: &[Arc<dyn BeanPostProcessor>],
        bean: Box<dyn Component>,
        bean_name: &str,
        hook: F,
    ) -> ContainerResult<Box<dyn Component>>
    where
        F: Fn(&dyn BeanPostProcessor, Box<dyn Component>, &str) -> anyhow::Result<Box<dyn Component>>,
    {
        let mut current = bean;
        for processor in processors {
            current = hook(&**processor, current, bean_name).map_err(|source| {
                ContainerError::PostProcessing {
                    processor: processor.name().to_string(),
                    name: bean_name.to_string(),
                    source,
                }
            })?;
        }
        Ok(current)
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> ContainerResult<Bean> {
        self.resolve(name, &mut CreationStack::new())
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}

impl ListableBeanFactory for DefaultBeanFactory {
    fn get_bean_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.registry.len()
    }
}

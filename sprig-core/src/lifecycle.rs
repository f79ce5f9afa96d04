//! 生命周期回调与 Bean 后置处理器
//!
//! 创建顺序：
//! 1. 实例化
//! 2. 依赖注入
//! 3. `BeanNameAware::set_bean_name`
//! 4. `BeanPostProcessor::before_initialization`
//! 5. `InitializingBean::after_properties_set`
//! 6. `BeanPostProcessor::after_initialization`

use crate::bean::Component;

/// 感知自身 Bean 名称
pub trait BeanNameAware {
    fn set_bean_name(&mut self, name: &str);
}

/// 属性注入完成后的初始化回调
///
/// 返回错误会中止该 Bean 的创建，不会重试
pub trait InitializingBean {
    fn after_properties_set(&mut self) -> anyhow::Result<()>;
}

/// BeanPostProcessor trait
///
/// 在每个受管 Bean 初始化前后调用。处理器自身也是 Bean，
/// 但不会被任何处理器（包括自己）处理。
///
/// 处理器必须是单例，且只能依赖其他处理器；依赖普通 Bean 会在启动时
/// 以 `ContainerError::InvalidDefinition` 拒绝。
///
/// # 示例
///
/// ```ignore
/// impl BeanPostProcessor for RenamingPostProcessor {
///     fn before_initialization(
///         &self,
///         mut bean: Box<dyn Component>,
///         bean_name: &str,
///     ) -> anyhow::Result<Box<dyn Component>> {
///         if bean_name == "userService" {
///             if let Some(service) = bean.downcast_mut::<UserServiceImpl>() {
///                 service.name = "X".to_string();
///             }
///         }
///         Ok(bean)
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// 在初始化回调之前调用，可以修改、包装或整体替换实例
    fn before_initialization(
        &self,
        bean: Box<dyn Component>,
        _bean_name: &str,
    ) -> anyhow::Result<Box<dyn Component>> {
        Ok(bean)
    }

    /// 在初始化回调之后调用，典型用途是返回代理
    fn after_initialization(
        &self,
        bean: Box<dyn Component>,
        _bean_name: &str,
    ) -> anyhow::Result<Box<dyn Component>> {
        Ok(bean)
    }

    /// 处理器名称（用于日志和错误信息）
    fn name(&self) -> &str {
        "BeanPostProcessor"
    }
}

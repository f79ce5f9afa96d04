//! 自动代理 BeanPostProcessor
//!
//! 在 Bean 初始化后，为指定名称的 Bean 包装代理

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use sprig_core::prelude::*;

use crate::{InvocationHandler, Proxy, ProxyFactory};

/// 将 `Proxy<I>` 包装为实现 `I` 的装饰类型
pub type ProxyWrapper<I> = fn(Proxy<I>) -> Box<dyn Component>;

/// 自动代理 BeanPostProcessor
///
/// 只处理显式列出的 Bean 名称：列出的 Bean 的所有 `I` 方法都被拦截，
/// 其余 Bean 原样返回。
///
/// ## 使用示例
///
/// ```ignore
/// let processor = AutoProxyPostProcessor::<dyn UserService>::new(
///     Arc::new(LoggingHandler::new()),
///     UserServiceProxy::boxed,
/// )
/// .proxy_bean("userService");
///
/// ApplicationContext::builder()
///     .declare(processor.declaration("autoProxyPostProcessor"))
///     .build()?;
/// ```
pub struct AutoProxyPostProcessor<I: ?Sized + 'static> {
    bean_names: BTreeSet<String>,
    factory: ProxyFactory,
    wrap: ProxyWrapper<I>,
}

impl<I: ?Sized + 'static> AutoProxyPostProcessor<I> {
    pub fn new(handler: Arc<dyn InvocationHandler>, wrap: ProxyWrapper<I>) -> Self {
        Self {
            bean_names: BTreeSet::new(),
            factory: ProxyFactory::with_handler(handler),
            wrap,
        }
    }

    /// 代理指定名称的 Bean
    pub fn proxy_bean(mut self, bean_name: impl Into<String>) -> Self {
        self.bean_names.insert(bean_name.into());
        self
    }

    pub fn should_proxy(&self, bean_name: &str) -> bool {
        self.bean_names.contains(bean_name)
    }

    /// 作为单例后置处理器声明
    pub fn declaration(self, bean_name: impl Into<String>) -> ComponentDeclaration {
        ComponentDeclaration::from_factory::<Self, _>(bean_name, move || Ok(self.clone()))
            .with_capability(Capability::PostProcessor)
    }
}

impl<I: ?Sized + 'static> Clone for AutoProxyPostProcessor<I> {
    fn clone(&self) -> Self {
        Self {
            bean_names: self.bean_names.clone(),
            factory: self.factory.clone(),
            wrap: self.wrap,
        }
    }
}

impl<I: ?Sized + 'static> fmt::Debug for AutoProxyPostProcessor<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoProxyPostProcessor")
            .field("interface", &std::any::type_name::<I>())
            .field("bean_names", &self.bean_names)
            .field("factory", &self.factory)
            .finish()
    }
}

impl<I: ?Sized + 'static> BeanPostProcessor for AutoProxyPostProcessor<I> {
    fn name(&self) -> &str {
        "AutoProxyPostProcessor"
    }

    fn after_initialization(
        &self,
        bean: Box<dyn Component>,
        bean_name: &str,
    ) -> anyhow::Result<Box<dyn Component>> {
        if !self.should_proxy(bean_name) {
            tracing::trace!("Bean '{}' is not listed for proxying, skipping", bean_name);
            return Ok(bean);
        }

        let proxy = self.factory.create::<I>(bean, bean_name)?;
        tracing::info!(
            "🔷 [AutoProxy] Bean '{}' wrapped with '{}' proxy",
            bean_name,
            std::any::type_name::<I>()
        );
        Ok((self.wrap)(proxy))
    }
}

impl<I: ?Sized + 'static> Component for AutoProxyPostProcessor<I> {
    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities::of(Arc::clone(&self)).with::<dyn BeanPostProcessor>(self as Arc<dyn BeanPostProcessor>)
    }
}

//! 代理与代理工厂
//!
//! Rust 没有运行时动态代理。代理由两部分组成：
//! - [`Proxy<dyn I>`]：持有目标的 `dyn I` 视图和调用处理器，负责转发调用
//! - 针对接口的装饰类型：实现 `I`，每个方法都经由 `Proxy::invoke` 转发，
//!   通常用 [`proxy!`](crate::proxy) 生成

use std::fmt;
use std::sync::Arc;

use sprig_core::{Bean, Component};

use crate::error::{ProxyError, ProxyResult};
use crate::{ErrorInfo, InvocationHandler, JoinPoint};

/// 对 `I` 视图的拦截转发
pub struct Proxy<I: ?Sized> {
    target: Arc<I>,
    target_type: &'static str,
    bean_name: String,
    handler: Arc<dyn InvocationHandler>,
}

impl<I: ?Sized> Proxy<I> {
    pub fn new(
        target: Arc<I>,
        target_type: &'static str,
        bean_name: impl Into<String>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Self {
        Self {
            target,
            target_type,
            bean_name: bean_name.into(),
            handler,
        }
    }

    /// 先执行处理器的前置通知，再调用原方法，结果原样返回
    pub fn invoke<R>(&self, method: &'static str, call: impl FnOnce(&I) -> R) -> R {
        let join_point = self.join_point(method);
        self.handler.before(&join_point);
        let result = call(&*self.target);
        self.handler.after_returning(&join_point);
        result
    }

    /// 与 `invoke` 相同，但出错时额外触发 `after_throwing`；错误本身原样返回
    pub fn invoke_fallible<R, E>(
        &self,
        method: &'static str,
        call: impl FnOnce(&I) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: fmt::Display,
    {
        let join_point = self.join_point(method);
        self.handler.before(&join_point);
        let result = call(&*self.target);
        match &result {
            Ok(_) => self.handler.after_returning(&join_point),
            Err(error) => self
                .handler
                .after_throwing(&join_point, &ErrorInfo::from_display(error)),
        }
        result
    }

    /// 被代理的原始视图
    pub fn target(&self) -> &Arc<I> {
        &self.target
    }

    pub fn target_type(&self) -> &'static str {
        self.target_type
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    fn join_point(&self, method: &'static str) -> JoinPoint {
        JoinPoint::new(self.target_type, self.bean_name.as_str(), method)
    }
}

impl<I: ?Sized> Clone for Proxy<I> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            target_type: self.target_type,
            bean_name: self.bean_name.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<I: ?Sized> fmt::Debug for Proxy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("interface", &std::any::type_name::<I>())
            .field("target_type", &self.target_type)
            .field("bean_name", &self.bean_name)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// 代理工厂
///
/// ```ignore
/// let factory = ProxyFactory::new(LoggingHandler::new());
/// let proxy = factory.create::<dyn UserService>(bean, "userService")?;
/// Ok(UserServiceProxy::boxed(proxy))
/// ```
#[derive(Clone)]
pub struct ProxyFactory {
    handler: Arc<dyn InvocationHandler>,
}

impl ProxyFactory {
    pub fn new(handler: impl InvocationHandler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn with_handler(handler: Arc<dyn InvocationHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn InvocationHandler> {
        &self.handler
    }

    /// 冻结后置处理器拿到的实例，并为其 `I` 视图创建代理
    pub fn create<I: ?Sized + 'static>(
        &self,
        target: Box<dyn Component>,
        bean_name: &str,
    ) -> ProxyResult<Proxy<I>> {
        self.create_from_bean(&Bean::new(bean_name, target))
    }

    /// 为已完成创建的 Bean 的 `I` 视图创建代理
    pub fn create_from_bean<I: ?Sized + 'static>(&self, bean: &Bean) -> ProxyResult<Proxy<I>> {
        let target = bean
            .get::<I>()
            .ok_or_else(|| ProxyError::InterfaceNotExposed {
                bean: bean.name().to_string(),
                type_name: bean.type_name(),
                interface: std::any::type_name::<I>(),
            })?;

        tracing::debug!(
            "Creating proxy for bean '{}' as '{}' with handler '{}'",
            bean.name(),
            std::any::type_name::<I>(),
            self.handler.name()
        );

        Ok(Proxy::new(
            target,
            bean.type_name(),
            bean.name(),
            Arc::clone(&self.handler),
        ))
    }
}

impl fmt::Debug for ProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyFactory")
            .field("handler", &self.handler.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::before_fn;
    use parking_lot::Mutex;
    use sprig_core::Capabilities;

    trait Greeter: Send + Sync {
        fn greet(&self, who: &str) -> String;
        fn check(&self) -> anyhow::Result<u32>;
    }

    #[derive(Default)]
    struct English {
        fail: bool,
    }

    impl Greeter for English {
        fn greet(&self, who: &str) -> String {
            format!("hello {}", who)
        }

        fn check(&self) -> anyhow::Result<u32> {
            if self.fail {
                anyhow::bail!("check failed")
            }
            Ok(7)
        }
    }

    impl Component for English {
        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::of(Arc::clone(&self)).with::<dyn Greeter>(self as Arc<dyn Greeter>)
        }
    }

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl InvocationHandler for Recording {
        fn before(&self, join_point: &JoinPoint) {
            self.events.lock().push(format!("before {}", join_point.method_name));
        }

        fn after_returning(&self, join_point: &JoinPoint) {
            self.events.lock().push(format!("returned {}", join_point.method_name));
        }

        fn after_throwing(&self, join_point: &JoinPoint, error: &ErrorInfo) {
            self.events
                .lock()
                .push(format!("threw {}: {}", join_point.method_name, error));
        }
    }

    #[test]
    fn test_invoke_runs_handler_first_and_returns_original_result() {
        let recording = Arc::new(Recording::default());
        let factory = ProxyFactory::with_handler(recording.clone());

        let proxy = factory
            .create::<dyn Greeter>(Box::new(English::default()), "greeter")
            .unwrap();

        let greeting = proxy.invoke("greet", |target| {
            recording.events.lock().push("target greet".to_string());
            target.greet("world")
        });

        assert_eq!(greeting, "hello world");
        assert_eq!(
            *recording.events.lock(),
            vec!["before greet", "target greet", "returned greet"]
        );
        assert_eq!(proxy.bean_name(), "greeter");
        assert!(proxy.target_type().ends_with("English"));
    }

    #[test]
    fn test_invoke_fallible_propagates_errors_unchanged() {
        let recording = Arc::new(Recording::default());
        let factory = ProxyFactory::with_handler(recording.clone());

        let ok = factory
            .create::<dyn Greeter>(Box::new(English { fail: false }), "ok")
            .unwrap();
        assert_eq!(ok.invoke_fallible("check", |t| t.check()).unwrap(), 7);

        let failing = factory
            .create::<dyn Greeter>(Box::new(English { fail: true }), "failing")
            .unwrap();
        let error = failing.invoke_fallible("check", |t| t.check()).unwrap_err();
        assert_eq!(error.to_string(), "check failed");

        assert_eq!(
            *recording.events.lock(),
            vec![
                "before check",
                "returned check",
                "before check",
                "threw check: check failed"
            ]
        );
    }

    #[test]
    fn test_create_requires_exposed_interface() {
        #[derive(Default)]
        struct Plain;
        impl Component for Plain {}

        let factory = ProxyFactory::new(before_fn("noop", |_| {}));
        let result = factory.create::<dyn Greeter>(Box::new(Plain), "plain");

        match result {
            Err(ProxyError::InterfaceNotExposed { bean, interface, .. }) => {
                assert_eq!(bean, "plain");
                assert!(interface.contains("Greeter"));
            }
            Ok(_) => panic!("Expected InterfaceNotExposed"),
        }
    }

    #[test]
    fn test_create_from_bean_shares_target() {
        let bean = Bean::new("greeter", Box::new(English::default()));
        let factory = ProxyFactory::new(before_fn("noop", |_| {}));

        let proxy = factory.create_from_bean::<dyn Greeter>(&bean).unwrap();
        let original = bean.get::<dyn Greeter>().unwrap();

        assert!(Arc::ptr_eq(proxy.target(), &original));
    }
}

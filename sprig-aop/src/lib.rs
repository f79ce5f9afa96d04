//! Sprig AOP - 基于代理的方法拦截
//!
//! 提供：
//! - `InvocationHandler`：在被代理方法之前执行的处理逻辑
//! - `ProxyFactory` / `Proxy`：为 Bean 的某个 trait 视图创建代理
//! - `proxy!`：生成实现该 trait 的装饰类型
//! - `AutoProxyPostProcessor`：在初始化后自动为指定 Bean 换上代理

pub mod bean_post_processor;
pub mod error;
pub mod error_info;
pub mod handler;
pub mod joinpoint;
pub mod proxy;

// 重新导出核心类型
pub use bean_post_processor::{AutoProxyPostProcessor, ProxyWrapper};
pub use error::{ProxyError, ProxyResult};
pub use error_info::ErrorInfo;
pub use handler::{before_fn, BeforeFn, InvocationHandler, LoggingHandler};
pub use joinpoint::JoinPoint;
pub use proxy::{Proxy, ProxyFactory};

// 导出 sprig_core 供宏使用
pub use sprig_core;

/// 预导入模块
pub mod prelude {
    pub use crate::bean_post_processor::AutoProxyPostProcessor;
    pub use crate::error_info::ErrorInfo;
    pub use crate::handler::{before_fn, InvocationHandler, LoggingHandler};
    pub use crate::joinpoint::JoinPoint;
    pub use crate::proxy::{Proxy, ProxyFactory};
    pub use crate::proxy;
}

/// 生成代理装饰类型
///
/// 为 `dyn Trait` 生成一个结构体：它实现该 trait，每个方法都经由
/// [`Proxy::invoke`] 转发给原实例；标记 `#[fallible]` 的方法经由
/// [`Proxy::invoke_fallible`] 转发，出错时处理器还会收到 `after_throwing`。
/// trait 需要以 `Send + Sync` 为父 trait，并在当前作用域内。
///
/// 使用示例：
/// ```ignore
/// use sprig_aop::proxy;
///
/// pub trait UserService: Send + Sync {
///     fn test(&self) -> String;
///     fn rename(&self, name: &str);
///     fn load(&self, id: u32) -> anyhow::Result<String>;
/// }
///
/// proxy! {
///     pub struct UserServiceProxy for dyn UserService {
///         fn test(&self) -> String;
///         fn rename(&self, name: &str);
///         #[fallible]
///         fn load(&self, id: u32) -> anyhow::Result<String>;
///     }
/// }
/// ```
#[macro_export]
macro_rules! proxy {
    (
        $(#[$meta:meta])*
        $vis:vis struct $proxy:ident for dyn $iface:ident {
            $(
                $(#[$kind:ident])?
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)*) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $proxy {
            inner: $crate::Proxy<dyn $iface>,
        }

        #[allow(dead_code)]
        impl $proxy {
            pub fn new(inner: $crate::Proxy<dyn $iface>) -> Self {
                Self { inner }
            }

            /// 作为后置处理器的返回值
            pub fn boxed(
                inner: $crate::Proxy<dyn $iface>,
            ) -> ::std::boxed::Box<dyn $crate::sprig_core::Component> {
                ::std::boxed::Box::new(Self::new(inner))
            }

            pub fn proxy(&self) -> &$crate::Proxy<dyn $iface> {
                &self.inner
            }
        }

        impl $iface for $proxy {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) $(-> $ret)? {
                    $crate::__proxy_call!(
                        $($kind)? ; self.inner, $method, target => target.$method($($arg),*)
                    )
                }
            )*
        }

        impl $crate::sprig_core::Component for $proxy {
            fn capabilities(
                self: ::std::sync::Arc<Self>,
            ) -> $crate::sprig_core::Capabilities {
                $crate::sprig_core::Capabilities::of(::std::sync::Arc::clone(&self))
                    .with::<dyn $iface>(self as ::std::sync::Arc<dyn $iface>)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __proxy_call {
    (fallible ; $inner:expr, $method:ident, $target:ident => $call:expr) => {
        $inner.invoke_fallible(::core::stringify!($method), |$target| $call)
    };
    (; $inner:expr, $method:ident, $target:ident => $call:expr) => {
        $inner.invoke(::core::stringify!($method), |$target| $call)
    };
}

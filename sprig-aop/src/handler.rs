//! 调用处理器（InvocationHandler）
//!
//! 代理在转发每次方法调用前后通知处理器

use crate::{ErrorInfo, JoinPoint};

/// 调用处理器 Trait
///
/// `before` 在原方法之前执行；原方法的返回值和错误都原样交还调用方，
/// 处理器只会收到通知
pub trait InvocationHandler: Send + Sync {
    /// 处理器名称
    fn name(&self) -> &str {
        "InvocationHandler"
    }

    /// 前置通知
    fn before(&self, join_point: &JoinPoint);

    /// 返回后通知（可选实现）
    fn after_returning(&self, _join_point: &JoinPoint) {}

    /// 异常通知（可选实现），只对 `invoke_fallible` 转发的方法触发
    fn after_throwing(&self, _join_point: &JoinPoint, _error: &ErrorInfo) {}
}

/// 用闭包作为前置通知的处理器
pub struct BeforeFn<F> {
    name: &'static str,
    f: F,
}

/// 以闭包创建只有前置通知的处理器
///
/// ```ignore
/// let handler = before_fn("audit", |jp| tracing::info!("calling {}", jp.signature()));
/// ```
pub fn before_fn<F>(name: &'static str, f: F) -> BeforeFn<F>
where
    F: Fn(&JoinPoint) + Send + Sync,
{
    BeforeFn { name, f }
}

impl<F> InvocationHandler for BeforeFn<F>
where
    F: Fn(&JoinPoint) + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn before(&self, join_point: &JoinPoint) {
        (self.f)(join_point)
    }
}

// ============================================================================
// 预定义的常用处理器
// ============================================================================

/// 日志处理器 - 记录方法调用
pub struct LoggingHandler {
    log_timing: bool,
}

impl LoggingHandler {
    pub fn new() -> Self {
        Self { log_timing: true }
    }

    /// 不记录耗时
    pub fn without_timing(mut self) -> Self {
        self.log_timing = false;
        self
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationHandler for LoggingHandler {
    fn name(&self) -> &str {
        "LoggingHandler"
    }

    fn before(&self, join_point: &JoinPoint) {
        tracing::info!("→ Entering: {}", join_point);
    }

    fn after_returning(&self, join_point: &JoinPoint) {
        if self.log_timing {
            tracing::info!(
                "← Exiting: {} (took {:?})",
                join_point,
                join_point.elapsed()
            );
        } else {
            tracing::info!("← Exiting: {}", join_point);
        }
    }

    fn after_throwing(&self, join_point: &JoinPoint, error: &ErrorInfo) {
        tracing::error!(
            "❌ Exception in {}: {}",
            join_point,
            error.full_description()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_before_fn() {
        let calls = AtomicUsize::new(0);
        let handler = before_fn("counting", |jp: &JoinPoint| {
            assert_eq!(jp.method_name, "test");
            calls.fetch_add(1, Ordering::SeqCst);
        });

        let jp = JoinPoint::new("UserServiceImpl", "userService", "test");
        handler.before(&jp);
        handler.after_returning(&jp);

        assert_eq!(handler.name(), "counting");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_logging_handler() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let handler = LoggingHandler::new();
        let jp = JoinPoint::new("UserServiceImpl", "userService", "test");
        handler.before(&jp);
        handler.after_returning(&jp);
        handler.after_throwing(&jp, &ErrorInfo::simple("boom"));
        assert_eq!(handler.name(), "LoggingHandler");
    }
}

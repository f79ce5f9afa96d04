//! 连接点（JoinPoint）定义
//!
//! 连接点表示一次经由代理的方法调用

use std::fmt;
use std::time::{Duration, Instant};

/// 连接点信息
#[derive(Clone)]
pub struct JoinPoint {
    /// 被代理实例的类型名称
    pub target_type: &'static str,

    /// 被代理实例的 Bean 名称
    pub bean_name: String,

    /// 方法名称
    pub method_name: &'static str,

    /// 调用时间戳
    pub timestamp: Instant,
}

impl JoinPoint {
    /// 创建新的连接点
    pub fn new(target_type: &'static str, bean_name: impl Into<String>, method_name: &'static str) -> Self {
        Self {
            target_type,
            bean_name: bean_name.into(),
            method_name,
            timestamp: Instant::now(),
        }
    }

    /// 获取完整的方法签名
    pub fn signature(&self) -> String {
        format!("{}::{}", short_name(self.target_type), self.method_name)
    }

    /// 自调用开始以来经过的时间
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// 去掉模块路径：`app::service::UserServiceImpl` -> `UserServiceImpl`
fn short_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Debug for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("target_type", &self.target_type)
            .field("bean_name", &self.bean_name)
            .field("method_name", &self.method_name)
            .field("signature", &self.signature())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl fmt::Display for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.signature(), self.bean_name)
    }
}

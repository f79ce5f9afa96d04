// sprig-core: 极简的对象生命周期容器
//
// 根据组件声明构建依赖图，按正确顺序创建对象，注入协作者，
// 依次执行生命周期回调，并可在初始化后用代理替换实例：
// - 单例和原型作用域
// - 按字段名的依赖注入
// - BeanNameAware / InitializingBean / BeanPostProcessor
// - 三种声明来源：手动注册、#[derive(Component)] 扫描、TOML 清单

pub mod app;
pub mod bean;
pub mod bean_factory;
pub mod capability;
pub mod component;
pub mod constants;
pub mod context;
pub mod declaration;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod scope;
pub mod singleton;
pub mod utils;

// 重新导出常用类型
pub use app::SprigApplication;
pub use bean::{AsAny, Autowired, Bean, Component};
pub use bean_factory::{BeanFactory, DefaultBeanFactory, ListableBeanFactory};
pub use capability::{Capabilities, Capability, CapabilitySet};
pub use component::{scan_components, ComponentRegistration};
pub use context::{ApplicationContext, ApplicationContextBuilder};
pub use declaration::{ComponentDeclaration, ComponentFactory, Declare, Dependency};
pub use error::{ApplicationError, ApplicationResult, ContainerError, ContainerResult};
pub use lifecycle::{BeanNameAware, BeanPostProcessor, InitializingBean};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use manifest::ComponentManifest;
pub use registry::{BeanDefinition, BeanDefinitionRegistry};
pub use scope::Scope;
pub use singleton::SingletonCache;

// 导出 anyhow 和 inventory，供宏使用
pub use anyhow;
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::app::SprigApplication;
    pub use crate::bean::{Autowired, Bean, Component};
    pub use crate::bean_factory::{BeanFactory, ListableBeanFactory};
    pub use crate::capability::{Capabilities, Capability};
    pub use crate::context::ApplicationContext;
    pub use crate::declaration::{ComponentDeclaration, Declare};
    pub use crate::error::{ApplicationError, ApplicationResult, ContainerError, ContainerResult};
    pub use crate::lifecycle::{BeanNameAware, BeanPostProcessor, InitializingBean};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    pub use anyhow::{anyhow, Context};
}

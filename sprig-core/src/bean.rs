use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::capability::Capabilities;
use crate::lifecycle::{BeanNameAware, InitializingBean};

/// 类型擦除辅助 trait，为所有 `Any + Send + Sync` 类型自动实现
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn component_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn component_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Component trait - 所有由容器管理的对象都需要实现此 trait
///
/// 通常由 `#[derive(Component)]` 生成；也可以手写。
/// 所有方法都有默认实现，空实现表示“没有该能力”。
pub trait Component: AsAny {
    /// 将依赖注入到指定字段
    fn inject(&mut self, field: &str, _dependency: &Bean) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "'{}' has no injectable field named '{}'",
            std::any::type_name::<Self>(),
            field
        ))
    }

    /// 若实现了 BeanNameAware，返回自身
    fn as_bean_name_aware(&mut self) -> Option<&mut dyn BeanNameAware> {
        None
    }

    /// 若实现了 InitializingBean，返回自身
    fn as_initializing_bean(&mut self) -> Option<&mut dyn InitializingBean> {
        None
    }

    /// 实例对外暴露的类型视图，默认只有具体类型
    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities::of(self)
    }
}

impl dyn Component {
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// 已完成创建的 Bean
///
/// 克隆开销很小（只复制 `Arc`），同一实例的所有克隆指向同一对象。
#[derive(Clone)]
pub struct Bean {
    name: Arc<str>,
    type_name: &'static str,
    instance: Arc<dyn Component>,
    capabilities: Arc<Capabilities>,
}

impl Bean {
    /// 冻结一个实例：计算它的视图表
    pub fn new(name: &str, instance: Box<dyn Component>) -> Self {
        let type_name = (*instance).component_type_name();
        let instance: Arc<dyn Component> = Arc::from(instance);
        let capabilities = Arc::clone(&instance).capabilities();
        Self {
            name: Arc::from(name),
            type_name,
            instance,
            capabilities: Arc::new(capabilities),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 实例的具体类型名
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 以指定类型（具体类型或 `dyn Trait`）访问实例
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.capabilities.get::<T>()
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.capabilities.contains::<T>()
    }

    pub fn instance(&self) -> &Arc<dyn Component> {
        &self.instance
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// 是否为同一个实例
    pub fn ptr_eq(a: &Bean, b: &Bean) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&a.instance), Arc::as_ptr(&b.instance))
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// 需要容器注入的字段
///
/// 实例化时为空，注入阶段由容器填充。`T` 可以是具体类型，
/// 也可以是 `dyn Trait`（目标 Bean 需暴露该视图）。
pub struct Autowired<T: ?Sized> {
    inner: Option<Arc<T>>,
}

impl<T: ?Sized + 'static> Autowired<T> {
    /// 从 Bean 中取出 `T` 视图并保存
    pub fn wire(&mut self, dependency: &Bean) -> anyhow::Result<()> {
        let view = dependency.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "bean '{}' of type '{}' does not expose '{}'",
                dependency.name(),
                dependency.type_name(),
                std::any::type_name::<T>()
            )
        })?;
        self.inner = Some(view);
        Ok(())
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.inner.as_ref()
    }

    pub fn is_wired(&self) -> bool {
        self.inner.is_some()
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T: ?Sized> Clone for Autowired<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &std::any::type_name::<T>())
            .field("wired", &self.inner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn label(&self) -> &str;
    }

    #[derive(Default)]
    struct Repository {
        label: String,
    }

    impl Named for Repository {
        fn label(&self) -> &str {
            &self.label
        }
    }

    impl Component for Repository {
        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::of(Arc::clone(&self)).with::<dyn Named>(self)
        }
    }

    #[derive(Default)]
    struct Service {
        repo: Autowired<dyn Named>,
    }

    impl Component for Service {}

    #[test]
    fn test_bean_views_share_one_instance() {
        let bean = Bean::new(
            "repo",
            Box::new(Repository {
                label: "primary".to_string(),
            }),
        );

        let concrete = bean.get::<Repository>().unwrap();
        let named = bean.get::<dyn Named>().unwrap();
        assert_eq!(named.label(), "primary");
        assert!(std::ptr::addr_eq(Arc::as_ptr(&concrete), Arc::as_ptr(&named)));
        assert!(std::ptr::addr_eq(
            Arc::as_ptr(&concrete),
            Arc::as_ptr(bean.instance())
        ));
        assert!(Bean::ptr_eq(&bean, &bean.clone()));
        assert!(bean.type_name().ends_with("Repository"));
    }

    #[test]
    fn test_autowired_wire_by_trait() {
        let repo = Bean::new("repo", Box::new(Repository::default()));
        let mut field: Autowired<dyn Named> = Autowired::default();
        assert!(!field.is_wired());
        field.wire(&repo).unwrap();
        assert!(field.is_wired());
    }

    #[test]
    fn test_autowired_rejects_incompatible_bean() {
        let service = Bean::new("service", Box::new(Service::default()));
        let mut field: Autowired<dyn Named> = Autowired::default();
        let err = field.wire(&service).unwrap_err();
        assert!(err.to_string().contains("does not expose"));
    }

    /// 默认的 inject 拒绝未知字段，错误信息中带有组件自身的类型名
    #[test]
    fn test_default_inject_rejects_unknown_field() {
        let repo = Bean::new("repo", Box::new(Repository::default()));
        let mut service = Service::default();
        let err = service.inject("missing", &repo).unwrap_err().to_string();
        assert!(err.contains("Service"), "{}", err);
        assert!(err.contains("'missing'"), "{}", err);
        assert!(!err.contains("&mut"), "{}", err);

        let mut boxed: Box<dyn Component> = Box::new(Service::default());
        let err = boxed.inject("missing", &repo).unwrap_err().to_string();
        assert!(err.contains("bean::tests::Service"), "{}", err);
        assert!(!err.contains("Box<"), "{}", err);
    }

    #[test]
    fn test_downcast_through_dyn_component() {
        let mut boxed: Box<dyn Component> = Box::new(Repository::default());
        assert!(boxed.is::<Repository>());
        boxed.downcast_mut::<Repository>().unwrap().label = "changed".to_string();
        assert_eq!(boxed.downcast_ref::<Repository>().unwrap().label, "changed");
        assert!(boxed.downcast_ref::<Service>().is_none());
    }
}

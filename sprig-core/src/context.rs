use std::sync::Arc;
use std::time::Instant;

use crate::bean_factory::{BeanFactory, DefaultBeanFactory, ListableBeanFactory};
use crate::{
    bean::Bean,
    component,
    declaration::ComponentDeclaration,
    error::{ContainerError, ContainerResult},
    registry::BeanDefinitionRegistry,
    Scope,
};

/// 应用上下文
///
/// 持有定义注册表、单例缓存和后置处理器链。每个上下文相互独立；
/// 启动失败时不会返回任何上下文，已创建的实例随之释放。
pub struct ApplicationContext {
    bean_factory: DefaultBeanFactory,
}

impl ApplicationContext {
    /// 根据声明构建并启动容器
    ///
    /// 1. 注册全部声明（重名时在创建任何实例之前失败）
    /// 2. 实例化后置处理器，按声明顺序加入处理链
    /// 3. 按声明顺序预实例化其余单例
    pub fn initialize(
        declarations: impl IntoIterator<Item = ComponentDeclaration>,
    ) -> ContainerResult<Self> {
        Self::initialize_with(declarations, false)
    }

    fn initialize_with(
        declarations: impl IntoIterator<Item = ComponentDeclaration>,
        validate: bool,
    ) -> ContainerResult<Self> {
        let started = Instant::now();

        let mut registry = BeanDefinitionRegistry::new();
        for declaration in declarations {
            registry.register(declaration.into())?;
        }

        if validate {
            registry.validate_dependencies()?;
            tracing::info!("Dependency validation passed for {} bean(s)", registry.len());
        }

        tracing::info!("Registered {} bean definition(s)", registry.len());

        let context = Self {
            bean_factory: DefaultBeanFactory::new(registry),
        };

        context.refresh().map_err(|e| {
            tracing::error!("Context initialization failed: {}", e);
            e
        })?;

        tracing::info!(
            "Context initialized in {:?}: {} definition(s), {} singleton(s), {} post-processor(s)",
            started.elapsed(),
            context.bean_definition_count(),
            context.singleton_count(),
            context.bean_factory.post_processor_count()
        );

        Ok(context)
    }

    fn refresh(&self) -> ContainerResult<()> {
        self.bean_factory.register_post_processors()?;
        self.bean_factory.preinstantiate_singletons()
    }

    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    /// 按名称获取 Bean
    pub fn get_bean(&self, name: &str) -> ContainerResult<Bean> {
        self.bean_factory.get_bean(name)
    }

    /// 按名称获取 Bean，并以 `T`（具体类型或 `dyn Trait`）访问
    pub fn get_bean_as<T: ?Sized + 'static>(&self, name: &str) -> ContainerResult<Arc<T>> {
        let bean = self.get_bean(name)?;
        bean.get::<T>().ok_or_else(|| ContainerError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: bean.type_name().to_string(),
        })
    }

    pub fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    /// 所有 Bean 名称（声明顺序）
    pub fn bean_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_names()
    }

    pub fn bean_definition_count(&self) -> usize {
        self.bean_factory.get_bean_definition_count()
    }

    /// 已缓存的单例数量（含后置处理器）
    pub fn singleton_count(&self) -> usize {
        self.bean_factory.singleton_count()
    }

    pub fn scope_of(&self, name: &str) -> ContainerResult<Scope> {
        Ok(self.bean_factory.registry().lookup(name)?.scope)
    }

    pub fn bean_factory(&self) -> &DefaultBeanFactory {
        &self.bean_factory
    }
}

impl BeanFactory for ApplicationContext {
    fn get_bean(&self, name: &str) -> ContainerResult<Bean> {
        self.bean_factory.get_bean(name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }
}

impl ListableBeanFactory for ApplicationContext {
    fn get_bean_names(&self) -> Vec<String> {
        self.bean_factory.get_bean_names()
    }

    fn get_bean_definition_count(&self) -> usize {
        self.bean_factory.get_bean_definition_count()
    }
}

/// 应用上下文构建器
#[derive(Default)]
pub struct ApplicationContextBuilder {
    declarations: Vec<ComponentDeclaration>,
    validate_dependencies: bool,
}

impl ApplicationContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个组件声明
    pub fn declare(mut self, declaration: ComponentDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn declare_all(mut self, declarations: impl IntoIterator<Item = ComponentDeclaration>) -> Self {
        self.declarations.extend(declarations);
        self
    }

    /// 添加所有 `#[derive(Component)]` 注册的组件
    pub fn scan_components(self) -> Self {
        self.declare_all(component::scan_components())
    }

    /// 启动前静态校验依赖图（缺失目标、循环）
    ///
    /// 默认关闭；关闭时循环依赖在创建时检测
    pub fn validate_dependencies(mut self, validate: bool) -> Self {
        self.validate_dependencies = validate;
        self
    }

    /// 构建上下文
    pub fn build(self) -> ContainerResult<Arc<ApplicationContext>> {
        ApplicationContext::initialize_with(self.declarations, self.validate_dependencies)
            .map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{Autowired, Component};
    use crate::capability::{Capabilities, Capability};
    use crate::lifecycle::{BeanNameAware, BeanPostProcessor, InitializingBean};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Repo;
    impl Component for Repo {}

    #[derive(Default)]
    struct Service {
        repo: Autowired<Repo>,
    }

    impl Component for Service {
        fn inject(&mut self, field: &str, dependency: &Bean) -> anyhow::Result<()> {
            match field {
                "repo" => self.repo.wire(dependency),
                _ => Err(anyhow::anyhow!("unknown field '{}'", field)),
            }
        }
    }

    struct Counted;
    impl Component for Counted {}

    fn counted() -> ComponentDeclaration {
        ComponentDeclaration::from_factory::<Counted, _>("counted", || {
            ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Counted)
        })
    }

    #[test]
    fn test_repo_service_scenario() {
        let context = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Repo>("repo"),
            ComponentDeclaration::of::<Service>("service").with_dependency("repo", "repo"),
        ])
        .unwrap();

        let service = context.get_bean_as::<Service>("service").unwrap();
        let repo = context.get_bean_as::<Repo>("repo").unwrap();
        assert!(Arc::ptr_eq(service.repo.get().unwrap(), &repo));
        assert_eq!(context.singleton_count(), 2);
        assert_eq!(context.bean_names(), vec!["repo", "service"]);
    }

    #[test]
    fn test_duplicate_name_fails_before_construction() {
        let before = ALLOCATIONS.load(Ordering::SeqCst);
        let result = ApplicationContext::initialize(vec![
            counted(),
            ComponentDeclaration::of::<Repo>("counted"),
        ]);

        assert!(matches!(result, Err(ContainerError::DuplicateBeanName(ref n)) if n == "counted"));
        assert_eq!(ALLOCATIONS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_unknown_bean() {
        let context = ApplicationContext::initialize(Vec::new()).unwrap();
        assert!(matches!(
            context.get_bean("nope"),
            Err(ContainerError::BeanNotFound { .. })
        ));
        assert!(!context.contains_bean("nope"));
    }

    #[test]
    fn test_type_mismatch() {
        let context =
            ApplicationContext::initialize(vec![ComponentDeclaration::of::<Repo>("repo")]).unwrap();
        match context.get_bean_as::<Service>("repo") {
            Err(ContainerError::TypeMismatch { name, found, .. }) => {
                assert_eq!(name, "repo");
                assert!(found.ends_with("Repo"));
            }
            other => panic!("Expected TypeMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_prototype_depending_on_singleton() {
        let context = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Repo>("repo"),
            ComponentDeclaration::of::<Service>("service")
                .with_scope(Scope::Prototype)
                .with_dependency("repo", "repo"),
        ])
        .unwrap();

        let a = context.get_bean_as::<Service>("service").unwrap();
        let b = context.get_bean_as::<Service>("service").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(a.repo.get().unwrap(), b.repo.get().unwrap()));
        assert_eq!(context.scope_of("service").unwrap(), Scope::Prototype);
        assert_eq!(context.singleton_count(), 1);
    }

    #[test]
    fn test_two_bean_cycle_fails() {
        let result = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Service>("a").with_dependency("repo", "b"),
            ComponentDeclaration::of::<Service>("b").with_dependency("repo", "a"),
        ]);

        match result {
            Err(ContainerError::CircularDependency { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            Err(other) => panic!("Expected CircularDependency, got {}", other),
            Ok(_) => panic!("Expected CircularDependency"),
        }
    }

    #[test]
    fn test_static_validation_reports_missing_target() {
        let result = ApplicationContext::builder()
            .declare(ComponentDeclaration::of::<Service>("service").with_dependency("repo", "repo"))
            .validate_dependencies(true)
            .build();

        match result {
            Err(ContainerError::BeanNotFound { name, required_by }) => {
                assert_eq!(name, "repo");
                assert_eq!(required_by.as_deref(), Some("service"));
            }
            Err(other) => panic!("Expected BeanNotFound, got {}", other),
            Ok(_) => panic!("Expected BeanNotFound"),
        }
    }

    /// 开启静态校验时循环依赖给出与运行时相同的错误
    #[test]
    fn test_static_validation_reports_cycle() {
        let result = ApplicationContext::builder()
            .declare(ComponentDeclaration::of::<Service>("a").with_dependency("repo", "b"))
            .declare(ComponentDeclaration::of::<Service>("b").with_dependency("repo", "a"))
            .validate_dependencies(true)
            .build();

        match result {
            Err(ContainerError::CircularDependency { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            Err(other) => panic!("Expected CircularDependency, got {}", other),
            Ok(_) => panic!("Expected CircularDependency"),
        }
    }

    #[test]
    fn test_concurrent_get_bean_returns_same_singleton() {
        let context = ApplicationContext::builder()
            .declare(ComponentDeclaration::of::<Repo>("repo"))
            .build()
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let context = Arc::clone(&context);
                std::thread::spawn(move || context.get_bean("repo").unwrap())
            })
            .collect();

        let beans: Vec<Bean> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(beans.windows(2).all(|w| Bean::ptr_eq(&w[0], &w[1])));
    }

    #[derive(Default)]
    struct Named {
        name: String,
        init_seen_name: Option<String>,
    }

    impl BeanNameAware for Named {
        fn set_bean_name(&mut self, name: &str) {
            self.name = name.to_string();
        }
    }

    impl InitializingBean for Named {
        fn after_properties_set(&mut self) -> anyhow::Result<()> {
            self.init_seen_name = Some(self.name.clone());
            Ok(())
        }
    }

    impl Component for Named {
        fn as_bean_name_aware(&mut self) -> Option<&mut dyn BeanNameAware> {
            Some(self)
        }

        fn as_initializing_bean(&mut self) -> Option<&mut dyn InitializingBean> {
            Some(self)
        }
    }

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl BeanPostProcessor for Recorder {
        fn before_initialization(
            &self,
            mut bean: Box<dyn Component>,
            bean_name: &str,
        ) -> anyhow::Result<Box<dyn Component>> {
            if let Some(named) = bean.downcast_mut::<Named>() {
                if bean_name == "userService" {
                    named.name = "X".to_string();
                }
            }
            self.log.lock().push(format!("{}:before:{}", self.label, bean_name));
            Ok(bean)
        }

        fn after_initialization(
            &self,
            bean: Box<dyn Component>,
            bean_name: &str,
        ) -> anyhow::Result<Box<dyn Component>> {
            self.log.lock().push(format!("{}:after:{}", self.label, bean_name));
            Ok(bean)
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    struct RecorderBean(Arc<Recorder>);

    impl Component for RecorderBean {
        fn capabilities(self: Arc<Self>) -> Capabilities {
            let processor: Arc<dyn BeanPostProcessor> = self.0.clone();
            Capabilities::of(self).with(processor)
        }
    }

    fn recorder(label: &'static str, log: &Arc<Mutex<Vec<String>>>) -> ComponentDeclaration {
        let log = Arc::clone(log);
        ComponentDeclaration::from_factory::<RecorderBean, _>(label, move || {
            Ok(RecorderBean(Arc::new(Recorder {
                label,
                log: Arc::clone(&log),
            })))
        })
        .with_capability(Capability::PostProcessor)
    }

    #[test]
    fn test_hooks_run_in_registration_order_once_per_bean() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let context = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Named>("userService")
                .with_capability(Capability::NameAware)
                .with_capability(Capability::InitializingBean),
            recorder("first", &log),
            recorder("second", &log),
        ])
        .unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "first:before:userService",
                "second:before:userService",
                "first:after:userService",
                "second:after:userService",
            ]
        );

        let named = context.get_bean_as::<Named>("userService").unwrap();
        assert_eq!(named.name, "X");
        assert_eq!(named.init_seen_name.as_deref(), Some("X"));
    }

    #[test]
    fn test_prototype_post_processor_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = ApplicationContext::initialize(vec![
            recorder("first", &log).with_scope(Scope::Prototype)
        ]);
        assert!(matches!(result, Err(ContainerError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_post_processor_must_expose_trait() {
        let result = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Repo>("fake").with_capability(Capability::PostProcessor),
        ]);
        assert!(matches!(result, Err(ContainerError::InvalidDefinition { ref name, .. }) if name == "fake"));
    }

    /// 处理器依赖普通 Bean 时在创建任何 Bean 之前拒绝
    #[test]
    fn test_post_processor_depending_on_plain_bean_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Repo>("repo"),
            recorder("auditor", &log).with_dependency("repo", "repo"),
        ]);

        match result {
            Err(ContainerError::InvalidDefinition { name, reason }) => {
                assert_eq!(name, "auditor");
                assert!(reason.contains("'repo'"), "{}", reason);
            }
            Err(other) => panic!("Expected InvalidDefinition, got {}", other),
            Ok(_) => panic!("Expected InvalidDefinition"),
        }
        assert!(log.lock().is_empty());
    }

    /// 处理器依赖不存在的 Bean 时报告 BeanNotFound
    #[test]
    fn test_post_processor_missing_dependency() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = ApplicationContext::initialize(vec![
            recorder("auditor", &log).with_dependency("repo", "ghost"),
        ]);

        match result {
            Err(ContainerError::BeanNotFound { name, required_by }) => {
                assert_eq!(name, "ghost");
                assert_eq!(required_by.as_deref(), Some("auditor"));
            }
            Err(other) => panic!("Expected BeanNotFound, got {}", other),
            Ok(_) => panic!("Expected BeanNotFound"),
        }
    }

    #[test]
    fn test_initialization_failure_keeps_cause() {
        #[derive(Default)]
        struct Broken;
        impl InitializingBean for Broken {
            fn after_properties_set(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
        }
        impl Component for Broken {
            fn as_initializing_bean(&mut self) -> Option<&mut dyn InitializingBean> {
                Some(self)
            }
        }

        let result = ApplicationContext::initialize(vec![
            ComponentDeclaration::of::<Broken>("broken").with_capability(Capability::InitializingBean),
        ]);

        match result {
            Err(ContainerError::Initialization { name, source }) => {
                assert_eq!(name, "broken");
                assert_eq!(source.to_string(), "disk full");
            }
            Err(other) => panic!("Expected Initialization, got {}", other),
            Ok(_) => panic!("Expected Initialization"),
        }
    }
}

use sprig_aop::{before_fn, proxy, ProxyFactory};
use sprig_core::prelude::*;
use sprig_core_macros::Component;

// ==================== 业务服务 ====================

/// 订单服务 - 单例
#[derive(Component, Default, Debug)]
struct OrderService;

impl OrderService {
    fn describe(&self) -> String {
        format!("{:?}@{:p}", self, self)
    }
}

pub trait UserService: Send + Sync {
    fn test(&self);
    fn name(&self) -> String;
}

/// 用户服务 - 原型，每次获取都是新实例
#[derive(Component, Default)]
#[component("userService")]
#[scope("prototype")]
#[bean_name_aware]
#[initializing_bean]
#[expose(dyn UserService)]
struct UserServiceImpl {
    #[autowired]
    order_service: Autowired<OrderService>,
    bean_name: String,
    name: String,
}

impl BeanNameAware for UserServiceImpl {
    fn set_bean_name(&mut self, name: &str) {
        self.bean_name = name.to_string();
    }
}

impl InitializingBean for UserServiceImpl {
    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        println!("初始化 ({})", self.bean_name);
        Ok(())
    }
}

impl UserService for UserServiceImpl {
    fn test(&self) {
        match self.order_service.get() {
            Some(order_service) => println!("{}", order_service.describe()),
            None => println!("<orderService not wired>"),
        }
        println!("{}", self.name);
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

proxy! {
    /// userService 的代理：每次调用先打印代理逻辑
    struct UserServiceProxy for dyn UserService {
        fn test(&self);
        fn name(&self) -> String;
    }
}

// ==================== 后置处理器 ====================

/// 所有 Bean 都会经过这个处理器（处理器自身除外）
#[derive(Component)]
#[post_processor]
struct DemoPostProcessor {
    proxies: ProxyFactory,
}

impl Default for DemoPostProcessor {
    fn default() -> Self {
        Self {
            proxies: ProxyFactory::new(before_fn("demoProxy", |_| println!("代理逻辑"))),
        }
    }
}

impl BeanPostProcessor for DemoPostProcessor {
    fn before_initialization(
        &self,
        mut bean: Box<dyn Component>,
        bean_name: &str,
    ) -> anyhow::Result<Box<dyn Component>> {
        println!("初始化前: {}", bean_name);
        if bean_name == "userService" {
            let service = bean
                .downcast_mut::<UserServiceImpl>()
                .ok_or_else(|| anyhow!("userService is not a UserServiceImpl"))?;
            service.name = "X".to_string();
        }
        Ok(bean)
    }

    fn after_initialization(
        &self,
        bean: Box<dyn Component>,
        bean_name: &str,
    ) -> anyhow::Result<Box<dyn Component>> {
        println!("初始化后: {}", bean_name);
        if bean_name != "userService" {
            return Ok(bean);
        }

        let proxy = self
            .proxies
            .create::<dyn UserService>(bean, bean_name)
            .context("creating userService proxy")?;
        Ok(UserServiceProxy::boxed(proxy))
    }

    fn name(&self) -> &str {
        "demoPostProcessor"
    }
}

fn main() -> anyhow::Result<()> {
    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║     Sprig - Container Demo                         ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    // 按本 crate 目录下的 sprig.toml（或 SPRIG_MANIFEST 指向的文件）声明，
    // 清单不存在时扫描 #[derive(Component)] 注册的组件
    let context = SprigApplication::new("SprigDemo")
        .manifest_dir(env!("CARGO_MANIFEST_DIR"))
        .run()?;

    println!("\n📦 Beans: {:?}", context.bean_names());

    let user_service = context.get_bean_as::<dyn UserService>("userService")?;
    user_service.test();

    let another = context.get_bean("userService")?;
    let first = context.get_bean("userService")?;
    println!(
        "\n🔁 prototype gives a new instance per call: {}",
        !Bean::ptr_eq(&first, &another)
    );
    println!(
        "🔷 userService is proxied: {}",
        another.is::<UserServiceProxy>() && !another.is::<UserServiceImpl>()
    );
    tracing::info!("userService name: {}", user_service.name());

    Ok(())
}

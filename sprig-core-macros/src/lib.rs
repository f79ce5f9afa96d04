mod attribute_helpers;
mod component_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Component派生宏
///
/// 为结构体实现 `Component` 和 `Declare`，并通过 inventory 注册，
/// 使 `scan_components()` 能够发现它。类型需要实现 `Default`（用于实例化）。
///
/// 用法：
/// ```ignore
/// #[derive(Component, Default)]
/// #[component("userService")]     // 可选：指定bean名称（默认为类型名的camelCase）
/// // 或
/// #[component(name = "userService")]
/// #[scope("prototype")]           // 可选：singleton（默认）/ prototype
/// #[bean_name_aware]              // 可选：调用 BeanNameAware::set_bean_name
/// #[initializing_bean]            // 可选：调用 InitializingBean::after_properties_set
/// #[expose(dyn UserService)]      // 可选：允许以 trait object 形式获取和注入
/// struct UserServiceImpl {
///     #[autowired]                // 注入名为 orderService 的 bean
///     order_service: Autowired<OrderService>,
///     #[autowired("auditLog")]    // 指定 bean 名称
///     audit: Autowired<dyn AuditLog>,
///     name: String,
/// }
/// ```
///
/// 后置处理器使用 `#[post_processor]`，类型需实现 `BeanPostProcessor`：
/// ```ignore
/// #[derive(Component, Default)]
/// #[post_processor]
/// struct RenamingPostProcessor;
/// ```
#[proc_macro_derive(
    Component,
    attributes(
        component,
        scope,
        autowired,
        bean_name_aware,
        initializing_bean,
        post_processor,
        expose
    )
)]
#[proc_macro_error]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component_impl::derive_component_impl(input)
}

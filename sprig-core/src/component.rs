//! 编译期组件注册
//!
//! `#[derive(Component)]` 为每个类型提交一个 [`ComponentRegistration`]，
//! 启动时通过 [`scan_components`] 统一收集。

use crate::declaration::ComponentDeclaration;

/// 组件注册表项 - 用于 inventory 收集
pub struct ComponentRegistration {
    /// 默认 Bean 名称
    pub name: &'static str,
    /// 实现类型的短名称（即结构体名），TOML 清单按此名称引用
    pub type_name: &'static str,
    /// 生成组件声明
    pub declare: fn() -> ComponentDeclaration,
}

impl ComponentRegistration {
    pub const fn new(
        name: &'static str,
        type_name: &'static str,
        declare: fn() -> ComponentDeclaration,
    ) -> Self {
        Self {
            name,
            type_name,
            declare,
        }
    }
}

inventory::collect!(ComponentRegistration);

/// 所有已注册的组件，按 Bean 名称排序
///
/// inventory 的迭代顺序不固定，排序保证每次启动的创建顺序一致
pub fn registrations() -> Vec<&'static ComponentRegistration> {
    let mut registrations: Vec<_> = inventory::iter::<ComponentRegistration>().collect();
    registrations.sort_by_key(|r| r.name);
    registrations
}

/// 按实现类型名称查找注册项
pub fn find_registration(type_name: &str) -> Option<&'static ComponentRegistration> {
    inventory::iter::<ComponentRegistration>().find(|r| r.type_name == type_name)
}

/// 扫描所有 `#[derive(Component)]` 注册的组件声明
pub fn scan_components() -> Vec<ComponentDeclaration> {
    tracing::info!("Starting component scan for #[derive(Component)] types");

    let registrations = registrations();
    let total = registrations.len();

    if total == 0 {
        tracing::warn!("No #[derive(Component)] types found");
        return Vec::new();
    }

    tracing::info!("Found {} component(s) to register", total);

    registrations
        .into_iter()
        .enumerate()
        .map(|(idx, registration)| {
            tracing::debug!(
                "Registering component [{}/{}]: '{}' ({})",
                idx + 1,
                total,
                registration.name,
                registration.type_name
            );
            (registration.declare)()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Component;
    use crate::Scope;

    #[derive(Default)]
    struct ScannedClock;
    impl Component for ScannedClock {}

    fn declare_clock() -> ComponentDeclaration {
        ComponentDeclaration::of::<ScannedClock>("scannedClock").with_scope(Scope::Prototype)
    }

    inventory::submit! {
        ComponentRegistration::new("scannedClock", "ScannedClock", declare_clock)
    }

    #[test]
    fn test_scan_finds_submitted_component() {
        let declarations = scan_components();
        let clock = declarations
            .iter()
            .find(|d| d.name() == "scannedClock")
            .expect("scannedClock should be registered");
        assert_eq!(clock.scope(), Scope::Prototype);
    }

    #[test]
    fn test_find_registration_by_type_name() {
        let registration = find_registration("ScannedClock").unwrap();
        assert_eq!(registration.name, "scannedClock");
        assert!(find_registration("Missing").is_none());
    }

    #[test]
    fn test_registrations_sorted_by_name() {
        let names: Vec<_> = registrations().iter().map(|r| r.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}

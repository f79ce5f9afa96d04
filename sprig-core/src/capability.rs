//! 能力（Capability）
//!
//! 两层概念：
//! - [`CapabilitySet`]：声明期的生命周期能力标记，容器据此决定调用哪些回调
//! - [`Capabilities`]：实例期的类型视图表，按 `TypeId` 保存 `Arc<T>` / `Arc<dyn Trait>`，
//!   用于注入、按类型获取以及代理

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 容器识别的生命周期能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 实现了 `BeanNameAware`
    NameAware,
    /// 实现了 `InitializingBean`
    InitializingBean,
    /// 实现了 `BeanPostProcessor`
    PostProcessor,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::NameAware => 0b001,
            Capability::InitializingBean => 0b010,
            Capability::PostProcessor => 0b100,
        }
    }

    const ALL: [Capability; 3] = [
        Capability::NameAware,
        Capability::InitializingBean,
        Capability::PostProcessor,
    ];
}

/// 能力集合
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub const fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// 实例的类型视图表
///
/// 每个 Bean 至少暴露自身的具体类型；组件可以额外暴露 trait object 视图，
/// 例如 `Arc<dyn UserService>`。代理对象只暴露它所代理的接口，
/// 因此无法再被当作原始实现类型取出。
#[derive(Default)]
pub struct Capabilities {
    views: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    names: Vec<&'static str>,
}

impl Capabilities {
    /// 以实例自身的类型创建视图表
    pub fn of<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self::default().with(instance)
    }

    /// 追加一个视图
    pub fn with<I: ?Sized + Send + Sync + 'static>(mut self, view: Arc<I>) -> Self {
        let type_id = TypeId::of::<I>();
        if !self.views.contains_key(&type_id) {
            self.names.push(std::any::type_name::<I>());
        }
        self.views.insert(type_id, Box::new(view));
        self
    }

    /// 取出指定类型的视图
    pub fn get<I: ?Sized + 'static>(&self) -> Option<Arc<I>> {
        let boxed = self.views.get(&TypeId::of::<I>())?;
        let view: &(dyn Any + Send + Sync) = &**boxed;
        view.downcast_ref::<Arc<I>>().cloned()
    }

    pub fn contains<I: ?Sized + 'static>(&self) -> bool {
        self.views.contains_key(&TypeId::of::<I>())
    }

    /// 已暴露视图的类型名（注册顺序）
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_capability_set() {
        let set = CapabilitySet::empty().with(Capability::PostProcessor);
        assert!(set.contains(Capability::PostProcessor));
        assert!(!set.contains(Capability::NameAware));

        let all: CapabilitySet = Capability::ALL.into_iter().collect();
        assert_eq!(all.iter().count(), 3);
        assert!(CapabilitySet::default().is_empty());
    }

    #[test]
    fn test_views_for_concrete_and_trait_types() {
        let instance = Arc::new(English);
        let capabilities = Capabilities::of(Arc::clone(&instance))
            .with::<dyn Greeter>(Arc::clone(&instance) as Arc<dyn Greeter>);

        let concrete = capabilities.get::<English>().unwrap();
        assert!(Arc::ptr_eq(&concrete, &instance));

        let greeter = capabilities.get::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");

        assert!(capabilities.get::<String>().is_none());
        assert_eq!(capabilities.names().len(), 2);
    }
}

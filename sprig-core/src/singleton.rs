//! 单例缓存

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::bean::Bean;

/// 单例 Bean 缓存：每个名称至多一个实例，不会被替换或淘汰
#[derive(Debug, Default)]
pub struct SingletonCache {
    singletons: RwLock<HashMap<String, Bean>>,
}

impl SingletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Bean> {
        self.singletons.read().get(name).cloned()
    }

    /// 仅在名称尚未缓存时写入；返回最终缓存中的实例
    ///
    /// 两个线程同时创建同一单例时，先写入者胜出，后者拿到先写入的实例
    pub fn insert_if_absent(&self, bean: Bean) -> Bean {
        let mut singletons = self.singletons.write();
        singletons
            .entry(bean.name().to_string())
            .or_insert(bean)
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.singletons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.singletons.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Component;

    #[derive(Default)]
    struct Counter {
        id: u32,
    }
    impl Component for Counter {}

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let cache = SingletonCache::new();
        let first = cache.insert_if_absent(Bean::new("counter", Box::new(Counter { id: 1 })));
        let second = cache.insert_if_absent(Bean::new("counter", Box::new(Counter { id: 2 })));

        assert!(Bean::ptr_eq(&first, &second));
        assert_eq!(second.get::<Counter>().unwrap().id, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let cache = SingletonCache::new();
        assert!(cache.get("counter").is_none());
        assert!(cache.is_empty());
        assert!(!cache.contains("counter"));
    }
}

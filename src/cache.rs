use parking_lot::{Mutex, RwLock};
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use crate::any::Object;

/// Key/value store the factory keeps its instances in.
///
/// Implementations may be shared with other cache consumers, so the factory namespaces its keys.
pub trait CacheBackend: Send + Sync {
    fn has(&self, key: &str) -> bool;

    fn get(&self, key: &str) -> Option<Object>;

    fn set(&self, key: &str, value: Object);

    /// Returns `true` if the key was present
    fn delete(&self, key: &str) -> bool;

    fn clear(&self);
}

/// In-process backend, used by default
#[derive(Default)]
pub struct MemoryCache {
    map: RwLock<HashMap<String, Object>>,
}

impl MemoryCache {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl CacheBackend for MemoryCache {
    #[inline]
    fn has(&self, key: &str) -> bool {
        self.map.read().contains_key(key)
    }

    #[inline]
    fn get(&self, key: &str) -> Option<Object> {
        self.map.read().get(key).cloned()
    }

    #[inline]
    fn set(&self, key: &str, value: Object) {
        self.map.write().insert(key.to_owned(), value);
    }

    #[inline]
    fn delete(&self, key: &str) -> bool {
        self.map.write().remove(key).is_some()
    }

    #[inline]
    fn clear(&self) {
        self.map.write().clear();
    }
}

/// Namespaced view of a [`CacheBackend`] holding the produced instances by component name
pub(crate) struct InstanceCache {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
    // Backends can't enumerate their keys, so the names set through this view are tracked here
    names: Mutex<BTreeSet<String>>,
}

impl InstanceCache {
    #[must_use]
    pub(crate) fn new(backend: Arc<dyn CacheBackend>, prefix: String) -> Self {
        Self {
            backend,
            prefix,
            names: Mutex::new(BTreeSet::new()),
        }
    }

    #[inline]
    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    #[inline]
    #[must_use]
    pub(crate) fn has(&self, name: &str) -> bool {
        self.backend.has(&self.key(name))
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, name: &str) -> Option<Object> {
        self.backend.get(&self.key(name))
    }

    pub(crate) fn set(&self, name: &str, value: Object) {
        self.backend.set(&self.key(name), value);
        self.names.lock().insert(name.to_owned());
    }

    pub(crate) fn evict(&self, name: &str) -> bool {
        self.names.lock().remove(name);
        self.backend.delete(&self.key(name))
    }

    /// Removes every instance set through this view, leaving other keys of the backend intact
    pub(crate) fn clear(&self) {
        let names = core::mem::take(&mut *self.names.lock());
        for name in names {
            self.backend.delete(&self.key(&name));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CacheBackend as _, InstanceCache, MemoryCache};
    use crate::any::Object;

    #[test]
    fn test_keys_are_namespaced() {
        let backend = Arc::new(MemoryCache::new());
        let cache = InstanceCache::new(backend.clone(), "framework.bean.".to_owned());
        let object = Object::new(1u8);

        cache.set("url", object.clone());

        assert!(cache.has("url"));
        assert!(backend.has("framework.bean.url"));
        assert!(!backend.has("url"));
        assert!(cache.get("url").unwrap().ptr_eq(&object));
    }

    #[test]
    fn test_clear_keeps_foreign_keys() {
        let backend = Arc::new(MemoryCache::new());
        let cache = InstanceCache::new(backend.clone(), "framework.bean.".to_owned());

        backend.set("session.user", Object::new(()));
        cache.set("a", Object::new(1u8));
        cache.set("b", Object::new(2u8));

        assert!(cache.evict("a"));
        assert!(!cache.evict("a"));
        cache.clear();

        assert!(!cache.has("b"));
        assert_eq!(backend.len(), 1);
        assert!(backend.has("session.user"));
    }
}

use core::any::TypeId;
use std::{collections::HashMap, sync::Arc};

use crate::descriptor::TypeDescriptor;

/// Resolves qualified type names to loadable types
pub trait TypeLoader: Send + Sync {
    fn exists(&self, name: &str) -> bool {
        self.load(name).is_some()
    }

    fn load(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Descriptor of a runtime value, used when a factory method returns some other type than the factory
    fn load_by_id(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>>;
}

/// Registry of the types known at startup, keyed by qualified name
#[derive(Default, Clone, Debug)]
pub struct TypeRegistry {
    by_name: HashMap<String, Arc<TypeDescriptor>>,
    by_id: HashMap<TypeId, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    /// Adds the descriptor, returning the one previously registered under the same name
    pub fn add(&mut self, descriptor: TypeDescriptor) -> Option<Arc<TypeDescriptor>> {
        let descriptor = Arc::new(descriptor);
        self.by_id.insert(descriptor.type_info().id, descriptor.clone());
        self.by_name.insert(normalize(descriptor.name()).to_owned(), descriptor)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

impl TypeLoader for TypeRegistry {
    #[inline]
    fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(normalize(name))
    }

    #[inline]
    fn load(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.by_name.get(normalize(name)).cloned()
    }

    #[inline]
    fn load_by_id(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.by_id.get(&type_id).cloned()
    }
}

/// Qualified names may be written fully qualified, with a leading `\` or `::`
fn normalize(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix('\\')
        .or_else(|| name.strip_prefix("::"))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::{TypeLoader as _, TypeRegistry};
    use crate::descriptor::TypeDescriptor;

    struct Url;
    struct Router;

    #[test]
    fn test_load_by_name_and_id() {
        let registry = TypeRegistry::new()
            .register(TypeDescriptor::builder::<Url>("hymie\\Url").default_constructor(|| Ok(Url)).build())
            .register(TypeDescriptor::builder::<Router>("app::Router").build());

        assert_eq!(registry.len(), 2);
        assert!(registry.exists("hymie\\Url"));
        assert!(registry.exists("\\hymie\\Url"));
        assert!(registry.exists("::app::Router"));
        assert!(!registry.exists("app::Missing"));

        let url = registry.load("hymie\\Url").unwrap();
        assert!(url.is_instantiable());
        assert_eq!(registry.load_by_id(TypeId::of::<Router>()).unwrap().name(), "app::Router");
        assert!(registry.load_by_id(TypeId::of::<u8>()).is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = TypeRegistry::new();

        assert!(registry.add(TypeDescriptor::builder::<Url>("Url").build()).is_none());
        let previous = registry.add(TypeDescriptor::builder::<Url>("Url").default_constructor(|| Ok(Url)).build());

        assert!(!previous.unwrap().is_instantiable());
        assert!(registry.load("Url").unwrap().is_instantiable());
    }
}

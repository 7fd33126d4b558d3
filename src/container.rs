use core::{any::type_name, cell::RefCell, fmt, mem};
use parking_lot::{ReentrantMutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info_span};

use crate::{
    any::{Component, Object},
    binder::{DeferredBinding, PropertyBinder},
    cache::{CacheBackend, InstanceCache, MemoryCache},
    config::Config,
    definition::{ComponentDefinition, DefinitionStore},
    errors::{CycleErrorKind, ResolveErrorKind, ResolveResult},
    instantiator::InstanceBuilder,
    lifecycle::LifecycleInvoker,
    registry::TypeLoader,
    value::Args,
};

#[derive(Default)]
struct ResolutionStack {
    // Names being looked up on the current chain, outermost first, flagged while their raw instance is built
    chain: Vec<(String, bool)>,
    deferred: Vec<DeferredBinding>,
}

impl ResolutionStack {
    fn is_building(&self, name: &str) -> bool {
        self.chain.iter().any(|(entry, building)| *building && entry == name)
    }

    fn take_deferred(&mut self, target: &str) -> Vec<DeferredBinding> {
        let (taken, kept) = mem::take(&mut self.deferred)
            .into_iter()
            .partition(|binding| binding.target == target);
        self.deferred = kept;
        taken
    }
}

/// Keeps a name on the resolution chain until dropped
struct Lookup<'a> {
    stack: &'a RefCell<ResolutionStack>,
}

impl<'a> Lookup<'a> {
    fn enter(stack: &'a RefCell<ResolutionStack>, name: &str) -> Result<Self, CycleErrorKind> {
        let mut resolution = stack.borrow_mut();
        if let Some(position) = resolution
            .chain
            .iter()
            .position(|(entry, building)| *building && entry == name)
        {
            let path = resolution.chain[position..]
                .iter()
                .map(|(entry, _)| entry.clone())
                .chain(Some(name.to_owned()))
                .collect();
            return Err(CycleErrorKind::CyclicDependency { path });
        }
        resolution.chain.push((name.to_owned(), true));
        Ok(Self { stack })
    }

    /// Marks the raw instance as built, the name stays on the chain while the instance is wired
    fn built(&self) {
        if let Some((_, building)) = self.stack.borrow_mut().chain.last_mut() {
            *building = false;
        }
    }
}

impl Drop for Lookup<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().chain.pop();
    }
}

struct FactoryInner {
    definitions: RwLock<DefinitionStore>,
    types: Arc<dyn TypeLoader>,
    cache: InstanceCache,
    config: Config,
    // Held for a whole resolution chain, so other threads never observe a component being wired
    resolution: ReentrantMutex<RefCell<ResolutionStack>>,
}

/// Produces named components from their definitions, wiring references between them.
///
/// Components produced from a definition are singletons: the first lookup builds, wires and caches
/// the instance, the following ones return the cached instance.
/// Cloning the factory is cheap, clones share definitions and cache.
#[derive(Clone)]
pub struct BeanFactory {
    inner: Arc<FactoryInner>,
}

impl BeanFactory {
    /// Creates a factory without definitions, caching instances in memory
    #[inline]
    #[must_use]
    pub fn new(types: impl TypeLoader + 'static) -> Self {
        Self::builder(types).build()
    }

    #[inline]
    #[must_use]
    pub fn builder(types: impl TypeLoader + 'static) -> BeanFactoryBuilder {
        BeanFactoryBuilder {
            types: Arc::new(types),
            definitions: DefinitionStore::new(),
            cache_backend: None,
            config: Config::default(),
        }
    }

    /// Gets a component by name, see [`Self::try_get_component_with`].
    /// Returns `None` if it can't be produced, the reason is logged.
    #[inline]
    #[must_use]
    pub fn get_component(&self, name: &str) -> Option<Object> {
        self.get_component_with(name, Args::new(), false)
    }

    /// Same as [`Self::get_component`], with the arguments for the type-name fallback
    #[inline]
    #[must_use]
    pub fn get_component_with(&self, name: &str, params: Args, as_singleton: bool) -> Option<Object> {
        match self.try_get_component_with(name, params, as_singleton) {
            Ok(instance) => Some(instance),
            Err(err) => {
                debug!(name, "Component not produced: {}", err);
                None
            }
        }
    }

    /// Gets a component by name and checks its type
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Component<T>> {
        self.try_get(name).ok()
    }

    /// # Errors
    /// Same as [`Self::try_get_component`], or [`ResolveErrorKind::IncorrectType`] if the component isn't a `T`
    pub fn try_get<T: Send + Sync + 'static>(&self, name: &str) -> ResolveResult<Component<T>> {
        let instance = self.try_get_component(name)?;
        let actual = instance.type_info().name;
        match instance.downcast() {
            Some(component) => Ok(component),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    expected: type_name::<T>(),
                    actual,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// # Errors
    /// See [`Self::try_get_component_with`]
    #[inline]
    pub fn try_get_component(&self, name: &str) -> ResolveResult<Object> {
        self.try_get_component_with(name, Args::new(), false)
    }

    /// Gets a component by name.
    ///
    /// A cached instance is returned as is. Otherwise the component is built from its definition,
    /// cached, then its properties are bound and its post-construct methods called.
    /// Caching before binding lets components reference each other through properties.
    ///
    /// A name without a definition is instantiated as a type name (see [`Config::type_fallback`]),
    /// passing `params` to its constructor. Such instances aren't wired and are cached only if `as_singleton` is set.
    /// `params` and `as_singleton` are ignored for names with a definition.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::NotFound`] if the name has no definition and isn't a loadable type name
    /// - Returns [`ResolveErrorKind::Definition`] if the definition has no valid creation strategy
    /// - Returns [`ResolveErrorKind::TypeNotLoadable`] if the type or factory type can't be loaded
    /// - Returns [`ResolveErrorKind::Member`] if the factory method doesn't exist
    /// - Returns [`ResolveErrorKind::Construction`] if a constructor or a factory method fails
    /// - Returns [`ResolveErrorKind::Reference`] if a constructor or factory method argument references a component that can't be produced
    /// - Returns [`ResolveErrorKind::Cycle`] if the component is requested again while its instance is being built
    pub fn try_get_component_with(&self, name: &str, params: Args, as_singleton: bool) -> ResolveResult<Object> {
        let span = info_span!("get_component", name);
        let _guard = span.enter();

        let resolution = self.inner.resolution.lock();

        if let Some(instance) = self.inner.cache.get(name) {
            debug!("Found in cache");
            return Ok(instance);
        }
        debug!("Not found in cache");

        let definition = self.inner.definitions.read().get(name).cloned();
        let Some(definition) = definition else {
            return self.create_by_type_name(name, params, as_singleton);
        };
        if !params.is_empty() {
            debug!("Component has a definition, params ignored");
        }

        let lookup = match Lookup::enter(&resolution, name) {
            Ok(lookup) => lookup,
            Err(err) => {
                error!("{}", err);
                return Err(err.into());
            }
        };
        let built = InstanceBuilder::new(self, name).build(&definition);
        lookup.built();

        let deferred = resolution.borrow_mut().take_deferred(name);
        let built = match built {
            Ok(built) => built,
            Err(err) => {
                deferred.into_iter().for_each(DeferredBinding::discard);
                return Err(err);
            }
        };

        self.inner.cache.set(name, built.instance.clone());
        debug!("Cached");

        // Components bound while this one was built get their back references now
        for binding in deferred {
            binding.apply(&built.instance);
        }

        PropertyBinder::new(self, name).bind(&built, &definition);
        LifecycleInvoker::new(self, name).invoke(&built, &definition);

        Ok(built.instance)
    }

    fn create_by_type_name(&self, name: &str, params: Args, as_singleton: bool) -> ResolveResult<Object> {
        let types = &self.inner.types;
        let descriptor = if self.inner.config.type_fallback && types.exists(name) {
            types.load(name)
        } else {
            None
        };
        let Some(descriptor) = descriptor else {
            let err = ResolveErrorKind::NotFound { name: name.to_owned() };
            error!("{}", err);
            return Err(err);
        };
        debug!("Definition not found, instantiating by type name");

        let result = if params.is_empty() {
            descriptor.new_instance()
        } else {
            descriptor.new_instance_args(params)
        };
        let instance = match result {
            Ok(instance) => instance,
            Err(source) => {
                let err = ResolveErrorKind::Construction {
                    name: name.to_owned(),
                    source,
                };
                error!("{}", err);
                return Err(err);
            }
        };

        if as_singleton {
            self.inner.cache.set(name, instance.clone());
            debug!("Cached as singleton");
        }
        Ok(instance)
    }

    /// Adds definitions, overwriting the ones with the same names.
    /// Instances already cached aren't affected, see [`Self::evict`].
    pub fn add_definitions<I, K>(&self, definitions: I)
    where
        I: IntoIterator<Item = (K, ComponentDefinition)>,
        K: Into<String>,
    {
        self.inner.definitions.write().merge(definitions);
    }

    /// Replaces all definitions. Instances already cached aren't affected, see [`Self::clear_cache`].
    pub fn set_definitions<I, K>(&self, definitions: I)
    where
        I: IntoIterator<Item = (K, ComponentDefinition)>,
        K: Into<String>,
    {
        self.inner.definitions.write().replace(definitions);
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<ComponentDefinition> {
        self.inner.definitions.read().get(name).cloned()
    }

    /// Snapshot of the current definitions
    #[must_use]
    pub fn definitions(&self) -> DefinitionStore {
        self.inner.definitions.read().clone()
    }

    #[inline]
    #[must_use]
    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.has(name)
    }

    /// Removes the cached instance, the next lookup builds a new one.
    /// Components already holding the instance keep it.
    pub fn evict(&self, name: &str) -> bool {
        let _resolution = self.inner.resolution.lock();
        let evicted = self.inner.cache.evict(name);
        debug!(name, evicted, "Evicted");
        evicted
    }

    /// Removes every instance cached by this factory, leaving other keys of the cache backend intact
    pub fn clear_cache(&self) {
        let _resolution = self.inner.resolution.lock();
        self.inner.cache.clear();
        debug!("Cache cleared");
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[inline]
    #[must_use]
    pub(crate) fn types(&self) -> &dyn TypeLoader {
        &*self.inner.types
    }

    /// Whether the raw instance of `name` is being built on the current thread's resolution chain
    pub(crate) fn is_building(&self, name: &str) -> bool {
        let resolution = self.inner.resolution.lock();
        let building = resolution.borrow().is_building(name);
        building
    }

    pub(crate) fn defer_binding(&self, binding: DeferredBinding) {
        let resolution = self.inner.resolution.lock();
        resolution.borrow_mut().deferred.push(binding);
    }
}

impl fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanFactory")
            .field("definitions", &self.inner.definitions.read().len())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

pub struct BeanFactoryBuilder {
    types: Arc<dyn TypeLoader>,
    definitions: DefinitionStore,
    cache_backend: Option<Arc<dyn CacheBackend>>,
    config: Config,
}

impl BeanFactoryBuilder {
    /// Adds definitions, overwriting the ones with the same names
    #[must_use]
    pub fn definitions<I, K>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = (K, ComponentDefinition)>,
        K: Into<String>,
    {
        self.definitions.merge(definitions);
        self
    }

    /// Cache to keep instances in, [`MemoryCache`] by default
    #[must_use]
    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn build(self) -> BeanFactory {
        let backend = self.cache_backend.unwrap_or_else(|| Arc::new(MemoryCache::new()));
        BeanFactory {
            inner: Arc::new(FactoryInner {
                definitions: RwLock::new(self.definitions),
                types: self.types,
                cache: InstanceCache::new(backend, self.config.cache_prefix.clone()),
                config: self.config,
                resolution: ReentrantMutex::new(RefCell::new(ResolutionStack::default())),
            }),
        }
    }
}

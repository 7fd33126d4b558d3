pub(crate) mod any;
pub(crate) mod binder;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod definition;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod instantiator;
pub(crate) mod lifecycle;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod service;
pub(crate) mod value;

pub use any::{Component, Object, TypeInfo};
pub use cache::{CacheBackend, MemoryCache};
pub use config::{Config, DEFAULT_CACHE_PREFIX};
pub use container::{BeanFactory, BeanFactoryBuilder};
pub use definition::{ComponentDefinition, DefinitionStore};
pub use descriptor::{Field, Method, TypeDescriptor, TypeDescriptorBuilder, Visibility};
pub use errors::{
    CycleErrorKind, DefinitionErrorKind, InstantiateErrorKind, MemberErrorKind, ResolveErrorKind, ResolveResult, ValueErrorKind,
};
pub use registry::{TypeLoader, TypeRegistry};
pub use resolver::{parse_reference, REFERENCE_PREFIX};
pub use value::{Args, Value};

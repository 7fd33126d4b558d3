use serde_json::Value as Json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    any::Object,
    container::BeanFactory,
    definition::{invalid_value, ComponentDefinition, Key, Strategy},
    descriptor::TypeDescriptor,
    errors::{DefinitionErrorKind, InstantiateErrorKind, MemberErrorKind, ResolveErrorKind, ResolveResult},
    resolver::ValueResolver,
    value::Value,
};

/// Freshly produced instance with the descriptor of its runtime type,
/// used to bind its properties and call its post-construct methods
pub(crate) struct Built {
    pub(crate) instance: Object,
    pub(crate) descriptor: Arc<TypeDescriptor>,
}

/// Produces an unwired instance of a component, either by constructing its type or by calling a factory method
pub(crate) struct InstanceBuilder<'a> {
    factory: &'a BeanFactory,
    name: &'a str,
}

impl<'a> InstanceBuilder<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(factory: &'a BeanFactory, name: &'a str) -> Self {
        Self { factory, name }
    }

    pub(crate) fn build(&self, definition: &ComponentDefinition) -> ResolveResult<Built> {
        let strategy = match definition.strategy(self.name) {
            Ok(strategy) => strategy,
            Err(err) => {
                error!("{}", err);
                return Err(err.into());
            }
        };

        match strategy {
            Strategy::Construct { type_name } => self.construct(type_name, definition),
            Strategy::Factory {
                factory_type,
                factory_method,
            } => self.produce(factory_type, factory_method, definition),
        }
    }

    fn construct(&self, type_name: &str, definition: &ComponentDefinition) -> ResolveResult<Built> {
        let descriptor = self.load(type_name)?;
        let args = ValueResolver::new(self.factory, self.name).resolve_args(definition, Key::ConstructorArgs)?;

        let result = match args {
            Some(args) => descriptor.new_instance_args(args),
            None => descriptor.new_instance(),
        };
        let instance = result.map_err(|err| self.construction_error(err))?;
        debug!(type_name, "Constructed");

        Ok(Built { instance, descriptor })
    }

    fn produce(&self, factory_type: &str, factory_method: Option<&Json>, definition: &ComponentDefinition) -> ResolveResult<Built> {
        let factory_descriptor = self.load(factory_type)?;

        let Some(factory_method) = factory_method else {
            let err = DefinitionErrorKind::NoFactoryMethod {
                name: self.name.to_owned(),
            };
            error!("{}", err);
            return Err(err.into());
        };
        let Some(factory_method) = factory_method.as_str() else {
            let err = invalid_value(self.name, Key::FactoryMethod, "a method name");
            error!("{}", err);
            return Err(err.into());
        };
        let Some(method) = factory_descriptor.method(factory_method) else {
            let err = MemberErrorKind::NoFactoryMethod {
                type_name: factory_type.to_owned(),
                method: factory_method.to_owned(),
            };
            error!("{}", err);
            return Err(err.into());
        };

        let args = ValueResolver::new(self.factory, self.name)
            .resolve_args(definition, Key::FactoryMethodArgs)?
            .unwrap_or_default();

        let result = if method.is_static() {
            method.invoke(None, args)
        } else {
            // The factory instance is only used for this call and isn't cached
            let factory = factory_descriptor.new_instance().map_err(|err| self.construction_error(err))?;
            debug!(factory_type, "Factory instantiated");
            method.invoke(Some(&factory), args)
        };
        let produced = result.map_err(|err| self.construction_error(err))?;

        let Value::Object(instance) = produced else {
            return Err(self.construction_error(InstantiateErrorKind::NotAnInstance {
                method: factory_method.to_owned(),
            }));
        };
        debug!(factory_type, factory_method, "Produced by factory method");

        let type_info = instance.type_info();
        let descriptor = self
            .factory
            .types()
            .load_by_id(type_info.id)
            .unwrap_or_else(|| Arc::new(TypeDescriptor::opaque(type_info)));

        Ok(Built { instance, descriptor })
    }

    fn load(&self, type_name: &str) -> ResolveResult<Arc<TypeDescriptor>> {
        let types = self.factory.types();
        match types.exists(type_name).then(|| types.load(type_name)).flatten() {
            Some(descriptor) => Ok(descriptor),
            None => {
                let err = ResolveErrorKind::TypeNotLoadable {
                    name: self.name.to_owned(),
                    type_name: type_name.to_owned(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn construction_error(&self, source: InstantiateErrorKind) -> ResolveErrorKind {
        let err = ResolveErrorKind::Construction {
            name: self.name.to_owned(),
            source,
        };
        error!("{}", err);
        err
    }
}

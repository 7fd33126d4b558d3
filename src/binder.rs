use tracing::{debug, error, info};

use crate::{
    any::Object,
    container::BeanFactory,
    definition::{invalid_value, ComponentDefinition, Key},
    descriptor::{Field, Visibility},
    errors::MemberErrorKind,
    instantiator::Built,
    resolver::{parse_reference, ValueResolver},
    value::Value,
};

/// Property of a bound instance referencing a component whose raw instance is still being built.
/// It's set once that component is cached.
pub(crate) struct DeferredBinding {
    pub(crate) target: String,
    component: String,
    field_name: String,
    field: Field,
    instance: Object,
}

impl DeferredBinding {
    pub(crate) fn apply(self, target: &Object) {
        let component = self.component.as_str();
        let field = self.field_name.as_str();
        match self.field.set(&self.instance, Value::Object(target.clone())) {
            Ok(()) => debug!(component, field, "Deferred property bound"),
            Err(err) => error!(component, field, "Property skipped: {}", err),
        }
    }

    pub(crate) fn discard(self) {
        debug!(
            component = self.component.as_str(),
            field = self.field_name.as_str(),
            "Deferred property skipped, `{}` wasn't produced",
            self.target,
        );
    }
}

/// Sets the declared properties on a built instance.
///
/// Binding is best effort: a property that can't be resolved, doesn't match a field
/// or is rejected by its setter is logged and skipped, the rest are still bound.
pub(crate) struct PropertyBinder<'a> {
    factory: &'a BeanFactory,
    name: &'a str,
}

impl<'a> PropertyBinder<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(factory: &'a BeanFactory, name: &'a str) -> Self {
        Self { factory, name }
    }

    pub(crate) fn bind(&self, built: &Built, definition: &ComponentDefinition) {
        let Some(properties) = definition.get(Key::Properties) else {
            info!("Component doesn't define any properties");
            return;
        };
        let Some(properties) = properties.as_object() else {
            let err = invalid_value(self.name, Key::Properties, "a mapping of field names to values");
            error!("{}", err);
            return;
        };

        let resolver = ValueResolver::new(self.factory, self.name);
        for (field_name, raw) in properties {
            let building = raw
                .as_str()
                .and_then(parse_reference)
                .filter(|target| self.factory.is_building(target));
            if let Some(target) = building {
                let Some(field) = self.field(built, field_name) else {
                    continue;
                };
                self.factory.defer_binding(DeferredBinding {
                    target: target.to_owned(),
                    component: self.name.to_owned(),
                    field_name: field_name.clone(),
                    field: field.clone(),
                    instance: built.instance.clone(),
                });
                debug!(field = field_name.as_str(), reference = target, "Property deferred until the referenced component is cached");
                continue;
            }

            // The value is resolved before the instance is touched, references may lead back to it
            let value = match resolver.resolve(raw) {
                Ok(value) => value,
                Err(err) => {
                    debug!(field = field_name.as_str(), "Property skipped: {}", err);
                    continue;
                }
            };

            let Some(field) = self.field(built, field_name) else {
                continue;
            };
            match field.set(&built.instance, value) {
                Ok(()) => debug!(field = field_name.as_str(), "Property bound"),
                Err(err) => error!(field = field_name.as_str(), "Property skipped: {}", err),
            }
        }
    }

    fn field<'b>(&self, built: &'b Built, field_name: &str) -> Option<&'b Field> {
        let Some(field) = built.descriptor.field(field_name) else {
            let err = MemberErrorKind::NoField {
                type_name: built.descriptor.name().to_owned(),
                field: field_name.to_owned(),
            };
            error!("{}", err);
            return None;
        };
        if field.visibility() == Visibility::Private {
            debug!(field = field_name, "Forcing access to non-public field");
        }
        Some(field)
    }
}

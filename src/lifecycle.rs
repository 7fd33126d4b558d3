use tracing::{debug, error};

use crate::{
    container::BeanFactory,
    definition::{invalid_value, ComponentDefinition, Key},
    errors::MemberErrorKind,
    instantiator::Built,
    resolver::ValueResolver,
};

/// Calls the post-construct methods of a bound instance in declaration order.
/// A failing method is logged and doesn't prevent the following ones from being called.
pub(crate) struct LifecycleInvoker<'a> {
    factory: &'a BeanFactory,
    name: &'a str,
}

impl<'a> LifecycleInvoker<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(factory: &'a BeanFactory, name: &'a str) -> Self {
        Self { factory, name }
    }

    pub(crate) fn invoke(&self, built: &Built, definition: &ComponentDefinition) {
        let Some(methods) = definition.get(Key::PostConstruct) else {
            return;
        };
        let Some(methods) = methods.as_object() else {
            let err = invalid_value(self.name, Key::PostConstruct, "a mapping of method names to arguments");
            error!("{}", err);
            return;
        };

        let resolver = ValueResolver::new(self.factory, self.name);
        for (method_name, raw_args) in methods {
            let Some(method) = built.descriptor.method(method_name) else {
                let err = MemberErrorKind::NoMethod {
                    type_name: built.descriptor.name().to_owned(),
                    method: method_name.clone(),
                };
                error!("{}", err);
                continue;
            };
            let args = match resolver.resolve_call_args(raw_args) {
                Ok(args) => args,
                Err(err) => {
                    debug!(method = method_name.as_str(), "Post-construct call skipped: {}", err);
                    continue;
                }
            };

            match method.invoke(Some(&built.instance), args) {
                Ok(_) => debug!(method = method_name.as_str(), "Post-construct method called"),
                Err(err) => error!(method = method_name.as_str(), "Post-construct method failed: {}", err),
            }
        }
    }
}

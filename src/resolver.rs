use serde_json::Value as Json;
use tracing::{debug, error};

use crate::{
    container::BeanFactory,
    definition::{invalid_value, ComponentDefinition, Key},
    errors::{ResolveErrorKind, ResolveResult},
    value::{Args, Value},
};

pub const REFERENCE_PREFIX: &str = "ref";

/// Parses a `ref:<name>` reference, returning the trimmed name of the referenced component.
///
/// Only the part before the first `:` is checked, so a literal string starting with `ref:`
/// can't be expressed. A string without `:` is never a reference.
#[must_use]
pub fn parse_reference(raw: &str) -> Option<&str> {
    let (prefix, name) = raw.split_once(':')?;
    (prefix == REFERENCE_PREFIX).then(|| name.trim())
}

/// Turns raw definition values into runtime values, resolving references through the factory
pub(crate) struct ValueResolver<'a> {
    factory: &'a BeanFactory,
    component: &'a str,
}

impl<'a> ValueResolver<'a> {
    #[inline]
    #[must_use]
    pub(crate) const fn new(factory: &'a BeanFactory, component: &'a str) -> Self {
        Self { factory, component }
    }

    /// Only a top-level string is checked for a reference, nested lists and mappings are literals
    pub(crate) fn resolve(&self, raw: &Json) -> ResolveResult<Value> {
        let Some(reference) = raw.as_str().and_then(parse_reference) else {
            return Ok(Value::Literal(raw.clone()));
        };
        debug!(reference, "Resolving reference");

        match self.factory.try_get_component(reference) {
            Ok(instance) => Ok(Value::Object(instance)),
            Err(err) => Err(ResolveErrorKind::Reference {
                name: reference.to_owned(),
                source: Box::new(err),
            }),
        }
    }

    /// Resolves the argument block under `key`.
    /// Returns `None` ("no arguments") if the block is absent or malformed, the latter is logged.
    pub(crate) fn resolve_args(&self, definition: &ComponentDefinition, key: Key) -> ResolveResult<Option<Args>> {
        let Some(raw) = definition.get(key) else {
            debug!("No `{}` defined", key.name());
            return Ok(None);
        };
        if !(raw.is_object() || raw.is_array()) {
            let err = invalid_value(self.component, key, "a mapping or a list of arguments");
            error!("{}", err);
            return Ok(None);
        }
        self.resolve_collection(raw).map(Some)
    }

    /// Resolves arguments of a method call: `null` is a call without arguments,
    /// a single value is wrapped into a one-element list
    pub(crate) fn resolve_call_args(&self, raw: &Json) -> ResolveResult<Args> {
        match raw {
            Json::Null => Ok(Args::new()),
            Json::Array(_) | Json::Object(_) => self.resolve_collection(raw),
            single => Ok(Args::new().with_positional(self.resolve(single)?)),
        }
    }

    fn resolve_collection(&self, raw: &Json) -> ResolveResult<Args> {
        let mut args = Args::new();
        match raw {
            Json::Object(entries) => {
                for (name, value) in entries {
                    args.push_named(name.as_str(), self.resolve(value)?);
                }
            }
            Json::Array(values) => {
                for value in values {
                    args.push(self.resolve(value)?);
                }
            }
            single => args.push(self.resolve(single)?),
        }
        Ok(args)
    }
}

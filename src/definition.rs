use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::errors::DefinitionErrorKind;

/// Keys of a component definition.
/// Each key is also accepted under its legacy alias (`class`, `construct-args`, `props`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Type,
    ConstructorArgs,
    FactoryType,
    FactoryMethod,
    FactoryMethodArgs,
    Properties,
    PostConstruct,
}

impl Key {
    #[must_use]
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Key::Type => "type",
            Key::ConstructorArgs => "constructorArgs",
            Key::FactoryType => "factoryType",
            Key::FactoryMethod => "factoryMethod",
            Key::FactoryMethodArgs => "factoryMethodArgs",
            Key::Properties => "properties",
            Key::PostConstruct => "postConstruct",
        }
    }

    #[must_use]
    const fn alias(self) -> &'static str {
        match self {
            Key::Type => "class",
            Key::ConstructorArgs => "construct-args",
            Key::FactoryType => "factory-class",
            Key::FactoryMethod => "factory-method",
            Key::FactoryMethodArgs => "factory-method-args",
            Key::Properties => "props",
            Key::PostConstruct => "functions",
        }
    }
}

pub(crate) enum Strategy<'a> {
    Construct {
        type_name: &'a str,
    },
    Factory {
        factory_type: &'a str,
        factory_method: Option<&'a Json>,
    },
}

/// Declarative recipe of one component.
///
/// The raw mapping is kept as is and validated lazily, when the component is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentDefinition {
    raw: Json,
}

impl Default for ComponentDefinition {
    fn default() -> Self {
        Self { raw: Json::Object(Map::new()) }
    }
}

impl ComponentDefinition {
    /// Definition constructing the component directly from a type
    #[must_use]
    pub fn with_type(type_name: impl Into<String>) -> Self {
        let mut raw = Map::new();
        raw.insert(Key::Type.name().to_owned(), Json::String(type_name.into()));
        Self { raw: Json::Object(raw) }
    }

    /// Definition producing the component by calling a method of a factory type
    #[must_use]
    pub fn with_factory(factory_type: impl Into<String>, factory_method: impl Into<String>) -> Self {
        let mut raw = Map::new();
        raw.insert(Key::FactoryType.name().to_owned(), Json::String(factory_type.into()));
        raw.insert(Key::FactoryMethod.name().to_owned(), Json::String(factory_method.into()));
        Self { raw: Json::Object(raw) }
    }

    #[inline]
    #[must_use]
    pub const fn from_value(raw: Json) -> Self {
        Self { raw }
    }

    #[inline]
    #[must_use]
    pub const fn as_value(&self) -> &Json {
        &self.raw
    }

    #[must_use]
    pub fn constructor_arg(self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.insert_nested(Key::ConstructorArgs, name.into(), value.into())
    }

    #[must_use]
    pub fn factory_method_arg(self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.insert_nested(Key::FactoryMethodArgs, name.into(), value.into())
    }

    #[must_use]
    pub fn property(self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.insert_nested(Key::Properties, name.into(), value.into())
    }

    /// Adds a method called after properties are bound.
    /// `args` is `null` for a call without arguments, a list, a mapping or a single value.
    #[must_use]
    pub fn post_construct(self, method: impl Into<String>, args: impl Into<Json>) -> Self {
        self.insert_nested(Key::PostConstruct, method.into(), args.into())
    }

    pub(crate) fn get(&self, key: Key) -> Option<&Json> {
        let raw = self.raw.as_object()?;
        raw.get(key.name()).or_else(|| raw.get(key.alias()))
    }

    pub(crate) fn strategy(&self, name: &str) -> Result<Strategy<'_>, DefinitionErrorKind> {
        if !self.raw.is_object() {
            return Err(DefinitionErrorKind::NotAMapping { name: name.to_owned() });
        }

        if let Some(type_name) = self.get(Key::Type) {
            return match type_name.as_str() {
                Some(type_name) => Ok(Strategy::Construct { type_name }),
                None => Err(invalid_value(name, Key::Type, "a type name")),
            };
        }

        if let Some(factory_type) = self.get(Key::FactoryType) {
            return match factory_type.as_str() {
                Some(factory_type) => Ok(Strategy::Factory {
                    factory_type,
                    factory_method: self.get(Key::FactoryMethod),
                }),
                None => Err(invalid_value(name, Key::FactoryType, "a type name")),
            };
        }

        Err(DefinitionErrorKind::NoStrategy { name: name.to_owned() })
    }

    fn insert_nested(mut self, key: Key, name: String, value: Json) -> Self {
        if !self.raw.is_object() {
            self.raw = Json::Object(Map::new());
        }
        if let Json::Object(raw) = &mut self.raw {
            let key_name = if !raw.contains_key(key.name()) && raw.contains_key(key.alias()) {
                key.alias()
            } else {
                key.name()
            };
            let block = raw.entry(key_name).or_insert_with(|| Json::Object(Map::new()));
            if !block.is_object() {
                *block = Json::Object(Map::new());
            }
            if let Json::Object(block) = block {
                block.insert(name, value);
            }
        }
        self
    }
}

#[must_use]
pub(crate) fn invalid_value(name: &str, key: Key, expected: &'static str) -> DefinitionErrorKind {
    DefinitionErrorKind::InvalidValue {
        name: name.to_owned(),
        key: key.name(),
        expected,
    }
}

/// Mapping from component name to its definition, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionStore {
    definitions: IndexMap<String, ComponentDefinition>,
}

impl DefinitionStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses definitions from a JSON object keyed by component name.
    /// Definitions themselves aren't validated here.
    ///
    /// # Errors
    /// Returns an error if the source isn't a JSON object
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// # Errors
    /// Returns an error if the value isn't a JSON object
    pub fn from_value(value: Json) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Adds or overwrites definitions by name, keeping the other ones
    pub fn merge<I, K>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = (K, ComponentDefinition)>,
        K: Into<String>,
    {
        for (name, definition) in definitions {
            self.definitions.insert(name.into(), definition);
        }
    }

    /// Replaces all definitions
    pub fn replace<I, K>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = (K, ComponentDefinition)>,
        K: Into<String>,
    {
        self.definitions.clear();
        self.merge(definitions);
    }

    pub fn remove(&mut self, name: &str) -> Option<ComponentDefinition> {
        self.definitions.shift_remove(name)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

impl IntoIterator for DefinitionStore {
    type Item = (String, ComponentDefinition);
    type IntoIter = indexmap::map::IntoIter<String, ComponentDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, ComponentDefinition)> for DefinitionStore {
    fn from_iter<I: IntoIterator<Item = (K, ComponentDefinition)>>(iter: I) -> Self {
        let mut store = Self::new();
        store.merge(iter);
        store
    }
}

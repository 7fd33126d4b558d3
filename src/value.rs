use serde::de::DeserializeOwned;

use crate::{
    any::{Component, Object},
    errors::ValueErrorKind,
};

/// A resolved definition value: either a literal taken from the definition as is,
/// or an instance produced by resolving a `ref:<name>` reference.
#[derive(Debug, Clone)]
pub enum Value {
    Literal(serde_json::Value),
    Object(Object),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(serde_json::Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Literal(serde_json::Value::Null))
    }

    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            Self::Literal(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_literal(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Literal(literal) => Some(literal),
            Self::Object(_) => None,
        }
    }

    /// # Errors
    /// Returns [`ValueErrorKind::ExpectedObject`] for literals
    pub fn into_object(self) -> Result<Object, ValueErrorKind> {
        match self {
            Self::Object(object) => Ok(object),
            Self::Literal(_) => Err(ValueErrorKind::ExpectedObject),
        }
    }

    /// # Errors
    /// Returns an error for literals and for instances of another type
    pub fn component<T: Send + Sync + 'static>(self) -> Result<Component<T>, ValueErrorKind> {
        let object = self.into_object()?;
        let actual = object.type_info().name;
        object.downcast().ok_or(ValueErrorKind::IncorrectType {
            expected: core::any::type_name::<T>(),
            actual,
        })
    }

    /// # Errors
    /// Returns an error for instances and for literals of another shape
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ValueErrorKind> {
        match self {
            Self::Literal(literal) => serde_json::from_value(literal).map_err(Into::into),
            Self::Object(object) => Err(ValueErrorKind::ExpectedLiteral {
                actual: object.type_info().name,
            }),
        }
    }
}

impl From<serde_json::Value> for Value {
    #[inline]
    fn from(value: serde_json::Value) -> Self {
        Self::Literal(value)
    }
}

impl From<Object> for Value {
    #[inline]
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl<T> From<Component<T>> for Value {
    #[inline]
    fn from(value: Component<T>) -> Self {
        Self::Object(value.into_object())
    }
}

impl From<()> for Value {
    #[inline]
    fn from((): ()) -> Self {
        Self::null()
    }
}

/// Resolved arguments of a constructor or method call, in declaration order.
///
/// Arguments declared as a mapping are named, arguments declared as a list are positional only.
#[derive(Debug, Clone, Default)]
pub struct Args {
    entries: Vec<(Option<String>, Value)>,
}

impl Args {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_named(name, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    #[inline]
    pub fn push_named(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((Some(name.into()), value.into()));
    }

    #[inline]
    pub fn push(&mut self, value: impl Into<Value>) {
        self.entries.push((None, value.into()));
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_deref() == Some(name))
            .map(|(_, value)| value)
    }

    #[inline]
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Looks the argument up by name, falling back to its position
    #[must_use]
    pub fn param(&self, index: usize, name: &str) -> Option<&Value> {
        self.get(name).or_else(|| self.nth(index))
    }

    /// # Errors
    /// Returns [`ValueErrorKind::MissingArgument`] if there is no argument with the name
    pub fn require(&self, name: &str) -> Result<&Value, ValueErrorKind> {
        self.get(name).ok_or_else(|| ValueErrorKind::MissingArgument { name: name.to_owned() })
    }

    /// # Errors
    /// Returns an error if the argument is missing or isn't an instance of `T`
    pub fn component<T: Send + Sync + 'static>(&self, name: &str) -> Result<Component<T>, ValueErrorKind> {
        self.require(name)?.clone().component()
    }

    /// # Errors
    /// Returns an error if the argument is missing or can't be deserialized as `T`
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<T, ValueErrorKind> {
        self.require(name)?.clone().deserialize()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_deref(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl IntoIterator for Args {
    type Item = (Option<String>, Value);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Args, Value};
    use crate::{any::Object, errors::ValueErrorKind};

    struct Mailer;

    #[test]
    fn test_args_lookup() {
        let args = Args::new()
            .with("host", json!("localhost"))
            .with("port", json!(25))
            .with_positional(json!(true));

        assert_eq!(args.len(), 3);
        assert_eq!(args.deserialize::<u16>("port").unwrap(), 25);
        assert_eq!(args.param(0, "host").and_then(Value::as_literal), Some(&json!("localhost")));
        assert_eq!(args.param(2, "tls").and_then(Value::as_literal), Some(&json!(true)));
        assert!(matches!(args.require("user"), Err(ValueErrorKind::MissingArgument { name }) if name == "user"));
    }

    #[test]
    fn test_value_conversions() {
        let object = Object::new(Mailer);
        let value = Value::from(object.clone());

        assert!(value.clone().component::<Mailer>().unwrap().ptr_eq(&object));
        assert!(matches!(value.clone().component::<u8>(), Err(ValueErrorKind::IncorrectType { .. })));
        assert!(matches!(value.deserialize::<u8>(), Err(ValueErrorKind::ExpectedLiteral { .. })));
        assert!(matches!(Value::from(json!(1)).into_object(), Err(ValueErrorKind::ExpectedObject)));
        assert!(Value::from(()).is_null());
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionErrorKind {
    #[error("Component `{name}` definition error, need `type` or `factoryType` in component definition")]
    NoStrategy { name: String },
    #[error("Component `{name}` definition is not a mapping")]
    NotAMapping { name: String },
    #[error("Component `{name}` uses a factory type, but doesn't define `factoryMethod`")]
    NoFactoryMethod { name: String },
    #[error("Component `{name}` definition error, `{key}` must be {expected}")]
    InvalidValue {
        name: String,
        key: &'static str,
        expected: &'static str,
    },
}

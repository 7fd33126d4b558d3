#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Type `{type_name}` has no constructor")]
    NoConstructor { type_name: String },
    #[error("Type `{type_name}` has no constructor taking arguments, {count} given")]
    UnexpectedArguments { type_name: String, count: usize },
    #[error("Incorrect instance type. Actual: {actual}, expected: {expected}")]
    IncorrectType { expected: &'static str, actual: &'static str },
    #[error("Method `{method}` is an instance method and needs an instance to be called on")]
    NoReceiver { method: String },
    #[error("Factory method `{method}` returned a literal instead of an instance")]
    NotAnInstance { method: String },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

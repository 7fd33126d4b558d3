#[derive(thiserror::Error, Debug)]
pub enum ValueErrorKind {
    #[error("Argument `{name}` not found")]
    MissingArgument { name: String },
    #[error("Expected an instance, found a literal")]
    ExpectedObject,
    #[error("Expected a literal, found an instance of {actual}")]
    ExpectedLiteral { actual: &'static str },
    #[error("Incorrect instance type. Actual: {actual}, expected: {expected}")]
    IncorrectType { expected: &'static str, actual: &'static str },
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
}

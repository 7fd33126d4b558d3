#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemberErrorKind {
    #[error("Factory method `{method}` doesn't exist in type `{type_name}`")]
    NoFactoryMethod { type_name: String, method: String },
    #[error("Type `{type_name}` doesn't have method `{method}`")]
    NoMethod { type_name: String, method: String },
    #[error("Type `{type_name}` doesn't have field `{field}`")]
    NoField { type_name: String, field: String },
}

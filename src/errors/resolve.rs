use core::fmt::{self, Display, Formatter};

use super::{definition::DefinitionErrorKind, instantiate::InstantiateErrorKind, member::MemberErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("`{name}` is not a component name or a loadable type name, check your definitions or type name")]
    NotFound { name: String },
    #[error(transparent)]
    Definition(#[from] DefinitionErrorKind),
    #[error("Type `{type_name}` of component `{name}` can't be loaded, check your component definition")]
    TypeNotLoadable { name: String, type_name: String },
    #[error(transparent)]
    Member(#[from] MemberErrorKind),
    #[error("Can't create component `{name}`: {source}")]
    Construction { name: String, source: InstantiateErrorKind },
    #[error(transparent)]
    Cycle(#[from] CycleErrorKind),
    #[error("Reference to `{name}` can't be resolved")]
    Reference { name: String, source: Box<ResolveErrorKind> },
    #[error("Incorrect component type. Actual: {actual}, expected: {expected}")]
    IncorrectType { expected: &'static str, actual: &'static str },
}

#[derive(thiserror::Error, Debug)]
pub enum CycleErrorKind {
    CyclicDependency { path: Box<[String]> },
}

impl Display for CycleErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CycleErrorKind::CyclicDependency { path } => {
                write!(f, "Cyclic dependency detected: ")?;
                for (index, name) in path.iter().enumerate() {
                    if index > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{name}")?;
                }
            }
        }
        Ok(())
    }
}

mod definition;
mod instantiate;
mod member;
mod resolve;
mod value;

pub use definition::DefinitionErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use member::MemberErrorKind;
pub use resolve::{CycleErrorKind, ResolveErrorKind};
pub use value::ValueErrorKind;

pub type ResolveResult<T> = Result<T, ResolveErrorKind>;

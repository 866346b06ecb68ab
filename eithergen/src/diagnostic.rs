//! Authoring errors reported against a union declaration. Any diagnostic
//! suppresses generation for its declaration.

use std::fmt;

use eithergen_syntax::model::Location;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum DiagnosticKind {
    /// The union or one of its containing types lacks `partial`.
    #[error("type `{name}` must be declared partial")]
    TypeNotPartial { name: String },

    #[error("type `{name}` must not be static")]
    TypeIsStatic { name: String },

    /// Variants were given by more than one strategy, or by more than one
    /// marker of the same form.
    #[error("type `{name}` specifies its variants more than once")]
    AmbiguousTypeParameters { name: String },

    #[error("type `{name}` has {count} variant(s), at least 2 are required")]
    TooFewTypeParameters { name: String, count: usize },

    #[error("type `{name}` has {count} variants, at most 8 are supported")]
    TooManyTypeParameters { name: String, count: usize },

    #[error("type `{name}` does not specify any variants")]
    NoTypeParameterSpecified { name: String },

    #[error("type `{ty}` is used by more than one variant")]
    TypeAlreadyUsed { ty: String },

    /// A variant given by the marker is an unbound generic, or mentions a type
    /// parameter.
    #[error("open generic type `{ty}` cannot be a variant")]
    OpenGenericNotAllowed { ty: String },

    #[error("`{argument}` is not a `typeof` expression")]
    InvalidVariantArgument { argument: String },
}

impl DiagnosticKind {
    /// Stable identifier for tooling.
    pub fn id(&self) -> &'static str {
        match self {
            Self::TypeNotPartial { .. } => "EG0001",
            Self::TypeIsStatic { .. } => "EG0002",
            Self::AmbiguousTypeParameters { .. } => "EG0003",
            Self::TooFewTypeParameters { .. } => "EG0004",
            Self::TooManyTypeParameters { .. } => "EG0005",
            Self::NoTypeParameterSpecified { .. } => "EG0006",
            Self::TypeAlreadyUsed { .. } => "EG0007",
            Self::OpenGenericNotAllowed { .. } => "EG0008",
            Self::InvalidVariantArgument { .. } => "EG0009",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: error {}: {}", self.location, self.id(), self.kind)
    }
}

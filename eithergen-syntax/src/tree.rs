//! Unbound syntax produced by the parser. Type references in here still carry
//! [`TypeKind::Unknown`](crate::model::TypeKind::Unknown) until the binder
//! resolves them.

use crate::model::{
    AttributeArgument, ConstructorSignature, DeclKind, Location, MethodSignature, Modifier,
    NullableContext, TypeHeader, TypeParameter, TypeRef,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub usings: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub name: String,
    pub usings: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArgumentSyntax {
    Positional(AttributeArgument),
    Named {
        name: String,
        /// The identifiers of a flags expression, `A.X | A.Y` => `[X, Y]`.
        flags: Vec<String>,
        location: Location,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSyntax {
    pub path: Vec<String>,
    pub type_arguments: Vec<TypeRef>,
    pub arguments: Vec<AttributeArgumentSyntax>,
    pub location: Location,
}

impl AttributeSyntax {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Matches `Marker`, `MarkerAttribute`, and qualified spellings of either.
    pub fn is(&self, marker: &str) -> bool {
        let name = self.name();
        name == marker
            || name
                .strip_suffix("Attribute")
                .is_some_and(|stripped| stripped == marker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Type(DeclKind),
    Enum,
    Delegate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSyntax {
    Constructor(ConstructorSignature),
    Method(MethodSignature),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub attributes: Vec<AttributeSyntax>,
    pub modifiers: Vec<Modifier>,
    pub kind: TypeDeclKind,
    pub name: String,
    pub type_parameters: Vec<TypeParameter>,
    pub base_types: Vec<TypeRef>,
    pub members: Vec<MemberSyntax>,
    pub nested: Vec<TypeDecl>,
    /// The `#nullable` state in effect where the declaration starts.
    pub nullable_context: NullableContext,
    pub location: Location,
}

impl TypeDecl {
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    pub fn decl_kind(&self) -> Option<DeclKind> {
        match self.kind {
            TypeDeclKind::Type(kind) => Some(kind),
            TypeDeclKind::Enum | TypeDeclKind::Delegate => None,
        }
    }

    pub fn header(&self) -> Option<TypeHeader> {
        Some(TypeHeader {
            modifiers: self.modifiers.clone(),
            kind: self.decl_kind()?,
            name: self.name.clone(),
            type_parameters: self
                .type_parameters
                .iter()
                .map(|parameter| parameter.name.clone())
                .collect(),
            location: self.location,
        })
    }
}

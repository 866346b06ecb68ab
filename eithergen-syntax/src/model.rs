//! The declaration model handed from the host to the union engine.
//!
//! Everything here is plain data: type references carry the kind the binder
//! resolved for them, so the engine never needs to look a name up again.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source position. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn from_span(span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: start.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What kind of type a reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Struct,
    Enum,
    Interface,
    Delegate,
    TypeParameter,
    /// The binder could not find a declaration. Treated as a reference type.
    Unknown,
}

impl TypeKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }

    pub fn is_reference_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Delegate | Self::Unknown
        )
    }
}

macro_rules! predefined_types {
    ($($variant:ident => $keyword:literal $(| $system:literal)?, $kind:ident;)+) => {
        /// The C# keyword types.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Predefined {
            $($variant,)+
        }

        impl Predefined {
            pub const ALL: &'static [Predefined] = &[$(Self::$variant,)+];

            pub fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)+
                }
            }

            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $($keyword => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The keyword aliasing `System.{name}`, e.g. `Int32` => `int`.
            pub fn from_system_name(name: &str) -> Option<Self> {
                match name {
                    $($($system => Some(Self::$variant),)?)+
                    _ => None,
                }
            }

            pub fn kind(self) -> TypeKind {
                match self {
                    $(Self::$variant => TypeKind::$kind,)+
                }
            }
        }
    };
}

predefined_types! {
    Bool => "bool" | "Boolean", Struct;
    Byte => "byte" | "Byte", Struct;
    SByte => "sbyte" | "SByte", Struct;
    Char => "char" | "Char", Struct;
    Decimal => "decimal" | "Decimal", Struct;
    Double => "double" | "Double", Struct;
    Float => "float" | "Single", Struct;
    Int => "int" | "Int32", Struct;
    UInt => "uint" | "UInt32", Struct;
    NInt => "nint" | "IntPtr", Struct;
    NUInt => "nuint" | "UIntPtr", Struct;
    Long => "long" | "Int64", Struct;
    ULong => "ulong" | "UInt64", Struct;
    Short => "short" | "Int16", Struct;
    UShort => "ushort" | "UInt16", Struct;
    Object => "object" | "Object", Class;
    String => "string" | "String", Class;
    Dynamic => "dynamic", Class;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeArguments {
    None,
    Bound(Vec<TypeRef>),
    /// `Foo<>` or `Foo<,>`: the number of omitted arguments.
    Unbound(usize),
}

impl TypeArguments {
    pub fn arity(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Bound(arguments) => arguments.len(),
            Self::Unbound(arity) => *arity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub arguments: TypeArguments,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: TypeArguments::None,
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            arguments: TypeArguments::Bound(arguments),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleElement {
    pub ty: TypeRef,
    pub name: Option<String>,
}

/// A C# type as written at a use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Predefined(Predefined),
    Named {
        global: bool,
        segments: Vec<Segment>,
        kind: TypeKind,
    },
    TypeParameter(String),
    Array {
        element: Box<TypeRef>,
        rank: usize,
    },
    Tuple(Vec<TupleElement>),
    /// `T?`, either a nullable reference annotation or `Nullable<T>`.
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::Named {
            global: false,
            segments: vec![Segment::new(name)],
            kind,
        }
    }

    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Predefined(predefined) => predefined.kind(),
            Self::Named { kind, .. } => *kind,
            Self::TypeParameter(_) => TypeKind::TypeParameter,
            Self::Array { .. } => TypeKind::Class,
            Self::Tuple(_) => TypeKind::Struct,
            Self::Nullable(inner) => inner.kind(),
        }
    }

    /// `Nullable<X>` spelled out, in any qualification.
    fn generic_nullable(&self) -> Option<&TypeRef> {
        let Self::Named { segments, .. } = self else {
            return None;
        };
        let last = segments.last()?;
        let qualifier_ok = match segments.len() {
            1 => true,
            2 => segments[0].name == "System",
            _ => false,
        };
        match &last.arguments {
            TypeArguments::Bound(arguments)
                if qualifier_ok && last.name == "Nullable" && arguments.len() == 1 =>
            {
                arguments.first()
            }
            _ => None,
        }
    }

    /// Whether the reference itself carries a nullable marker (`X?` or
    /// `Nullable<X>`).
    pub fn is_nullable_annotated(&self) -> bool {
        matches!(self, Self::Nullable(_)) || self.generic_nullable().is_some()
    }

    /// `X?` for a value type `X`, or `Nullable<X>`.
    pub fn is_nullable_value_type(&self) -> bool {
        match self {
            Self::Nullable(inner) => inner.kind().is_value_type(),
            other => other.generic_nullable().is_some(),
        }
    }

    /// Whether any part of the reference omits its type arguments.
    pub fn is_unbound_generic(&self) -> bool {
        match self {
            Self::Predefined(_) | Self::TypeParameter(_) => false,
            Self::Named { segments, .. } => segments.iter().any(|segment| match &segment.arguments {
                TypeArguments::None => false,
                TypeArguments::Unbound(_) => true,
                TypeArguments::Bound(arguments) => arguments.iter().any(Self::is_unbound_generic),
            }),
            Self::Array { element, .. } => element.is_unbound_generic(),
            Self::Tuple(elements) => elements.iter().any(|element| element.ty.is_unbound_generic()),
            Self::Nullable(inner) => inner.is_unbound_generic(),
        }
    }

    pub fn mentions_type_parameter(&self) -> bool {
        match self {
            Self::Predefined(_) => false,
            Self::TypeParameter(_) => true,
            Self::Named { segments, .. } => segments.iter().any(|segment| match &segment.arguments {
                TypeArguments::Bound(arguments) => {
                    arguments.iter().any(Self::mentions_type_parameter)
                }
                _ => false,
            }),
            Self::Array { element, .. } => element.mentions_type_parameter(),
            Self::Tuple(elements) => elements
                .iter()
                .any(|element| element.ty.mentions_type_parameter()),
            Self::Nullable(inner) => inner.mentions_type_parameter(),
        }
    }

    /// Whether the type parameter `name` occurs anywhere in the reference.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Self::Predefined(_) => false,
            Self::TypeParameter(parameter) => parameter == name,
            Self::Named { segments, .. } => segments.iter().any(|segment| match &segment.arguments {
                TypeArguments::Bound(arguments) => arguments.iter().any(|ty| ty.mentions(name)),
                _ => false,
            }),
            Self::Array { element, .. } => element.mentions(name),
            Self::Tuple(elements) => elements.iter().any(|element| element.ty.mentions(name)),
            Self::Nullable(inner) => inner.mentions(name),
        }
    }

    /// The type with a top-level nullable reference annotation removed.
    /// `Nullable<T>` for value types is kept, since it is a distinct runtime
    /// type.
    pub fn without_reference_annotation(&self) -> TypeRef {
        match self {
            Self::Nullable(inner) if !inner.kind().is_value_type() => (**inner).clone(),
            other => other.clone(),
        }
    }

    /// Replaces every occurrence of the type parameter `name`.
    pub fn substitute(&self, name: &str, replacement: &TypeRef) -> TypeRef {
        match self {
            Self::TypeParameter(parameter) if parameter == name => replacement.clone(),
            Self::Predefined(_) | Self::TypeParameter(_) => self.clone(),
            Self::Named {
                global,
                segments,
                kind,
            } => Self::Named {
                global: *global,
                segments: segments
                    .iter()
                    .map(|segment| Segment {
                        name: segment.name.clone(),
                        arguments: match &segment.arguments {
                            TypeArguments::Bound(arguments) => TypeArguments::Bound(
                                arguments
                                    .iter()
                                    .map(|argument| argument.substitute(name, replacement))
                                    .collect(),
                            ),
                            other => other.clone(),
                        },
                    })
                    .collect(),
                kind: *kind,
            },
            Self::Array { element, rank } => Self::Array {
                element: Box::new(element.substitute(name, replacement)),
                rank: *rank,
            },
            Self::Tuple(elements) => Self::Tuple(
                elements
                    .iter()
                    .map(|element| TupleElement {
                        ty: element.ty.substitute(name, replacement),
                        name: element.name.clone(),
                    })
                    .collect(),
            ),
            Self::Nullable(inner) => inner.substitute(name, replacement).nullable(),
        }
    }

    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predefined(predefined) => f.write_str(predefined.keyword()),
            Self::Named {
                global, segments, ..
            } => {
                if *global {
                    f.write_str("global::")?;
                }
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.name)?;
                    match &segment.arguments {
                        TypeArguments::None => {}
                        TypeArguments::Bound(arguments) => {
                            f.write_str("<")?;
                            for (j, argument) in arguments.iter().enumerate() {
                                if j > 0 {
                                    f.write_str(", ")?;
                                }
                                write!(f, "{argument}")?;
                            }
                            f.write_str(">")?;
                        }
                        TypeArguments::Unbound(arity) => {
                            write!(f, "<{}>", ",".repeat(arity.saturating_sub(1)))?;
                        }
                    }
                }
                Ok(())
            }
            Self::TypeParameter(name) => f.write_str(name),
            Self::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1)))
            }
            Self::Tuple(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if let Some(name) = &element.name {
                        write!(f, " {name}")?;
                    }
                }
                f.write_str(")")
            }
            Self::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

/// A constraint from a `where` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constraint {
    Class { nullable: bool },
    Struct,
    Unmanaged,
    NotNull,
    New,
    Default,
    Type(TypeRef),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class { nullable: false } => f.write_str("class"),
            Self::Class { nullable: true } => f.write_str("class?"),
            Self::Struct => f.write_str("struct"),
            Self::Unmanaged => f.write_str("unmanaged"),
            Self::NotNull => f.write_str("notnull"),
            Self::New => f.write_str("new()"),
            Self::Default => f.write_str("default"),
            Self::Type(ty) => write!(f, "{ty}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    pub constraints: Vec<Constraint>,
    pub location: Location,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: vec![],
            location: Location::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Class,
    Struct,
    RecordClass,
    RecordStruct,
    Interface,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::RecordClass => "record",
            Self::RecordStruct => "record struct",
            Self::Interface => "interface",
        }
    }

    pub fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::RecordStruct)
    }
}

macro_rules! modifiers {
    ($($variant:ident => $keyword:literal,)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Modifier {
            $($variant,)+
        }

        impl Modifier {
            pub fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword,)+
                }
            }

            pub fn from_keyword(keyword: &str) -> Option<Self> {
                match keyword {
                    $($keyword => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

modifiers! {
    Public => "public",
    Private => "private",
    Protected => "protected",
    Internal => "internal",
    File => "file",
    Static => "static",
    Sealed => "sealed",
    Abstract => "abstract",
    Readonly => "readonly",
    Ref => "ref",
    Partial => "partial",
    Unsafe => "unsafe",
    New => "new",
}

impl Modifier {
    pub fn is_accessibility(self) -> bool {
        matches!(
            self,
            Self::Public | Self::Private | Self::Protected | Self::Internal | Self::File
        )
    }
}

/// The part of a type declaration that precedes its body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeHeader {
    pub modifiers: Vec<Modifier>,
    pub kind: DeclKind,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub location: Location,
}

impl TypeHeader {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            modifiers: vec![Modifier::Partial],
            kind,
            name: name.into(),
            type_parameters: vec![],
            location: Location::default(),
        }
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_partial(&self) -> bool {
        self.has(Modifier::Partial)
    }

    pub fn is_static(&self) -> bool {
        self.has(Modifier::Static)
    }

    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    /// `Name<T1, T2>` as written in the header.
    pub fn type_syntax(&self) -> String {
        if self.type_parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_parameters.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeArgument {
    TypeOf { ty: TypeRef, location: Location },
    Other { text: String, location: Location },
}

impl AttributeArgument {
    pub fn location(&self) -> Location {
        match self {
            Self::TypeOf { location, .. } | Self::Other { location, .. } => *location,
        }
    }
}

/// One application of the union marker attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerAttribute {
    /// `[Either<A, B>]`
    pub type_arguments: Vec<TypeRef>,
    /// `[Either(typeof(A), typeof(B))]`
    pub arguments: Vec<AttributeArgument>,
    /// Flag names from a `Members = GenerateMembers.X | ...` argument.
    pub members: Option<Vec<String>>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorSignature {
    pub parameters: Vec<TypeRef>,
    pub location: Location,
}

/// A method declared in the union's own body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<TypeRef>,
    pub location: Location,
}

/// The nullable-reference-types scope in effect at a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullableContext {
    Enabled,
    Disabled,
    #[default]
    Unspecified,
}

impl NullableContext {
    /// Whether reference types without `?` are non-nullable here.
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// A type declaration carrying the union marker, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub namespace: Option<String>,
    pub usings: Vec<String>,
    /// Outermost first.
    pub containing_types: Vec<TypeHeader>,
    pub header: TypeHeader,
    pub type_parameters: Vec<TypeParameter>,
    pub markers: Vec<MarkerAttribute>,
    pub constructors: Vec<ConstructorSignature>,
    pub methods: Vec<MethodSignature>,
    /// Names of every declared member, methods included.
    pub member_names: Vec<String>,
    pub base_types: Vec<TypeRef>,
    pub nullable_context: NullableContext,
    /// Generic arities of other union declarations with the same name in the
    /// same container.
    pub sibling_arities: Vec<usize>,
}

impl Declaration {
    pub fn new(header: TypeHeader) -> Self {
        Self {
            namespace: None,
            usings: vec![],
            containing_types: vec![],
            header,
            type_parameters: vec![],
            markers: vec![],
            constructors: vec![],
            methods: vec![],
            member_names: vec![],
            base_types: vec![],
            nullable_context: NullableContext::Unspecified,
            sibling_arities: vec![],
        }
    }

    pub fn location(&self) -> Location {
        self.header.location
    }

    /// Whether the base list names `ISerializable`.
    pub fn declares_serializable(&self) -> bool {
        self.base_types.iter().any(|base| match base {
            TypeRef::Named { segments, .. } => segments
                .last()
                .is_some_and(|segment| segment.name == "ISerializable"),
            _ => false,
        })
    }

    pub fn declares_member(&self, name: &str) -> bool {
        self.member_names.iter().any(|member| member == name)
    }

    /// Declared methods called `name` taking `arity` parameters.
    pub fn methods_named<'a>(
        &'a self,
        name: &'a str,
        arity: usize,
    ) -> impl Iterator<Item = &'a MethodSignature> + 'a {
        self.methods
            .iter()
            .filter(move |method| method.name == name && method.parameters.len() == arity)
    }

    pub fn declares_method(&self, name: &str, arity: usize) -> bool {
        self.methods_named(name, arity).next().is_some()
    }

    /// The fully qualified metadata-style name, e.g. `Ns.Outer.Name`.
    pub fn qualified_name(&self) -> String {
        let mut parts = vec![];
        if let Some(namespace) = &self.namespace {
            parts.push(namespace.clone());
        }
        for containing in &self.containing_types {
            parts.push(containing.name.clone());
        }
        parts.push(self.header.name.clone());
        parts.join(".")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn int() -> TypeRef {
        TypeRef::Predefined(Predefined::Int)
    }

    fn string() -> TypeRef {
        TypeRef::Predefined(Predefined::String)
    }

    #[test]
    fn display_includes_nullability() {
        assert_eq!(int().nullable().to_string(), "int?");
        assert_eq!(string().nullable().to_string(), "string?");
        assert_ne!(string().to_string(), string().nullable().to_string());
    }

    #[test]
    fn nullable_value_types() {
        assert!(int().nullable().is_nullable_value_type());
        assert!(!string().nullable().is_nullable_value_type());
        assert!(string().nullable().is_nullable_annotated());

        let spelled = TypeRef::Named {
            global: false,
            segments: vec![
                Segment::new("System"),
                Segment::with_arguments("Nullable", vec![int()]),
            ],
            kind: TypeKind::Struct,
        };
        assert!(spelled.is_nullable_value_type());
        assert_eq!(spelled.to_string(), "System.Nullable<int>");
    }

    #[test]
    fn unbound_generics() {
        let list = TypeRef::Named {
            global: false,
            segments: vec![Segment {
                name: "Dictionary".to_string(),
                arguments: TypeArguments::Unbound(2),
            }],
            kind: TypeKind::Class,
        };
        assert!(list.is_unbound_generic());
        assert_eq!(list.to_string(), "Dictionary<,>");

        let bound = TypeRef::Named {
            global: false,
            segments: vec![Segment::with_arguments("List", vec![int()])],
            kind: TypeKind::Class,
        };
        assert!(!bound.is_unbound_generic());
    }

    #[test]
    fn substitution_reaches_nested_arguments() {
        let ty = TypeRef::Named {
            global: false,
            segments: vec![Segment::with_arguments(
                "IComparable",
                vec![TypeRef::TypeParameter("T2".to_string())],
            )],
            kind: TypeKind::Interface,
        };
        let replaced = ty.substitute("T2", &TypeRef::TypeParameter("TNew".to_string()));
        assert_eq!(replaced.to_string(), "IComparable<TNew>");
        assert!(ty.mentions("T2"));
        assert!(!replaced.mentions("T2"));
    }

    #[test]
    fn typeof_strips_reference_annotation_only() {
        assert_eq!(string().nullable().without_reference_annotation(), string());
        assert_eq!(
            int().nullable().without_reference_annotation(),
            int().nullable()
        );
    }
}

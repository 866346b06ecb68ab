//! Resolves the type kinds the parser left as [`TypeKind::Unknown`] and
//! collects the declarations carrying the union marker.

use std::collections::HashMap;

use crate::{
    ParseOptions,
    model::{
        AttributeArgument, Constraint, ConstructorSignature, DeclKind, Declaration, MarkerAttribute,
        MethodSignature, Predefined, Segment, TupleElement, TypeArguments, TypeHeader, TypeKind,
        TypeRef,
    },
    tree::{
        AttributeArgumentSyntax, AttributeSyntax, CompilationUnit, Item, MemberSyntax, TypeDecl,
        TypeDeclKind,
    },
};

/// Kinds of well known framework types, keyed by simple name and arity.
fn known_kind(name: &str, arity: usize) -> Option<TypeKind> {
    let kind = match (name, arity) {
        (
            "Boolean" | "Byte" | "SByte" | "Char" | "Decimal" | "Double" | "Single" | "Half"
            | "Int16" | "UInt16" | "Int32" | "UInt32" | "Int64" | "UInt64" | "Int128" | "UInt128"
            | "IntPtr" | "UIntPtr" | "Guid" | "DateTime" | "DateTimeOffset" | "DateOnly"
            | "TimeOnly" | "TimeSpan" | "BigInteger" | "Complex" | "CancellationToken" | "Index"
            | "Range" | "Rune" | "ValueTask",
            0,
        ) => TypeKind::Struct,
        ("Nullable" | "ValueTask" | "Memory" | "ReadOnlyMemory" | "Span" | "ReadOnlySpan", 1)
        | ("ArraySegment" | "ImmutableArray", 1)
        | ("KeyValuePair", 2)
        | ("ValueTuple", 1..=8) => TypeKind::Struct,
        ("DayOfWeek" | "StringComparison" | "DateTimeKind", 0) => TypeKind::Enum,
        (
            "IEnumerable" | "IEnumerator" | "ICollection" | "IList" | "IDictionary"
            | "IComparable" | "IDisposable" | "IAsyncDisposable" | "ISerializable"
            | "IFormattable" | "ICloneable" | "IStructuralEquatable",
            0,
        ) => TypeKind::Interface,
        (
            "IEnumerable" | "IEnumerator" | "ICollection" | "IList" | "IReadOnlyCollection"
            | "IReadOnlyList" | "ISet" | "IReadOnlySet" | "IComparable" | "IEquatable"
            | "IAsyncEnumerable" | "IComparer" | "IEqualityComparer" | "IObservable" | "IObserver",
            1,
        )
        | ("IDictionary" | "IReadOnlyDictionary", 2) => TypeKind::Interface,
        ("Action", 0..=16) | ("Func", 1..=17) | ("EventHandler", 0..=1) => TypeKind::Delegate,
        ("Predicate" | "Comparison", 1) | ("Converter", 2) => TypeKind::Delegate,
        (
            "String" | "Object" | "Exception" | "Type" | "Uri" | "Version" | "Task" | "Array"
            | "StringBuilder" | "Stream",
            0,
        ) => TypeKind::Class,
        ("List" | "HashSet" | "Queue" | "Stack" | "Task" | "Lazy" | "LinkedList", 1)
        | ("Dictionary" | "SortedDictionary" | "ConcurrentDictionary", 2)
        | ("Tuple", 1..=8) => TypeKind::Class,
        _ => return None,
    };
    Some(kind)
}

fn decl_type_kind(decl: &TypeDecl) -> TypeKind {
    match decl.kind {
        TypeDeclKind::Type(DeclKind::Class | DeclKind::RecordClass) => TypeKind::Class,
        TypeDeclKind::Type(DeclKind::Struct | DeclKind::RecordStruct) => TypeKind::Struct,
        TypeDeclKind::Type(DeclKind::Interface) => TypeKind::Interface,
        TypeDeclKind::Enum => TypeKind::Enum,
        TypeDeclKind::Delegate => TypeKind::Delegate,
    }
}

/// Every type declared across the bound units.
#[derive(Debug, Default)]
pub struct SymbolTable {
    types: HashMap<(String, usize), TypeKind>,
}

impl SymbolTable {
    pub fn from_units(units: &[CompilationUnit]) -> Self {
        let mut table = Self::default();
        for unit in units {
            table.collect_items(&unit.items);
        }
        table
    }

    fn collect_items(&mut self, items: &[Item]) {
        for item in items {
            match item {
                Item::Namespace(namespace) => self.collect_items(&namespace.items),
                Item::Type(decl) => self.collect_type(decl),
            }
        }
    }

    fn collect_type(&mut self, decl: &TypeDecl) {
        self.types
            .entry((decl.name.clone(), decl.arity()))
            .or_insert_with(|| decl_type_kind(decl));
        for nested in &decl.nested {
            self.collect_type(nested);
        }
    }

    pub fn lookup(&self, name: &str, arity: usize) -> Option<TypeKind> {
        self.types
            .get(&(name.to_string(), arity))
            .copied()
            .or_else(|| known_kind(name, arity))
    }

    /// The keyword spelled as `System.Int32`, `global::System.Int32` or, when
    /// no declared type shadows it, `Int32`.
    fn alias(&self, segments: &[Segment]) -> Option<Predefined> {
        let (last, qualifier) = segments.split_last()?;
        if last.arguments != TypeArguments::None {
            return None;
        }
        match qualifier {
            [system] if system.name == "System" && system.arguments == TypeArguments::None => {}
            [] if !self.types.contains_key(&(last.name.clone(), 0)) => {}
            _ => return None,
        }
        Predefined::from_system_name(&last.name)
    }

    /// Binds `ty` with `scope` naming the type parameters in effect.
    pub fn resolve(&self, ty: &TypeRef, scope: &[String]) -> TypeRef {
        match ty {
            TypeRef::Predefined(_) | TypeRef::TypeParameter(_) => ty.clone(),
            TypeRef::Named {
                global, segments, ..
            } => {
                if let [segment] = segments.as_slice() {
                    if !global
                        && segment.arguments == TypeArguments::None
                        && scope.contains(&segment.name)
                    {
                        return TypeRef::TypeParameter(segment.name.clone());
                    }
                }
                if let Some(predefined) = self.alias(segments) {
                    return TypeRef::Predefined(predefined);
                }

                let segments: Vec<Segment> = segments
                    .iter()
                    .map(|segment| Segment {
                        name: segment.name.clone(),
                        arguments: match &segment.arguments {
                            TypeArguments::Bound(arguments) => TypeArguments::Bound(
                                arguments
                                    .iter()
                                    .map(|argument| self.resolve(argument, scope))
                                    .collect(),
                            ),
                            other => other.clone(),
                        },
                    })
                    .collect();

                let kind = segments
                    .last()
                    .and_then(|last| self.lookup(&last.name, last.arguments.arity()))
                    .unwrap_or_else(|| {
                        log::debug!("unresolved type `{ty}`, treating it as a reference type");
                        TypeKind::Unknown
                    });

                TypeRef::Named {
                    global: *global,
                    segments,
                    kind,
                }
            }
            TypeRef::Array { element, rank } => TypeRef::Array {
                element: Box::new(self.resolve(element, scope)),
                rank: *rank,
            },
            TypeRef::Tuple(elements) => TypeRef::Tuple(
                elements
                    .iter()
                    .map(|element| TupleElement {
                        ty: self.resolve(&element.ty, scope),
                        name: element.name.clone(),
                    })
                    .collect(),
            ),
            TypeRef::Nullable(inner) => self.resolve(inner, scope).nullable(),
        }
    }
}

#[derive(Clone, Default)]
struct Scope {
    namespace: Option<String>,
    usings: Vec<String>,
    containing: Vec<TypeHeader>,
    type_parameters: Vec<String>,
}

struct Binder<'a> {
    options: &'a ParseOptions,
    symbols: SymbolTable,
    declarations: Vec<Declaration>,
}

impl Binder<'_> {
    fn bind_items(&mut self, items: &[Item], scope: &Scope) {
        for item in items {
            match item {
                Item::Namespace(namespace) => {
                    let mut inner = scope.clone();
                    inner.namespace = Some(match &scope.namespace {
                        Some(outer) => format!("{outer}.{}", namespace.name),
                        None => namespace.name.clone(),
                    });
                    inner.usings.extend(namespace.usings.iter().cloned());
                    self.bind_items(&namespace.items, &inner);
                }
                Item::Type(decl) => self.bind_type(decl, scope),
            }
        }
    }

    fn bind_type(&mut self, decl: &TypeDecl, scope: &Scope) {
        let Some(header) = decl.header() else {
            return;
        };

        let mut inner = scope.clone();
        inner
            .type_parameters
            .extend(decl.type_parameters.iter().map(|parameter| parameter.name.clone()));

        let markers: Vec<&AttributeSyntax> = decl
            .attributes
            .iter()
            .filter(|attribute| attribute.is(&self.options.marker))
            .collect();

        if !markers.is_empty() {
            match header.kind {
                DeclKind::Class | DeclKind::Struct => {
                    let declaration = self.declaration(decl, header.clone(), &markers, scope, &inner);
                    self.declarations.push(declaration);
                }
                other => log::warn!(
                    "{}: `[{}]` on a `{}` declaration is ignored",
                    decl.location,
                    self.options.marker,
                    other.keyword()
                ),
            }
        }

        inner.containing.push(header);
        for nested in &decl.nested {
            self.bind_type(nested, &inner);
        }
    }

    fn declaration(
        &self,
        decl: &TypeDecl,
        header: TypeHeader,
        markers: &[&AttributeSyntax],
        outer: &Scope,
        scope: &Scope,
    ) -> Declaration {
        let resolve = |ty: &TypeRef| self.symbols.resolve(ty, &scope.type_parameters);

        let type_parameters = decl
            .type_parameters
            .iter()
            .map(|parameter| {
                let mut parameter = parameter.clone();
                for constraint in &mut parameter.constraints {
                    if let Constraint::Type(ty) = constraint {
                        *ty = resolve(ty);
                    }
                }
                parameter
            })
            .collect();

        let mut constructors = vec![];
        let mut methods = vec![];
        let mut member_names = vec![];
        for member in &decl.members {
            match member {
                MemberSyntax::Constructor(constructor) => constructors.push(ConstructorSignature {
                    parameters: constructor.parameters.iter().map(&resolve).collect(),
                    location: constructor.location,
                }),
                MemberSyntax::Method(method) => {
                    member_names.push(method.name.clone());
                    methods.push(MethodSignature {
                        name: method.name.clone(),
                        parameters: method.parameters.iter().map(&resolve).collect(),
                        location: method.location,
                    });
                }
                MemberSyntax::Named(name) => member_names.push(name.clone()),
            }
        }

        Declaration {
            namespace: outer.namespace.clone(),
            usings: outer.usings.clone(),
            containing_types: outer.containing.clone(),
            header,
            type_parameters,
            markers: markers
                .iter()
                .map(|attribute| self.marker(attribute, &scope.type_parameters))
                .collect(),
            constructors,
            methods,
            member_names,
            base_types: decl.base_types.iter().map(&resolve).collect(),
            nullable_context: decl.nullable_context,
            sibling_arities: vec![],
        }
    }

    fn marker(&self, attribute: &AttributeSyntax, scope: &[String]) -> MarkerAttribute {
        let mut marker = MarkerAttribute {
            type_arguments: attribute
                .type_arguments
                .iter()
                .map(|ty| self.symbols.resolve(ty, scope))
                .collect(),
            location: attribute.location,
            ..Default::default()
        };

        for argument in &attribute.arguments {
            match argument {
                AttributeArgumentSyntax::Positional(AttributeArgument::TypeOf { ty, location }) => {
                    marker.arguments.push(AttributeArgument::TypeOf {
                        ty: self.symbols.resolve(ty, scope),
                        location: *location,
                    });
                }
                AttributeArgumentSyntax::Positional(other) => marker.arguments.push(other.clone()),
                AttributeArgumentSyntax::Named { name, flags, .. } if name == "Members" => {
                    marker.members = Some(flags.clone());
                }
                AttributeArgumentSyntax::Named { name, location, .. } => {
                    log::warn!("{location}: unknown marker argument `{name}` is ignored");
                }
            }
        }

        marker
    }

    /// Fills in the arities of same-named unions declared in the same container.
    fn link_siblings(&mut self) {
        let container = |declaration: &Declaration| {
            (
                declaration.namespace.clone(),
                declaration
                    .containing_types
                    .iter()
                    .map(|header| (header.name.clone(), header.arity()))
                    .collect::<Vec<_>>(),
                declaration.header.name.clone(),
            )
        };

        let mut arities: HashMap<_, Vec<usize>> = HashMap::new();
        for declaration in &self.declarations {
            arities
                .entry(container(declaration))
                .or_default()
                .push(declaration.header.arity());
        }

        for declaration in &mut self.declarations {
            let own = declaration.header.arity();
            let mut siblings: Vec<usize> = arities[&container(declaration)]
                .iter()
                .copied()
                .filter(|arity| *arity != own)
                .collect();
            siblings.sort_unstable();
            siblings.dedup();
            declaration.sibling_arities = siblings;
        }
    }
}

/// Binds `units` together and returns every marked class or struct, in
/// source order.
pub fn bind(units: &[CompilationUnit], options: &ParseOptions) -> Vec<Declaration> {
    let mut binder = Binder {
        options,
        symbols: SymbolTable::from_units(units),
        declarations: vec![],
    };

    for unit in units {
        let scope = Scope {
            usings: unit.usings.clone(),
            ..Default::default()
        };
        binder.bind_items(&unit.items, &scope);
    }
    binder.link_siblings();

    log::debug!("bound {} union declaration(s)", binder.declarations.len());
    binder.declarations
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn framework_kinds() {
        assert_eq!(known_kind("Guid", 0), Some(TypeKind::Struct));
        assert_eq!(known_kind("Nullable", 1), Some(TypeKind::Struct));
        assert_eq!(known_kind("IEquatable", 1), Some(TypeKind::Interface));
        assert_eq!(known_kind("Func", 3), Some(TypeKind::Delegate));
        assert_eq!(known_kind("Func", 0), None);
        assert_eq!(known_kind("Widget", 0), None);
    }

    #[test]
    fn type_parameters_in_scope() {
        let table = SymbolTable::default();
        let scope = vec!["T1".to_string()];
        let resolved = table.resolve(&TypeRef::named("T1", TypeKind::Unknown), &scope);
        assert_eq!(resolved, TypeRef::TypeParameter("T1".to_string()));

        let list = TypeRef::Named {
            global: false,
            segments: vec![Segment::with_arguments(
                "List",
                vec![TypeRef::named("T1", TypeKind::Unknown)],
            )],
            kind: TypeKind::Unknown,
        };
        let resolved = table.resolve(&list, &scope);
        assert_eq!(resolved.kind(), TypeKind::Class);
        assert!(resolved.mentions_type_parameter());
    }

    #[test]
    fn framework_names_of_keywords() {
        let table = SymbolTable::default();
        let path = |global: bool, names: &[&str]| TypeRef::Named {
            global,
            segments: names.iter().map(|name| Segment::new(*name)).collect(),
            kind: TypeKind::Unknown,
        };
        let string = TypeRef::Predefined(Predefined::String);

        assert_eq!(table.resolve(&path(false, &["System", "String"]), &[]), string);
        assert_eq!(table.resolve(&path(true, &["System", "String"]), &[]), string);
        assert_eq!(table.resolve(&path(false, &["String"]), &[]), string);
        assert_eq!(
            table.resolve(&path(false, &["System", "Int32"]).nullable(), &[]),
            TypeRef::Predefined(Predefined::Int).nullable()
        );
        assert_eq!(
            table.resolve(&path(false, &["Other", "String"]), &[]).kind(),
            TypeKind::Unknown
        );
    }

    #[test]
    fn declared_types_shadow_framework_names() {
        let units = [crate::parse_str("public struct String { }", &Default::default()).unwrap()];
        let table = SymbolTable::from_units(&units);
        let resolved = table.resolve(&TypeRef::named("String", TypeKind::Unknown), &[]);
        assert_eq!(resolved.kind(), TypeKind::Struct);
        assert_eq!(resolved.to_string(), "String");
    }

    #[test]
    fn nullable_spelled_out_is_a_value_type() {
        let table = SymbolTable::default();
        let spelled = TypeRef::Named {
            global: false,
            segments: vec![Segment::with_arguments(
                "Nullable",
                vec![TypeRef::Predefined(Predefined::Int)],
            )],
            kind: TypeKind::Unknown,
        };
        let resolved = table.resolve(&spelled, &[]);
        assert_eq!(resolved.kind(), TypeKind::Struct);
        assert!(resolved.is_nullable_value_type());
    }
}

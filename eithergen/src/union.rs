//! The resolved union: validated header, strategy, classified variants.

use eithergen_syntax::model::{
    Declaration, Segment, TypeArguments, TypeKind, TypeParameter, TypeRef,
};

use crate::{
    CancellationToken, Diagnostic, GenerateError, GenerateMembers,
    classify::{self, Classification},
    cs::Expr,
    resolve::{self, Strategy},
    validate::{self, ValidatedHeader},
};

/// How a variant's slot is accessed before it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `_value1`
    Plain,
    /// `_value1!`, the engine knows the slot is set.
    SuppressNull,
    /// `_value1?.M()`
    Conditional,
}

/// One case of a union, with every projection the synthesizers use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// 1-based, also the runtime discriminant.
    pub index: usize,
    pub ty: TypeRef,
    /// Display name, including any `?`.
    pub name: String,
    pub classification: Classification,
    /// Type of the `_valueN` field.
    pub storage_type: TypeRef,
    /// Type of constructor parameters and continuation inputs.
    pub argument_type: TypeRef,
    /// The type as `typeof` accepts it.
    pub runtime_type: TypeRef,
    pub invoker: Access,
    pub receiver: Access,
    pub default_expr: Expr,
}

impl Variant {
    pub fn new(index: usize, ty: TypeRef, classification: Classification) -> Self {
        let projections = classify::project(&ty, classification);
        Self {
            index,
            name: ty.to_string(),
            ty,
            classification,
            storage_type: projections.storage_type,
            argument_type: projections.argument_type,
            runtime_type: projections.runtime_type,
            invoker: projections.invoker,
            receiver: projections.receiver,
            default_expr: projections.default_expr,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.classification.is_nullable
    }

    pub fn is_value_type(&self) -> bool {
        self.classification.is_value_type
    }

    pub fn is_reference_like(&self) -> bool {
        self.classification.is_reference_like()
    }

    /// Non-nullable and reference-like: null arguments are rejected.
    pub fn rejects_null(&self) -> bool {
        self.is_reference_like() && !self.is_nullable()
    }

    pub fn field_name(&self) -> String {
        format!("_value{}", self.index)
    }

    pub fn field(&self) -> Expr {
        Expr::ident(self.field_name())
    }

    /// The same slot on another instance, e.g. `other._value1`.
    pub fn field_of(&self, target: Expr) -> Expr {
        target.member(self.field_name())
    }

    /// `_valueN.method(arguments)` through the invoker projection.
    pub fn invoke(&self, method: &str, arguments: Vec<Expr>) -> Expr {
        match self.invoker {
            Access::Plain => self.field().method(method, arguments),
            Access::SuppressNull => self.field().suppress_null().method(method, arguments),
            Access::Conditional => self.field().conditional_member(method).call(arguments),
        }
    }

    /// The slot as returned or passed on.
    pub fn receiver_expr(&self) -> Expr {
        match self.receiver {
            Access::SuppressNull => self.field().suppress_null(),
            Access::Plain | Access::Conditional => self.field(),
        }
    }

    /// Name of the continuation parameter for this variant, `f1`, `f2`, ...
    pub fn continuation(&self) -> String {
        format!("f{}", self.index)
    }

    /// Whether C# allows a user-defined conversion from this variant's type.
    pub fn allows_conversion(&self) -> bool {
        use eithergen_syntax::model::Predefined;

        match self.ty.without_reference_annotation() {
            TypeRef::Predefined(Predefined::Object | Predefined::Dynamic) => false,
            ty => ty.kind() != TypeKind::Interface,
        }
    }
}

/// A declaration that passed validation, arbitration and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDeclaration {
    pub declaration: Declaration,
    pub header: ValidatedHeader,
    pub strategy: Strategy,
    pub variants: Vec<Variant>,
    /// The effective selection.
    pub members: GenerateMembers,
}

impl UnionDeclaration {
    /// Runs every check on `declaration`. The inner `Err` holds the
    /// diagnostics that make it invalid.
    pub fn build(
        declaration: &Declaration,
        cancel: &CancellationToken,
    ) -> Result<Result<Self, Vec<Diagnostic>>, GenerateError> {
        cancel.check()?;

        let header = match validate::validate(declaration) {
            Ok(header) => header,
            Err(diagnostic) => return Ok(Err(vec![diagnostic])),
        };

        let (strategy, candidates) = match resolve::arbitrate(declaration)
            .and_then(|parametrization| parametrization.into_candidates(declaration))
        {
            Ok(resolved) => resolved,
            Err(diagnostic) => return Ok(Err(vec![diagnostic])),
        };
        log::debug!(
            "`{}` uses the {strategy:?} strategy with {} candidate(s)",
            declaration.qualified_name(),
            candidates.len()
        );

        if let Err(diagnostic) = resolve::check_arity(declaration, candidates.len()) {
            return Ok(Err(vec![diagnostic]));
        }

        let variants = match classify::classify(declaration, strategy, &candidates, cancel)? {
            Ok(variants) => variants,
            Err(diagnostic) => return Ok(Err(vec![diagnostic])),
        };

        let members = declaration
            .markers
            .iter()
            .find_map(|marker| marker.members.as_deref())
            .map(GenerateMembers::from_flags)
            .unwrap_or_default()
            .effective();

        Ok(Ok(Self {
            declaration: declaration.clone(),
            header,
            strategy,
            variants,
            members,
        }))
    }

    pub fn name(&self) -> &str {
        &self.declaration.header.name
    }

    pub fn is_value_type(&self) -> bool {
        self.declaration.header.kind.is_value_type()
    }

    pub fn type_parameters(&self) -> &[TypeParameter] {
        &self.declaration.type_parameters
    }

    fn construct(&self, arguments: Vec<TypeRef>) -> TypeRef {
        let kind = if self.is_value_type() {
            TypeKind::Struct
        } else {
            TypeKind::Class
        };
        let segment = if arguments.is_empty() {
            Segment::new(self.name())
        } else {
            Segment::with_arguments(self.name(), arguments)
        };
        TypeRef::Named {
            global: false,
            segments: vec![segment],
            kind,
        }
    }

    /// `Name<T1, T2>`
    pub fn self_type(&self) -> TypeRef {
        self.construct(
            self.declaration
                .header
                .type_parameters
                .iter()
                .map(|name| TypeRef::TypeParameter(name.clone()))
                .collect(),
        )
    }

    /// `Name<..., replacement, ...>` with the parameter `name` replaced.
    pub fn self_type_replacing(&self, name: &str, replacement: &TypeRef) -> TypeRef {
        self.self_type().substitute(name, replacement)
    }

    /// The same family without the variant at `index`, when that sibling
    /// exists. Only generic unions have one.
    pub fn remainder_type(&self, index: usize) -> Option<TypeRef> {
        let arity = self.variants.len();
        if self.strategy != Strategy::Generic
            || arity <= 2
            || !self.declaration.sibling_arities.contains(&(arity - 1))
        {
            return None;
        }
        Some(
            self.construct(
                self.variants
                    .iter()
                    .filter(|variant| variant.index != index)
                    .map(|variant| variant.ty.clone())
                    .collect(),
            ),
        )
    }

    /// A type parameter name not used by the union, based on `base`.
    pub fn fresh_name(&self, base: &str) -> String {
        let taken = |name: &str| self.declaration.header.type_parameters.iter().any(|p| p == name);
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{n}"))
            .find(|name| !taken(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// Whether `ty` is this union with its own type parameters, however it is
    /// qualified.
    pub fn is_self_type(&self, ty: &TypeRef) -> bool {
        let TypeRef::Named { segments, .. } = ty.without_reference_annotation() else {
            return false;
        };
        let Some(last) = segments.last() else {
            return false;
        };
        let parameters = &self.declaration.header.type_parameters;
        last.name == self.name()
            && match &last.arguments {
                TypeArguments::None => parameters.is_empty(),
                TypeArguments::Bound(arguments) => {
                    arguments.len() == parameters.len()
                        && arguments.iter().zip(parameters).all(|(argument, name)| {
                            matches!(argument, TypeRef::TypeParameter(own) if own == name)
                        })
                }
                TypeArguments::Unbound(_) => false,
            }
    }

    /// Whether the user wrote `Equals(Self other)`.
    pub fn declares_typed_equals(&self) -> bool {
        self.declaration
            .methods_named("Equals", 1)
            .any(|method| method.parameters.first().is_some_and(|ty| self.is_self_type(ty)))
    }

    /// Whether a user-written single-argument constructor already covers
    /// `variant`. C# cannot overload on reference nullability alone, so the
    /// annotation is ignored.
    pub fn declares_constructor_for(&self, variant: &Variant) -> bool {
        let wanted = variant.ty.without_reference_annotation().to_string();
        self.declaration.constructors.iter().any(|constructor| {
            matches!(constructor.parameters.as_slice(), [parameter]
                if parameter.without_reference_annotation().to_string() == wanted)
        })
    }
}

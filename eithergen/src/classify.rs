//! Reconciles reference nullability, `Nullable<T>` and generic constraints
//! into one contract per variant, and derives the projections every
//! synthesizer shares.

use eithergen_syntax::model::{
    Constraint, Declaration, NullableContext, TypeKind, TypeParameter, TypeRef,
};

use crate::{
    CancellationToken, Diagnostic, DiagnosticKind, GenerateError,
    cs::Expr,
    resolve::{Candidate, Strategy},
    union::{Access, Variant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub is_reference_type: bool,
    pub is_value_type: bool,
    pub is_nullable: bool,
}

impl Classification {
    /// Everything that is not known to be a value type, including
    /// unconstrained type parameters.
    pub fn is_reference_like(self) -> bool {
        !self.is_value_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Projections {
    pub storage_type: TypeRef,
    pub argument_type: TypeRef,
    pub runtime_type: TypeRef,
    pub invoker: Access,
    pub receiver: Access,
    pub default_expr: Expr,
}

pub(crate) fn project(ty: &TypeRef, classification: Classification) -> Projections {
    let reference_like = classification.is_reference_like();
    let nullable = classification.is_nullable;
    let marked = ty.is_nullable_annotated();

    let storage_type = if (nullable || reference_like) && !marked {
        ty.clone().nullable()
    } else {
        ty.clone()
    };
    let argument_type = if nullable && reference_like && !marked {
        ty.clone().nullable()
    } else {
        ty.clone()
    };

    let (invoker, receiver, default_expr) = match (reference_like, nullable) {
        (true, false) => (
            Access::SuppressNull,
            Access::SuppressNull,
            Expr::Default { suppressed: true },
        ),
        (true, true) => (Access::Conditional, Access::Plain, Expr::default_value()),
        (false, _) => (Access::Plain, Access::Plain, Expr::default_value()),
    };

    Projections {
        storage_type,
        argument_type,
        runtime_type: ty.without_reference_annotation(),
        invoker,
        receiver,
        default_expr,
    }
}

fn classify_parameter(constraints: &[Constraint], ambient_nullable: bool) -> Classification {
    let mut class = None;
    let mut not_null = false;
    let mut base_class = None;

    for constraint in constraints {
        match constraint {
            Constraint::Struct | Constraint::Unmanaged => {
                return Classification {
                    is_reference_type: false,
                    is_value_type: true,
                    is_nullable: false,
                };
            }
            Constraint::Class { nullable } => class = Some(*nullable),
            Constraint::NotNull => not_null = true,
            Constraint::Type(ty) if ty.kind() == TypeKind::Class => {
                base_class = Some(ty.is_nullable_annotated());
            }
            // interfaces, other parameters, new()
            _ => {}
        }
    }

    let is_nullable = match (class, base_class) {
        _ if not_null => false,
        (Some(false), _) => false,
        (_, Some(true)) => true,
        _ => ambient_nullable,
    };

    Classification {
        is_reference_type: class.is_some() || base_class.is_some(),
        is_value_type: false,
        is_nullable,
    }
}

/// Classifies `ty` as used at a declaration with `parameters` in scope.
pub fn classify_type(
    ty: &TypeRef,
    parameters: &[TypeParameter],
    context: NullableContext,
) -> Classification {
    let ambient_nullable = !context.is_enabled();

    match ty {
        TypeRef::TypeParameter(name) => {
            let constraints = parameters
                .iter()
                .find(|parameter| &parameter.name == name)
                .map(|parameter| parameter.constraints.as_slice())
                .unwrap_or_default();
            classify_parameter(constraints, ambient_nullable)
        }
        TypeRef::Nullable(inner) => Classification {
            is_nullable: true,
            ..classify_type(inner, parameters, context)
        },
        other if other.kind().is_value_type() => Classification {
            is_reference_type: false,
            is_value_type: true,
            is_nullable: other.is_nullable_value_type(),
        },
        _ => Classification {
            is_reference_type: true,
            is_value_type: false,
            is_nullable: ambient_nullable,
        },
    }
}

/// Turns the authoritative candidates into variants, rejecting open generics
/// (attribute strategies only) and duplicates in declaration order.
pub fn classify(
    declaration: &Declaration,
    strategy: Strategy,
    candidates: &[Candidate],
    cancel: &CancellationToken,
) -> Result<Result<Vec<Variant>, Diagnostic>, GenerateError> {
    let mut variants: Vec<Variant> = Vec::with_capacity(candidates.len());

    for (i, candidate) in candidates.iter().enumerate() {
        cancel.check()?;

        let ty = &candidate.ty;
        if strategy != Strategy::Generic && (ty.is_unbound_generic() || ty.mentions_type_parameter()) {
            return Ok(Err(Diagnostic::new(
                DiagnosticKind::OpenGenericNotAllowed { ty: ty.to_string() },
                candidate.location,
            )));
        }

        let name = ty.to_string();
        if variants.iter().any(|variant| variant.name == name) {
            return Ok(Err(Diagnostic::new(
                DiagnosticKind::TypeAlreadyUsed { ty: name },
                candidate.location,
            )));
        }

        let classification =
            classify_type(ty, &declaration.type_parameters, declaration.nullable_context);
        log::trace!("variant {} `{name}` is {classification:?}", i + 1);
        variants.push(Variant::new(i + 1, ty.clone(), classification));
    }

    Ok(Ok(variants))
}

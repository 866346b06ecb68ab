use eithergen_syntax::model::{Declaration, Predefined, TypeRef};

use super::{SynthContext, Synthesizer, discriminant, index_switch};
use crate::{
    GenerateError,
    cs::{Body, Expr, Member, MemberKind, Modifier, Param, types},
    union::{Access, Variant},
};

/// Overrides of `Equals(object)`, `GetHashCode` and `ToString`. Each is left
/// out when the type already declares that override.
pub struct ObjectOverrides;

fn hash(variant: &Variant) -> Expr {
    match variant.invoker {
        Access::Conditional => variant
            .field()
            .conditional_member("GetHashCode")
            .call(vec![])
            .coalesce(Expr::int(0)),
        Access::Plain | Access::SuppressNull => variant.invoke("GetHashCode", vec![]),
    }
}

fn string(variant: &Variant) -> Expr {
    match variant.invoker {
        Access::Conditional => variant
            .field()
            .conditional_member("ToString")
            .call(vec![])
            .coalesce(Expr::ident("string").member("Empty")),
        Access::Plain | Access::SuppressNull => variant.invoke("ToString", vec![]),
    }
}

fn declares_object_equals(declaration: &Declaration) -> bool {
    declaration.methods_named("Equals", 1).any(|method| {
        method.parameters.first().is_some_and(|ty| {
            ty.without_reference_annotation() == TypeRef::Predefined(Predefined::Object)
        })
    })
}

fn method(name: &str, returns: TypeRef, params: Vec<Param>, body: Expr) -> Member {
    Member::new(
        vec![Modifier::Public, Modifier::Override],
        MemberKind::Method {
            returns: Some(returns),
            name: name.to_string(),
            type_parameters: vec![],
            params,
            where_clauses: vec![],
            body: Body::Expr(body),
        },
    )
}

impl Synthesizer for ObjectOverrides {
    fn name(&self) -> &'static str {
        "object"
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let declaration = &ctx.union.declaration;
        let mut members = vec![];

        if !declares_object_equals(declaration) {
            let is_union = Expr::IsType {
                expr: Box::new(Expr::ident("obj")),
                ty: ctx.union.self_type(),
                name: "other".to_string(),
            };
            members.push(method(
                "Equals",
                types::bool(),
                vec![Param::new(types::object().nullable(), "obj")],
                is_union.and(Expr::ident("Equals").call(vec![Expr::ident("other")])),
            ));
        }

        if !declaration.declares_method("GetHashCode", 0) {
            members.push(method(
                "GetHashCode",
                types::int(),
                vec![],
                index_switch(
                    ctx.variants()
                        .iter()
                        .map(|variant| (discriminant(variant), hash(variant))),
                ),
            ));
        }

        if !declaration.declares_method("ToString", 0) {
            members.push(
                method(
                    "ToString",
                    types::string(),
                    vec![],
                    index_switch(
                        ctx.variants()
                            .iter()
                            .map(|variant| (discriminant(variant), string(variant))),
                    ),
                )
                .with_doc("The string form of the held value."),
            );
        }

        Ok(members)
    }
}

use convert_case::{Case, Casing};
use eithergen_syntax::model::{Constraint, TypeParameter, TypeRef};

use super::{
    Flavor, SynthContext, Synthesizer, discriminant, doc_type,
    flavor::{CANCELLATION_TOKEN, STATE},
    index_switch,
};
use crate::{
    GenerateError,
    cs::{Body, Expr, Member, MemberKind, Modifier, Param, Stmt, WhereClause, types},
    resolve::Strategy,
    union::Variant,
};

/// `Map{Suffix}` for every type parameter of a generic union.
pub struct Mapping;

/// `T1` => `1`, `TLeft` => `Left`, `value` => `Value`.
pub(super) fn suffix(parameter: &str) -> String {
    let mut chars = parameter.chars();
    let stripped = match (chars.next(), chars.next()) {
        (Some('T'), Some(next)) if next.is_ascii_uppercase() || next.is_ascii_digit() => {
            &parameter[1..]
        }
        _ => parameter,
    };
    stripped.to_case(Case::Pascal)
}

/// A variant that can be replaced by a fresh type parameter.
pub(super) struct Target<'a> {
    pub variant: &'a Variant,
    pub parameter: &'a TypeParameter,
    /// The replacement type parameter.
    pub fresh: String,
    /// The union with the parameter replaced.
    pub result: TypeRef,
}

impl Target<'_> {
    pub fn suffix(&self) -> String {
        suffix(&self.parameter.name)
    }

    /// The parameter's constraints, restated for the replacement.
    pub fn where_clauses(&self) -> Vec<WhereClause> {
        let replacement = types::parameter(&self.fresh);
        let constraints: Vec<Constraint> = self
            .parameter
            .constraints
            .iter()
            .filter(|constraint| **constraint != Constraint::Default)
            .map(|constraint| match constraint {
                Constraint::Type(ty) => {
                    Constraint::Type(ty.substitute(&self.parameter.name, &replacement))
                }
                other => other.clone(),
            })
            .collect();
        if constraints.is_empty() {
            vec![]
        } else {
            vec![WhereClause {
                parameter: self.fresh.clone(),
                constraints,
            }]
        }
    }

    /// `new Result(_valueN)` for a variant that is carried over.
    pub fn carry(&self, variant: &Variant) -> Expr {
        Expr::new_object(self.result.clone(), vec![variant.receiver_expr()])
    }
}

fn referenced_by_others(ctx: &SynthContext, parameter: &TypeParameter) -> bool {
    ctx.union.type_parameters().iter().any(|other| {
        other.name != parameter.name
            && other.constraints.iter().any(|constraint| match constraint {
                Constraint::Type(ty) => ty.mentions(&parameter.name),
                _ => false,
            })
    })
}

/// Every variant of a generic union that `Map` and `Bind` can replace.
pub(super) fn targets<'a>(ctx: &SynthContext<'a>) -> Vec<Target<'a>> {
    if ctx.union.strategy != Strategy::Generic {
        return vec![];
    }

    let fresh = ctx.union.fresh_name("TNew");
    ctx.variants()
        .iter()
        .filter_map(|variant| {
            let TypeRef::TypeParameter(name) = &variant.ty else {
                return None;
            };
            let parameter = ctx
                .union
                .type_parameters()
                .iter()
                .find(|parameter| &parameter.name == name)?;
            if referenced_by_others(ctx, parameter) {
                log::debug!(
                    "`{name}` is used by other constraints of `{}`, no Map/Bind for it",
                    ctx.union.name()
                );
                return None;
            }
            Some(Target {
                variant,
                parameter,
                result: ctx
                    .union
                    .self_type_replacing(name, &types::parameter(&fresh)),
                fresh: fresh.clone(),
            })
        })
        .collect()
}

/// Shared shape of `Map` and `Bind`: the continuation produces `output`,
/// and `wrap` turns its (awaited) result into the returned union.
pub(super) fn transform(
    ctx: &SynthContext,
    target: &Target,
    flavor: Flavor,
    base: &str,
    output: TypeRef,
    wrap: impl Fn(Expr) -> Expr,
) -> Result<Member, GenerateError> {
    let state = types::parameter(&ctx.union.fresh_name("TState"));
    let mut type_parameters = vec![];
    if flavor.with_state {
        type_parameters.push(state.to_string());
    }
    type_parameters.push(target.fresh.clone());

    let mut params = flavor.leading(Some(&state));
    params.push(Param::new(
        flavor.continuation(
            Some(&state),
            target.variant.argument_type.clone(),
            Some(output),
        ),
        "f",
    ));
    params.extend(flavor.trailing());

    let mut arms = vec![];
    for variant in ctx.variants() {
        ctx.check()?;
        let value = if variant.index == target.variant.index {
            let call = Expr::ident("f").call(flavor.arguments(
                STATE,
                variant.receiver_expr(),
                CANCELLATION_TOKEN,
            ));
            wrap(if flavor.is_async {
                call.await_unscheduled()
            } else {
                call
            })
        } else {
            target.carry(variant)
        };
        arms.push((discriminant(variant), value));
    }

    let mut modifiers = vec![Modifier::Public];
    if flavor.is_async {
        modifiers.push(Modifier::Async);
    }

    Ok(Member::new(
        modifiers,
        MemberKind::Method {
            returns: flavor.returns(Some(target.result.clone())),
            name: flavor.name(&format!("{base}{}", target.suffix())),
            type_parameters,
            params,
            where_clauses: target.where_clauses(),
            body: Body::Block(vec![
                Stmt::guard_null("f"),
                Stmt::ret(index_switch(arms)),
            ]),
        },
    ))
}

impl Synthesizer for Mapping {
    fn name(&self) -> &'static str {
        "map"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        ctx.members.map && ctx.union.strategy == Strategy::Generic
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let mut members = vec![];
        for target in targets(ctx) {
            for flavor in Flavor::ALL {
                let result = target.result.clone();
                let member = transform(
                    ctx,
                    &target,
                    flavor,
                    "Map",
                    types::parameter(&target.fresh),
                    |value| Expr::new_object(result.clone(), vec![value]),
                )?;
                members.push(member.with_doc(format!(
                    "Transforms the {} variant, carrying every other variant over.",
                    doc_type(&target.variant.ty)
                )));
            }
        }
        Ok(members)
    }
}

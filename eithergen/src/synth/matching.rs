use super::{
    Flavor, SynthContext, Synthesizer, discriminant, guard_continuations, index_switch, public,
};
use crate::{
    GenerateError,
    cs::{Body, Member, MemberKind, Param, Stmt, types},
};

/// `Match` in every selected flavor.
pub struct Matching;

fn doc(flavor: Flavor) -> &'static str {
    match (flavor.with_state, flavor.is_async) {
        (false, false) => "Invokes the continuation for the held variant and returns its result.",
        (true, false) => {
            "Invokes the continuation for the held variant with <paramref name=\"state\"/> and returns its result."
        }
        (false, true) => "Invokes the asynchronous continuation for the held variant.",
        (true, true) => {
            "Invokes the asynchronous continuation for the held variant with <paramref name=\"state\"/>."
        }
    }
}

pub(super) fn synthesize_flavor(
    ctx: &SynthContext,
    flavor: Flavor,
) -> Result<Member, GenerateError> {
    let union = ctx.union;
    let state = types::parameter(&union.fresh_name("TState"));
    let result = union.fresh_name("TResult");

    let mut type_parameters = vec![];
    if flavor.with_state {
        type_parameters.push(state.to_string());
    }
    type_parameters.push(result.clone());

    let mut params = flavor.leading(Some(&state));
    let mut arms = vec![];
    for variant in ctx.variants() {
        ctx.check()?;
        params.push(Param::new(
            flavor.continuation(
                Some(&state),
                variant.argument_type.clone(),
                Some(types::parameter(&result)),
            ),
            variant.continuation(),
        ));
        arms.push((
            discriminant(variant),
            flavor.invoke(&variant.continuation(), variant.receiver_expr()),
        ));
    }
    params.extend(flavor.trailing());

    let mut body = guard_continuations(ctx.variants());
    body.push(Stmt::ret(index_switch(arms)));

    Ok(Member::new(
        public(),
        MemberKind::Method {
            returns: flavor.returns(Some(types::parameter(&result))),
            name: flavor.name("Match"),
            type_parameters,
            params,
            where_clauses: vec![],
            body: Body::Block(body),
        },
    )
    .with_doc(doc(flavor)))
}

impl Synthesizer for Matching {
    fn name(&self) -> &'static str {
        "match"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        Flavor::ALL
            .iter()
            .any(|flavor| flavor.match_selected(&ctx.members))
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        Flavor::ALL
            .into_iter()
            .filter(|flavor| flavor.match_selected(&ctx.members))
            .map(|flavor| synthesize_flavor(ctx, flavor))
            .collect()
    }
}

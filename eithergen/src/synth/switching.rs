use super::{
    Flavor, SynthContext, Synthesizer,
    flavor::{CANCELLATION_TOKEN, STATE},
    guard_continuations, public,
};
use crate::{
    GenerateError,
    cs::{Body, Expr, Member, MemberKind, Param, Stmt, types},
};

/// `Switch` in every selected flavor. Each is a thin layer over the `Match`
/// of the same flavor with unit-returning continuations.
pub struct Switching;

const LAMBDA_STATE: &str = "s";
const LAMBDA_VALUE: &str = "value";
const LAMBDA_TOKEN: &str = "token";

fn synthesize_flavor(ctx: &SynthContext, flavor: Flavor) -> Result<Member, GenerateError> {
    let union = ctx.union;
    let state = types::parameter(&union.fresh_name("TState"));

    let mut type_parameters = vec![];
    let mut type_arguments = vec![];
    if flavor.with_state {
        type_parameters.push(state.to_string());
        type_arguments.push(state.clone());
    }
    type_arguments.push(types::unit());

    let mut lambda_parameters = vec![];
    if flavor.with_state {
        lambda_parameters.push(LAMBDA_STATE.to_string());
    }
    lambda_parameters.push(LAMBDA_VALUE.to_string());
    if flavor.is_async {
        lambda_parameters.push(LAMBDA_TOKEN.to_string());
    }

    let mut params = flavor.leading(Some(&state));
    let mut arguments: Vec<Expr> = flavor
        .with_state
        .then(|| Expr::ident(STATE))
        .into_iter()
        .collect();
    for variant in ctx.variants() {
        ctx.check()?;
        params.push(Param::new(
            flavor.continuation(Some(&state), variant.argument_type.clone(), None),
            variant.continuation(),
        ));

        let call = Expr::ident(variant.continuation()).call(flavor.arguments(
            LAMBDA_STATE,
            Expr::ident(LAMBDA_VALUE),
            LAMBDA_TOKEN,
        ));
        let call = if flavor.is_async {
            call.await_unscheduled()
        } else {
            call
        };
        arguments.push(Expr::block_lambda(
            flavor.is_async,
            lambda_parameters.clone(),
            vec![Stmt::Expr(call), Stmt::ret(Expr::default_value())],
        ));
    }
    params.extend(flavor.trailing());
    if flavor.is_async {
        arguments.push(Expr::ident(CANCELLATION_TOKEN));
    }

    let dispatch = Expr::ident(flavor.name("Match")).call_generic(type_arguments, arguments);
    let mut body = guard_continuations(ctx.variants());
    body.push(if flavor.is_async {
        Stmt::ret(dispatch)
    } else {
        Stmt::Expr(dispatch)
    });

    Ok(Member::new(
        public(),
        MemberKind::Method {
            returns: flavor.returns(None),
            name: flavor.name("Switch"),
            type_parameters,
            params,
            where_clauses: vec![],
            body: Body::Block(body),
        },
    )
    .with_doc("Invokes the continuation for the held variant."))
}

impl Synthesizer for Switching {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        Flavor::ALL
            .iter()
            .any(|flavor| flavor.switch_selected(&ctx.members))
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        Flavor::ALL
            .into_iter()
            .filter(|flavor| flavor.switch_selected(&ctx.members))
            .map(|flavor| synthesize_flavor(ctx, flavor))
            .collect()
    }
}

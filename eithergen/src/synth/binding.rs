use super::{
    Flavor, SynthContext, Synthesizer, doc_type,
    mapping::{targets, transform},
};
use crate::{GenerateError, cs::Member, resolve::Strategy};

/// `Bind{Suffix}`: like `Map`, but the continuation returns the new union
/// itself.
pub struct Binding;

impl Synthesizer for Binding {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        ctx.members.bind && ctx.union.strategy == Strategy::Generic
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let mut members = vec![];
        for target in targets(ctx) {
            for flavor in Flavor::ALL {
                let member = transform(ctx, &target, flavor, "Bind", target.result.clone(), |value| {
                    value
                })?;
                members.push(member.with_doc(format!(
                    "Continues with the {} variant, carrying every other variant over.",
                    doc_type(&target.variant.ty)
                )));
            }
        }
        Ok(members)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::synth::testing;

    const SOURCE: &str = r#"
        #nullable enable
        [Either]
        public partial class Result<TOk, TError> where TOk : notnull where TError : notnull
        {
        }
    "#;

    #[test]
    fn bind_returns_the_continuation_result() {
        let union = testing::union(SOURCE);
        let source = testing::render(&Binding, &union);
        assert!(source.starts_with(
            "public Result<TNew, TError> BindOk<TNew>(global::System.Func<TOk, Result<TNew, TError>> f)\n"
        ));
        assert!(source.contains("1 => f(_value1!),"));
        assert!(source.contains("2 => new Result<TNew, TError>(_value2!),"));
        assert!(source.contains(
            "1 => await f(state, _value1!, cancellationToken).ConfigureAwait(false),"
        ));
    }

    #[test]
    fn one_member_per_parameter_and_flavor() {
        let union = testing::union(SOURCE);
        assert_eq!(testing::members(&Binding, &union).len(), 8);
    }
}

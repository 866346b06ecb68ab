use super::{INDEX_FIELD, SynthContext, Synthesizer, discriminant, doc_type, public};
use crate::{
    GenerateError,
    cs::{Body, Expr, Member, MemberKind, Param, Stmt},
};

/// One constructor per variant, unless the user already wrote one taking the
/// same type.
pub struct Constructors;

impl Synthesizer for Constructors {
    fn name(&self) -> &'static str {
        "constructors"
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let union = ctx.union;
        let mut members = vec![];

        for variant in ctx.variants() {
            ctx.check()?;
            if union.declares_constructor_for(variant) {
                log::debug!(
                    "`{}` declares a constructor for `{}`",
                    union.name(),
                    variant.name
                );
                continue;
            }

            let mut body = vec![];
            if variant.rejects_null() {
                body.push(Stmt::guard_null("value"));
            }
            body.push(Stmt::assign(INDEX_FIELD, discriminant(variant)));
            for slot in ctx.variants() {
                let value = if slot.index == variant.index {
                    Expr::ident("value")
                } else {
                    slot.default_expr.clone()
                };
                body.push(Stmt::assign(slot.field_name(), value));
            }

            members.push(
                Member::new(
                    public(),
                    MemberKind::Constructor {
                        name: union.name().to_string(),
                        params: vec![Param::new(variant.argument_type.clone(), "value")],
                        body: Body::Block(body),
                    },
                )
                .with_doc(format!(
                    "Creates an instance holding a {}.",
                    doc_type(&variant.ty)
                )),
            );
        }
        Ok(members)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synth::testing;

    #[test]
    fn constructor_sets_index_and_defaults() {
        let union = testing::union(
            r#"
            #nullable enable
            [Either(typeof(string), typeof(int?))]
            public partial struct Value { }
            "#,
        );
        assert_eq!(
            testing::render(&Constructors, &union),
            "public Value(string value)\n\
             {\n    \
                 if (value is null)\n        \
                     throw new global::System.ArgumentNullException(nameof(value));\n    \
                 _index = 1;\n    \
                 _value1 = value;\n    \
                 _value2 = default;\n\
             }\n\
             public Value(int? value)\n\
             {\n    \
                 _index = 2;\n    \
                 _value1 = default!;\n    \
                 _value2 = value;\n\
             }\n"
        );
    }

    #[test]
    fn user_constructors_are_kept() {
        let union = testing::union(
            r#"
            #nullable enable
            [Either]
            public partial class Choice<TLeft, TRight>
            {
                public Choice(TLeft? value) { }
            }
            "#,
        );
        let members = testing::members(&Constructors, &union);
        assert_eq!(members.len(), 1);
        let MemberKind::Constructor { params, .. } = &members[0].kind else {
            panic!("expected a constructor");
        };
        assert_eq!(params[0].ty.to_string(), "TRight");
    }
}

use super::{SynthContext, Synthesizer, discriminant, index, index_switch, public};
use crate::{
    GenerateError,
    cs::{Body, Expr, Literal, Member, MemberKind, Param, Stmt, types},
    union::{Access, Variant},
};

/// `IEquatable<Self>.Equals`. Different variants are unequal; two default
/// instances are an invalid state.
pub struct Equality;

fn equals(variant: &Variant) -> Expr {
    let theirs = variant.field_of(Expr::ident("other"));
    match variant.invoker {
        Access::Conditional => Expr::conditional(
            variant.field().is_null(),
            theirs.clone().is_null(),
            variant.field().method("Equals", vec![theirs]),
        ),
        Access::Plain | Access::SuppressNull => variant.invoke("Equals", vec![theirs]),
    }
}

impl Synthesizer for Equality {
    fn name(&self) -> &'static str {
        "equality"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        !ctx.union.declares_typed_equals()
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let union = ctx.union;
        let other = || Expr::ident("other");
        let return_false = || vec![Stmt::ret(Expr::Literal(Literal::Bool(false)))];

        let mut body = vec![];
        let parameter = if union.is_value_type() {
            union.self_type()
        } else {
            body.push(Stmt::If {
                condition: other().is_null(),
                then: return_false(),
            });
            union.self_type().nullable()
        };
        body.push(Stmt::If {
            condition: index().not_eq(other().member(super::INDEX_FIELD)),
            then: return_false(),
        });

        let mut arms = vec![];
        for variant in ctx.variants() {
            ctx.check()?;
            arms.push((discriminant(variant), equals(variant)));
        }
        body.push(Stmt::ret(index_switch(arms)));

        Ok(vec![
            Member::new(
                public(),
                MemberKind::Method {
                    returns: Some(types::bool()),
                    name: "Equals".to_string(),
                    type_parameters: vec![],
                    params: vec![Param::new(parameter, "other")],
                    where_clauses: vec![],
                    body: Body::Block(body),
                },
            )
            .with_doc("Whether both instances hold the same variant with equal values."),
        ])
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synth::testing;

    #[test]
    fn discriminants_are_compared_first() {
        let union = testing::union(
            r#"
            #nullable enable
            [Either(typeof(string), typeof(string?), typeof(int))]
            public readonly partial struct Value { }
            "#,
        );
        assert_eq!(
            testing::render(&Equality, &union),
            "public bool Equals(Value other)\n\
             {\n    \
                 if (_index != other._index)\n        \
                     return false;\n    \
                 return _index switch\n    \
                 {\n        \
                     1 => _value1!.Equals(other._value1),\n        \
                     2 => _value2 is null ? other._value2 is null : _value2.Equals(other._value2),\n        \
                     3 => _value3.Equals(other._value3),\n        \
                     _ => throw new global::System.InvalidOperationException(\"The union does not hold a value, it was not created through one of its constructors.\"),\n    \
                 };\n\
             }\n"
        );
    }

    #[test]
    fn class_unions_reject_null() {
        let union = testing::union("[Either] public partial class Pair<T1, T2> { }");
        let source = testing::render(&Equality, &union);
        assert!(source.starts_with(
            "public bool Equals(Pair<T1, T2>? other)\n{\n    if (other is null)\n        return false;\n"
        ));
    }

    #[test]
    fn only_a_typed_equals_replaces_it() {
        let applies = |body: &str| {
            let union = testing::union(&format!(
                "[Either] public partial struct Pair<T1, T2> {{ {body} }}"
            ));
            !testing::members(&Equality, &union).is_empty()
        };

        assert!(applies("public override bool Equals(object? obj) => false;"));
        assert!(applies("public bool Equals(int other) => false;"));
        assert!(applies("public bool Equals(Pair<T2, T1> other) => false;"));
        assert!(!applies("public bool Equals(Pair<T1, T2> other) => false;"));
        assert!(!applies("public bool Equals(global::Lib.Pair<T1, T2> other) => false;"));
    }
}

use super::{SynthContext, Synthesizer, doc_type};
use crate::{
    GenerateError,
    cs::{Body, Expr, Literal, Member, MemberKind, Modifier, Param, Stmt, types},
};

/// Implicit conversions from each variant type, `==` and `!=`.
pub struct Operators;

impl Synthesizer for Operators {
    fn name(&self) -> &'static str {
        "operators"
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let union = ctx.union;
        let self_type = union.self_type();
        let public_static = || vec![Modifier::Public, Modifier::Static];
        let mut members = vec![];

        for variant in ctx.variants() {
            ctx.check()?;
            if !variant.allows_conversion() {
                log::debug!(
                    "no implicit conversion from `{}` to `{}`",
                    variant.name,
                    union.name()
                );
                continue;
            }
            members.push(
                Member::new(
                    public_static(),
                    MemberKind::Conversion {
                        target: self_type.clone(),
                        param: Param::new(variant.argument_type.clone(), "value"),
                        body: Body::Expr(Expr::new_object(
                            self_type.clone(),
                            vec![Expr::ident("value")],
                        )),
                    },
                )
                .with_doc(format!("Wraps a {}.", doc_type(&variant.ty))),
            );
        }

        let left = || Expr::ident("left");
        let right = || Expr::ident("right");
        let (operand, equals) = if union.is_value_type() {
            (
                self_type.clone(),
                Body::Expr(left().method("Equals", vec![right()])),
            )
        } else {
            (
                self_type.clone().nullable(),
                Body::Block(vec![
                    Stmt::If {
                        condition: Expr::ident(types::OBJECT_REFERENCE_EQUALS)
                            .call(vec![left(), right()]),
                        then: vec![Stmt::ret(Expr::Literal(Literal::Bool(true)))],
                    },
                    Stmt::If {
                        condition: left().is_null().or(right().is_null()),
                        then: vec![Stmt::ret(Expr::Literal(Literal::Bool(false)))],
                    },
                    Stmt::ret(left().method("Equals", vec![right()])),
                ]),
            )
        };
        let params = || {
            vec![
                Param::new(operand.clone(), "left"),
                Param::new(operand.clone(), "right"),
            ]
        };

        members.push(Member::new(
            public_static(),
            MemberKind::Operator {
                returns: types::bool(),
                operator: "==",
                params: params(),
                body: equals,
            },
        ));
        members.push(Member::new(
            public_static(),
            MemberKind::Operator {
                returns: types::bool(),
                operator: "!=",
                params: params(),
                body: Body::Expr(left().eq(right()).not()),
            },
        ));
        Ok(members)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synth::testing;

    #[test]
    fn struct_operators() {
        let union = testing::union("[Either] public partial struct Pair<T1, T2> { }");
        assert_eq!(
            testing::render(&Operators, &union),
            "public static implicit operator Pair<T1, T2>(T1? value) => new Pair<T1, T2>(value);\n\
             public static implicit operator Pair<T1, T2>(T2? value) => new Pair<T1, T2>(value);\n\
             public static bool operator ==(Pair<T1, T2> left, Pair<T1, T2> right) => left.Equals(right);\n\
             public static bool operator !=(Pair<T1, T2> left, Pair<T1, T2> right) => !(left == right);\n"
        );
    }

    #[test]
    fn class_equality_checks_identity_and_null() {
        let union = testing::union(
            "#nullable enable\n[Either] public partial class Pair<T1, T2> { }",
        );
        let source = testing::render(&Operators, &union);
        assert!(source.contains(
            "public static bool operator ==(Pair<T1, T2>? left, Pair<T1, T2>? right)\n\
             {\n    \
                 if (global::System.Object.ReferenceEquals(left, right))\n        \
                     return true;\n    \
                 if (left is null || right is null)\n        \
                     return false;\n    \
                 return left.Equals(right);\n\
             }\n"
        ));
    }

    #[test]
    fn no_conversions_from_interfaces_or_object() {
        let union = testing::union(
            r#"
            [Either(typeof(System.IDisposable), typeof(object), typeof(int))]
            public partial struct Value { }
            "#,
        );
        let conversions = testing::members(&Operators, &union)
            .into_iter()
            .filter(|member| matches!(member.kind, MemberKind::Conversion { .. }))
            .count();
        assert_eq!(conversions, 1);
    }
}

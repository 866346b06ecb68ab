use eithergen_syntax::model::TypeRef;

use super::{SynthContext, Synthesizer, discriminant, doc_type, index, invalid_state, public};
use crate::{
    GenerateError,
    cs::{Attribute, Body, Expr, Literal, Member, MemberKind, Param, Stmt, SwitchCase, types},
    union::{UnionDeclaration, Variant},
};

/// Extraction without throwing: `TryPick(out value)` per variant and the
/// optional `TryPick(out value, out remainder)`.
pub struct TryPick;

fn maybe_null_when(value: bool) -> Attribute {
    Attribute::new(
        types::MAYBE_NULL_WHEN,
        vec![Expr::Literal(Literal::Bool(value))],
    )
}

fn out(ty: TypeRef, name: &str, maybe_null_when_picked: Option<bool>) -> Param {
    let param = Param::new(ty, name).out();
    match maybe_null_when_picked {
        Some(value) => param.with_attribute(maybe_null_when(value)),
        None => param,
    }
}

fn value_param(variant: &Variant) -> Param {
    out(
        variant.argument_type.clone(),
        "value",
        variant.rejects_null().then_some(false),
    )
}

fn method(params: Vec<Param>, body: Vec<Stmt>) -> Member {
    Member::new(
        public(),
        MemberKind::Method {
            returns: Some(types::bool()),
            name: "TryPick".to_string(),
            type_parameters: vec![],
            params,
            where_clauses: vec![],
            body: Body::Block(body),
        },
    )
}

fn returns(value: bool) -> Stmt {
    Stmt::ret(Expr::Literal(Literal::Bool(value)))
}

fn single(variant: &Variant) -> Member {
    method(
        vec![value_param(variant)],
        vec![
            Stmt::If {
                condition: index().eq(discriminant(variant)),
                then: vec![
                    Stmt::assign("value", variant.receiver_expr()),
                    returns(true),
                ],
            },
            Stmt::assign("value", variant.default_expr.clone()),
            returns(false),
        ],
    )
    .with_doc(format!(
        "Gets the {} when it is the held variant.",
        doc_type(&variant.ty)
    ))
}

/// How the remainder of a pick is typed and filled.
enum Remainder<'a> {
    /// Two variants: the other one's value.
    Other(&'a Variant),
    /// The sibling union without the picked variant.
    Union(TypeRef),
}

impl Remainder<'_> {
    fn param(&self, union: &UnionDeclaration) -> Param {
        match self {
            Self::Other(other) => out(
                other.argument_type.clone(),
                "remainder",
                other.rejects_null().then_some(true),
            ),
            Self::Union(ty) => out(
                ty.clone(),
                "remainder",
                (!union.is_value_type()).then_some(true),
            ),
        }
    }

    fn empty(&self, union: &UnionDeclaration) -> Expr {
        match self {
            Self::Other(other) => other.default_expr.clone(),
            Self::Union(_) => Expr::Default {
                suppressed: !union.is_value_type(),
            },
        }
    }

    fn holding(&self, variant: &Variant) -> Expr {
        match self {
            Self::Other(_) => variant.receiver_expr(),
            Self::Union(ty) => Expr::new_object(ty.clone(), vec![variant.receiver_expr()]),
        }
    }
}

fn with_remainder(ctx: &SynthContext, picked: &Variant, remainder: Remainder) -> Member {
    let union = ctx.union;
    let cases = ctx
        .variants()
        .iter()
        .map(|variant| {
            let body = if variant.index == picked.index {
                vec![
                    Stmt::assign("value", variant.receiver_expr()),
                    Stmt::assign("remainder", remainder.empty(union)),
                    returns(true),
                ]
            } else {
                vec![
                    Stmt::assign("value", picked.default_expr.clone()),
                    Stmt::assign("remainder", remainder.holding(variant)),
                    returns(false),
                ]
            };
            SwitchCase {
                label: discriminant(variant),
                body,
            }
        })
        .collect();

    method(
        vec![value_param(picked), remainder.param(union)],
        vec![Stmt::Switch {
            subject: index(),
            cases,
            default: vec![Stmt::Throw(invalid_state())],
        }],
    )
    .with_doc(format!(
        "Gets the {} when it is the held variant, otherwise what is held instead.",
        doc_type(&picked.ty)
    ))
}

impl Synthesizer for TryPick {
    fn name(&self) -> &'static str {
        "try_pick"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        ctx.members.try_pick || ctx.members.try_pick_remainder
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let variants = ctx.variants();
        let mut members = vec![];

        if ctx.members.try_pick {
            for variant in variants {
                ctx.check()?;
                members.push(single(variant));
            }
        }

        if ctx.members.try_pick_remainder {
            for variant in variants {
                ctx.check()?;
                let remainder = if let [first, second] = variants {
                    Remainder::Other(if variant.index == first.index { second } else { first })
                } else {
                    match ctx.union.remainder_type(variant.index) {
                        Some(ty) => Remainder::Union(ty),
                        None => {
                            log::debug!(
                                "`{}` has no {}-variant sibling, no remainder for `{}`",
                                ctx.union.name(),
                                variants.len() - 1,
                                variant.name
                            );
                            continue;
                        }
                    }
                };
                members.push(with_remainder(ctx, variant, remainder));
            }
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
    fn single_pick() {
        let union = testing::union(
            r#"
            #nullable enable
            [Either(typeof(string), typeof(int))]
            public partial struct Value { }
            "#,
        );
        let source = testing::render(&TryPick, &union);
        assert!(source.contains(
            "public bool TryPick([global::System.Diagnostics.CodeAnalysis.MaybeNullWhen(false)] out string value)\n\
             {\n    \
                 if (_index == 1)\n    \
                 {\n        \
                     value = _value1!;\n        \
                     return true;\n    \
                 }\n    \
                 value = default!;\n    \
                 return false;\n\
             }\n"
        ));
        assert!(source.contains("public bool TryPick(out int value)\n"));
    }

    #[test]
    fn two_variants_pick_the_other() {
        let union = testing::union(
            r#"
            #nullable enable
            [Either(typeof(string), typeof(int))]
            public partial struct Value { }
            "#,
        );
        let source = testing::render(&TryPick, &union);
        assert!(source.contains(
            "public bool TryPick(out int value, \
             [global::System.Diagnostics.CodeAnalysis.MaybeNullWhen(true)] out string remainder)\n\
             {\n    \
                 switch (_index)\n    \
                 {\n        \
                     case 1:\n            \
                         value = default;\n            \
                         remainder = _value1!;\n            \
                         return false;\n        \
                     case 2:\n            \
                         value = _value2;\n            \
                         remainder = default!;\n            \
                         return true;\n        \
                     default:\n            \
                         throw new global::System.InvalidOperationException("
        ));
    }

    #[test]
    fn remainder_union_needs_a_sibling() {
        let siblings = r#"
            [Either] public partial struct Of<T1, T2> { }
            [Either] public partial struct Of<T1, T2, T3> { }
        "#;
        let declarations =
            eithergen_syntax::declarations(siblings, &Default::default()).unwrap();
        let union = crate::union::UnionDeclaration::build(
            &declarations[1],
            &crate::CancellationToken::new(),
        )
        .unwrap()
        .unwrap();
        let source = testing::render(&TryPick, &union);
        assert!(source.contains("out Of<T2, T3> remainder"));
        assert!(source.contains("remainder = new Of<T1, T3>(_value2);"));

        let alone = testing::union("[Either] public partial struct Of<T1, T2, T3> { }");
        let remainders = testing::members(&TryPick, &alone)
            .into_iter()
            .filter(|member| matches!(&member.kind, MemberKind::Method { params, .. } if params.len() == 2))
            .count();
        assert_eq!(remainders, 0);
    }
}

use super::{INDEX_FIELD, SynthContext, Synthesizer, discriminant, index, invalid_state};
use crate::{
    GenerateError,
    cs::{Body, Expr, Member, MemberKind, Modifier, Param, Stmt, SwitchCase, types},
};

const INDEX_KEY: &str = "Index";

fn value_key(index: usize) -> String {
    format!("Value{index}")
}

/// `ISerializable` support, when the type lists the interface but does not
/// implement it itself.
pub struct Serialization;

impl Synthesizer for Serialization {
    fn name(&self) -> &'static str {
        "serialization"
    }

    fn applies(&self, ctx: &SynthContext) -> bool {
        let declaration = &ctx.union.declaration;
        declaration.declares_serializable() && !declaration.declares_method("GetObjectData", 2)
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
        let params = || {
            vec![
                Param::new(types::serialization("SerializationInfo"), "info"),
                Param::new(types::serialization("StreamingContext"), "context"),
            ]
        };
        let info = || Expr::ident("info");

        // Reconstruction
        let mut body = vec![Stmt::assign(
            INDEX_FIELD,
            info().method("GetByte", vec![Expr::str(INDEX_KEY)]),
        )];
        for variant in ctx.variants() {
            body.push(Stmt::assign(variant.field_name(), variant.default_expr.clone()));
        }
        let mut cases = vec![];
        for variant in ctx.variants() {
            ctx.check()?;
            let mut read = info().method(
                "GetValue",
                vec![
                    Expr::str(value_key(variant.index)),
                    Expr::TypeOf(variant.runtime_type.clone()),
                ],
            );
            if !variant.is_nullable() {
                read = read.suppress_null();
            }
            cases.push(SwitchCase {
                label: discriminant(variant),
                body: vec![
                    Stmt::assign(variant.field_name(), read.cast(variant.storage_type.clone())),
                    Stmt::Break,
                ],
            });
        }
        body.push(Stmt::Switch {
            subject: index(),
            cases,
            default: vec![Stmt::Throw(Expr::new_object(
                types::serialization("SerializationException"),
                vec![Expr::str(format!(
                    "Unknown {INDEX_KEY} while deserializing {}.",
                    ctx.union.name()
                ))],
            ))],
        });
        let constructor = Member::new(
            vec![Modifier::Private],
            MemberKind::Constructor {
                name: ctx.union.name().to_string(),
                params: params(),
                body: Body::Block(body),
            },
        );

        // Persistence
        let cases = ctx
            .variants()
            .iter()
            .map(|variant| SwitchCase {
                label: discriminant(variant),
                body: vec![
                    Stmt::Expr(info().method(
                        "AddValue",
                        vec![
                            Expr::str(value_key(variant.index)),
                            variant.field(),
                            Expr::TypeOf(variant.runtime_type.clone()),
                        ],
                    )),
                    Stmt::Break,
                ],
            })
            .collect();
        let get_object_data = Member::new(
            vec![],
            MemberKind::Method {
                returns: None,
                name: format!("{}.GetObjectData", types::serialization("ISerializable")),
                type_parameters: vec![],
                params: params(),
                where_clauses: vec![],
                body: Body::Block(vec![
                    Stmt::Switch {
                        subject: index(),
                        cases,
                        default: vec![Stmt::Throw(invalid_state())],
                    },
                    Stmt::Expr(info().method(
                        "AddValue",
                        vec![Expr::str(INDEX_KEY), index()],
                    )),
                ]),
            },
        );

        Ok(vec![constructor, get_object_data])
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synth::testing;

    const SOURCE: &str = r#"
        #nullable enable
        using System.Runtime.Serialization;

        [Either(typeof(string), typeof(int?))]
        public partial class Value : ISerializable { }
    "#;

    #[test]
    fn round_trip_keys() {
        let union = testing::union(SOURCE);
        let source = testing::render(&Serialization, &union);
        assert!(source.contains("_index = info.GetByte(\"Index\");"));
        assert!(source.contains(
            "_value1 = (string?)info.GetValue(\"Value1\", typeof(string))!;"
        ));
        assert!(source.contains("_value2 = (int?)info.GetValue(\"Value2\", typeof(int?));"));
        assert!(source.contains("info.AddValue(\"Value1\", _value1, typeof(string));"));
        assert!(source.contains("info.AddValue(\"Index\", _index);"));
        assert!(source.contains(
            "throw new global::System.Runtime.Serialization.SerializationException(\"Unknown Index while deserializing Value.\");"
        ));
    }

    #[test]
    fn explicit_interface_implementation() {
        let union = testing::union(SOURCE);
        let source = testing::render(&Serialization, &union);
        assert!(source.contains(
            "void global::System.Runtime.Serialization.ISerializable.GetObjectData(\
             global::System.Runtime.Serialization.SerializationInfo info, \
             global::System.Runtime.Serialization.StreamingContext context)"
        ));
        assert!(source.starts_with("private Value("));
    }

    #[test]
    fn skipped_when_implemented_or_not_declared() {
        let union = testing::union(
            r#"
            [Either(typeof(string), typeof(int))]
            public partial class Value : System.Runtime.Serialization.ISerializable
            {
                public void GetObjectData(SerializationInfo info, StreamingContext context) { }
            }
            "#,
        );
        assert!(testing::members(&Serialization, &union).is_empty());

        let union = testing::union(
            r#"
            [Either(typeof(string), typeof(int))]
            public partial class Value { }
            "#,
        );
        assert!(testing::members(&Serialization, &union).is_empty());
    }
}

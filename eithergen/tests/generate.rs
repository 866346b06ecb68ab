use eithergen::{GeneratorOptions, GeneratorOutput, generate_source};
use eithergen_syntax::ParseOptions;

fn generate(source: &str) -> GeneratorOutput {
    generate_source(source, &ParseOptions::default(), &GeneratorOptions::default())
        .unwrap_or_else(|error| panic!("{error}"))
}

/// The single unit generated for `source`.
fn unit(source: &str) -> String {
    let output = generate(source);
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );
    assert_eq!(output.units.len(), 1);
    output.units.into_iter().next().unwrap().source
}

macro_rules! assert_contains {
    ($source:expr, $($fragment:expr),+ $(,)?) => {{
        let source: &str = &$source;
        $(
            assert!(
                source.contains($fragment),
                "missing `{}` in:\n{}",
                $fragment,
                source
            );
        )+
    }};
}

mod scenario {
    use super::*;

    const SOURCE: &str = r#"
        #nullable enable
        using System;

        namespace Values
        {
            [Either(typeof(string), typeof(int), typeof(int?))]
            public readonly partial struct Value
            {
            }
        }
    "#;

    #[test]
    fn storage() {
        assert_contains!(
            unit(SOURCE),
            "private readonly byte _index;",
            "private readonly string? _value1;",
            "private readonly int _value2;",
            "private readonly int? _value3;",
        );
    }

    #[test]
    fn constructors_set_their_index() {
        let source = unit(SOURCE);
        assert_contains!(
            source,
            "public Value(string value)",
            "public Value(int value)",
            "public Value(int? value)",
            "_index = 1;",
            "_index = 2;",
            "_index = 3;",
        );
        // only the string constructor rejects null
        assert_eq!(source.matches("nameof(value)").count(), 1);
    }

    #[test]
    fn conversions_and_operators() {
        assert_contains!(
            unit(SOURCE),
            "public static implicit operator Value(string value) => new Value(value);",
            "public static implicit operator Value(int? value) => new Value(value);",
            "public static bool operator ==(Value left, Value right) => left.Equals(right);",
            "public static bool operator !=(Value left, Value right) => !(left == right);",
        );
    }

    #[test]
    fn equality_never_throws_on_different_variants() {
        let source = unit(SOURCE);
        let equals = source
            .find("public bool Equals(Value other)")
            .expect("IEquatable implementation");
        let discriminants = source[equals..]
            .find("if (_index != other._index)")
            .expect("discriminant comparison");
        let dispatch = source[equals..]
            .find("return _index switch")
            .expect("value comparison");
        assert!(discriminants < dispatch);
        assert_contains!(
            source,
            "public readonly partial struct Value : global::System.IEquatable<Value>",
            "3 => _value3.Equals(other._value3),",
        );
    }

    #[test]
    fn try_pick_compares_its_index() {
        assert_contains!(
            unit(SOURCE),
            "out string value)",
            "if (_index == 1)",
            "if (_index == 3)",
            "public bool TryPick(out int? value)",
        );
    }

    #[test]
    fn match_dispatches_through_receivers() {
        assert_contains!(
            unit(SOURCE),
            "1 => f1(_value1!),",
            "2 => f2(_value2),",
            "3 => f3(_value3),",
            "Match<global::System.ValueTuple>(",
            "public void Switch(",
            "public global::System.Threading.Tasks.Task SwitchAsync<TState>(",
        );
    }

    #[test]
    fn default_instances_are_invalid() {
        let source = unit(SOURCE);
        assert!(source.matches("_ => throw new global::System.InvalidOperationException(").count() >= 6);
    }

    #[test]
    fn explicit_unions_have_no_map() {
        let source = unit(SOURCE);
        assert!(!source.contains(" Map"));
        assert!(!source.contains(" Bind"));
    }
}

mod nullability {
    use super::*;

    macro_rules! nullability {
        ($($name:ident: $context:literal, $declaration:literal => $storage:literal, $argument:literal, $guarded:literal;)+) => {
            $(
                #[test]
                fn $name() {
                    let source = unit(&format!("{}\n{}", $context, $declaration));
                    assert_contains!(
                        source,
                        &format!("private readonly {} _value1;", $storage),
                        &format!("({} value)\n", $argument),
                    );
                    assert_eq!(source.contains("nameof(value)"), $guarded);
                }
            )+
        };
    }

    nullability! {
        string_enabled: "#nullable enable",
            "[Either(typeof(string), typeof(int))] partial struct Of { }"
            => "string?", "string", true;
        string_disabled: "#nullable disable",
            "[Either(typeof(string), typeof(int))] partial struct Of { }"
            => "string?", "string?", false;
        string_unspecified: "",
            "[Either(typeof(string), typeof(int))] partial struct Of { }"
            => "string?", "string?", false;
        int_enabled: "#nullable enable",
            "[Either(typeof(int), typeof(long))] partial struct Of { }"
            => "int", "int", false;
        nullable_int: "#nullable enable",
            "[Either(typeof(int?), typeof(long))] partial struct Of { }"
            => "int?", "int?", false;
        nullable_spelled_out: "#nullable enable",
            "[Either(typeof(System.Nullable<int>), typeof(long))] partial struct Of { }"
            => "System.Nullable<int>", "System.Nullable<int>", false;
        notnull_enabled: "#nullable enable",
            "[Either] partial struct Of<T, TOther> where T : notnull where TOther : struct { }"
            => "T?", "T", true;
        notnull_disabled: "#nullable disable",
            "[Either] partial struct Of<T, TOther> where T : notnull where TOther : struct { }"
            => "T?", "T", true;
        struct_constraint: "#nullable enable",
            "[Either] partial struct Of<T, TOther> where T : struct where TOther : struct { }"
            => "T", "T", false;
        class_constraint: "#nullable enable",
            "[Either] partial struct Of<T, TOther> where T : class where TOther : struct { }"
            => "T?", "T", true;
        nullable_class_disabled: "#nullable disable",
            "[Either] partial struct Of<T, TOther> where T : class? where TOther : struct { }"
            => "T?", "T?", false;
        unconstrained_enabled: "#nullable enable",
            "[Either] partial struct Of<T, TOther> where TOther : struct { }"
            => "T?", "T", true;
        unconstrained_disabled: "#nullable disable",
            "[Either] partial struct Of<T, TOther> where TOther : struct { }"
            => "T?", "T?", false;
    }

    #[test]
    fn restore_returns_to_the_project_setting() {
        let source = r#"
            #nullable disable
            #nullable restore
            [Either(typeof(string), typeof(int))] partial struct Of { }
        "#;
        let options = ParseOptions {
            nullable_context: eithergen_syntax::model::NullableContext::Enabled,
            ..Default::default()
        };
        let output = generate_source(source, &options, &GeneratorOptions::default()).unwrap();
        assert!(output.units[0].source.contains("nameof(value)"));
    }
}

mod arity {
    use super::*;

    fn check(arity: usize) {
        let parameters: Vec<String> = (1..=arity).map(|i| format!("T{i}")).collect();
        let source = unit(&format!(
            "[Either] public partial struct Of<{}> {{ }}",
            parameters.join(", ")
        ));

        assert_contains!(
            source,
            &format!("private readonly T{arity}? _value{arity};"),
            &format!("{arity} => f{arity}(_value{arity}),"),
        );
        let mapped: Vec<&str> = std::iter::once("TNew")
            .chain(parameters[1..].iter().map(String::as_str))
            .collect();
        assert_contains!(source, &format!("public Of<{}> Map1<TNew>(", mapped.join(", ")));
        assert!(!source.contains(&format!("_value{}", arity + 1)));
        assert_eq!(source.matches("public Of(").count(), arity);
    }

    macro_rules! arities {
        ($($n:literal),+) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<arity_ $n>]() {
                        check($n);
                    }
                )+
            }
        };
    }

    arities!(2, 3, 4, 5, 6, 7, 8);
}

mod classes {
    use super::*;

    const SOURCE: &str = r#"
        #nullable enable
        namespace Results;

        [Either]
        public sealed partial class Result<TOk, TError> where TOk : notnull where TError : notnull
        {
        }
    "#;

    #[test]
    fn reference_unions() {
        assert_contains!(
            unit(SOURCE),
            "public sealed partial class Result<TOk, TError> : global::System.IEquatable<Result<TOk, TError>>",
            "public static bool operator ==(Result<TOk, TError>? left, Result<TOk, TError>? right)",
            "if (global::System.Object.ReferenceEquals(left, right))",
            "public bool Equals(Result<TOk, TError>? other)",
            "public override bool Equals(object? obj) => obj is Result<TOk, TError> other && Equals(other);",
        );
    }

    #[test]
    fn map_and_bind_per_parameter() {
        assert_contains!(
            unit(SOURCE),
            "public Result<TNew, TError> MapOk<TNew>(",
            "public Result<TOk, TNew> MapError<TState, TNew>(TState state,",
            "public async global::System.Threading.Tasks.Task<Result<TNew, TError>> BindOkAsync<TNew>(",
            "where TNew : notnull",
        );
    }
}

mod members {
    use super::*;

    #[test]
    fn selection_and_coupling() {
        let source = unit(
            r#"
            [Either(Members = GenerateMembers.SwitchAsync | GenerateMembers.Map)]
            public partial struct Of<T1, T2> { }
            "#,
        );
        assert_contains!(source, "SwitchAsync(", "MatchAsync<TResult>(", "Map1<TNew>(");
        assert!(!source.contains("public TResult Match<TResult>("));
        assert!(!source.contains("TryPick"));
        assert!(!source.contains("Bind"));
        assert!(!source.contains("public byte Index"));
    }

    #[test]
    fn user_members_are_not_regenerated() {
        let source = unit(
            r#"
            [Either]
            public partial struct Of<T1, T2>
            {
                public Of(T1 value) { _index = 1; _value1 = value; _value2 = default; }
                public override string ToString() => "of";
                public byte Index => 0;
            }
            "#,
        );
        assert_eq!(source.matches("public Of(").count(), 1);
        assert!(!source.contains("ToString()"));
        assert!(!source.contains("public byte Index"));

        let source = unit(
            r#"
            #nullable enable
            [Either(typeof(string), typeof(int))]
            public readonly partial struct Value
            {
                public override bool Equals(object? obj) => false;
                public bool Equals(int other) => false;
            }
            "#,
        );
        assert_contains!(
            source,
            "global::System.IEquatable<Value>",
            "public bool Equals(Value other)"
        );
        assert!(!source.contains("Equals(object? obj)"));
    }

    #[test]
    fn constructors_match_by_type_identity() {
        let source = unit(
            r#"
            #nullable enable
            using System;

            [Either(typeof(string), typeof(Int32), typeof(global::System.Boolean))]
            public partial class Value
            {
                public Value(System.String text) { }
                public Value(int number) { }
            }
            "#,
        );
        assert!(!source.contains("public Value(string value)"));
        assert!(!source.contains("public Value(int value)"));
        assert_contains!(source, "public Value(bool value)");
    }

    #[test]
    fn remainder_through_sibling() {
        let output = generate(
            r#"
            [Either] public partial struct Of<T1, T2> { }
            [Either] public partial struct Of<T1, T2, T3> { }
            "#,
        );
        assert_eq!(output.units.len(), 2);
        let three = &output.units[1];
        assert_eq!(three.hint_name, "Of`3.g.cs");
        assert_contains!(three.source, "out Of<T1, T2> remainder)", "new Of<T2, T3>(_value2)");
    }
}

mod options {
    use super::*;

    #[test]
    fn plain_output() {
        let options = GeneratorOptions {
            banner: false,
            generated_code_attribute: false,
            documentation: false,
            printer: eithergen::cs::PrinterConfig { indentation: 2 },
            ..Default::default()
        };
        let output = generate_source(
            "[Either] partial struct Of<T1, T2> { }",
            &ParseOptions::default(),
            &options,
        )
        .unwrap();
        let source = &output.units[0].source;
        assert!(source.starts_with("#nullable enable\n\npartial struct Of<T1, T2>"));
        assert!(source.contains("\n  private readonly byte _index;\n"));
        assert!(!source.contains("GeneratedCode"));
        assert!(!source.contains("///"));
    }

    #[test]
    fn custom_marker() {
        let parse = ParseOptions {
            marker: "Union".to_string(),
            ..Default::default()
        };
        let output = generate_source(
            "[Union] partial struct A<T1, T2> { } [Either] partial struct B<T1, T2> { }",
            &parse,
            &GeneratorOptions::default(),
        )
        .unwrap();
        assert_eq!(output.units.len(), 1);
        assert_eq!(output.units[0].hint_name, "A`2.g.cs");
    }
}

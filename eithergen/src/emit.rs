//! Turns synthesized members into one C# source file per union.

use eithergen_syntax::model::Declaration;
use serde::{Deserialize, Serialize};

use crate::{
    GenerateError, GeneratorOptions,
    cs::{Attribute, CompilationUnit, Expr, Member, Printer, TypeDecl, types},
    union::UnionDeclaration,
};

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratedUnit {
    /// Unique per union, e.g. ``Shapes.Outer.Shape`2.g.cs``.
    pub hint_name: String,
    pub source: String,
}

fn with_arity(name: &str, arity: usize) -> String {
    if arity == 0 {
        name.to_string()
    } else {
        format!("{name}`{arity}")
    }
}

pub fn hint_name(declaration: &Declaration) -> String {
    let mut parts = vec![];
    if let Some(namespace) = &declaration.namespace {
        parts.push(namespace.clone());
    }
    for containing in &declaration.containing_types {
        parts.push(with_arity(&containing.name, containing.arity()));
    }
    parts.push(with_arity(
        &declaration.header.name,
        declaration.header.arity(),
    ));
    format!("{}.g.cs", parts.join("."))
}

fn banner(options: &GeneratorOptions) -> Option<String> {
    options.banner.then(|| {
        format!(
            "<auto-generated/>\nGenerated by {} {}. Changes to this file will be lost when it is regenerated.",
            options.tool_name, options.tool_version
        )
    })
}

fn generated_code(options: &GeneratorOptions) -> Attribute {
    Attribute::new(
        types::GENERATED_CODE,
        vec![
            Expr::str(options.tool_name.as_str()),
            Expr::str(options.tool_version.as_str()),
        ],
    )
}

pub fn emit(
    union: &UnionDeclaration,
    members: Vec<Member>,
    options: &GeneratorOptions,
) -> Result<GeneratedUnit, GenerateError> {
    let members = members
        .into_iter()
        .map(|mut member| {
            if !options.documentation {
                member.doc.clear();
            }
            if options.generated_code_attribute {
                member.attributes.insert(0, generated_code(options));
            }
            member
        })
        .collect();

    let mut declaration = TypeDecl {
        header: union.header.target.clone(),
        base_types: vec![types::equatable(union.self_type())],
        members,
        nested: None,
    };
    for containing in union.header.containing.iter().rev() {
        declaration = TypeDecl {
            header: containing.clone(),
            base_types: vec![],
            members: vec![],
            nested: Some(Box::new(declaration)),
        };
    }

    let unit = CompilationUnit {
        banner: banner(options),
        usings: union.declaration.usings.clone(),
        namespace: union.declaration.namespace.clone(),
        declaration,
    };

    let mut source = String::new();
    Printer::new(&mut source, options.printer).print_unit(&unit)?;

    Ok(GeneratedUnit {
        hint_name: hint_name(&union.declaration),
        source,
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::synth::testing;

    const SOURCE: &str = r#"
        using System;

        namespace Shapes
        {
            public static partial class Outer<TTag>
            {
                [Either]
                public readonly partial struct Shape<TCircle, TSquare> { }
            }
        }
    "#;

    #[test]
    fn hint_names_include_arity() {
        let union = testing::union(SOURCE);
        assert_eq!(
            hint_name(&union.declaration),
            "Shapes.Outer`1.Shape`2.g.cs"
        );
    }

    #[test]
    fn unit_layout() {
        let union = testing::union(SOURCE);
        let options = GeneratorOptions {
            tool_version: "1.0.0".to_string(),
            ..Default::default()
        };
        let unit = emit(&union, vec![], &options).unwrap();
        assert_eq!(
            unit.source,
            "// <auto-generated/>\n\
             // Generated by eithergen 1.0.0. Changes to this file will be lost when it is regenerated.\n\
             #nullable enable\n\
             \n\
             using System;\n\
             \n\
             namespace Shapes\n\
             {\n    \
                 public static partial class Outer<TTag>\n    \
                 {\n        \
                     public readonly partial struct Shape<TCircle, TSquare> : global::System.IEquatable<Shape<TCircle, TSquare>>\n        \
                     {\n        \
                     }\n    \
                 }\n\
             }\n"
        );
    }

    #[test]
    fn members_are_annotated() {
        let union = testing::union(SOURCE);
        let members = testing::members(crate::synth::SYNTHESIZERS[3], &union);
        let options = GeneratorOptions {
            tool_version: "1.0.0".to_string(),
            documentation: false,
            ..Default::default()
        };
        let unit = emit(&union, members, &options).unwrap();
        assert!(unit.source.contains(
            "[global::System.CodeDom.Compiler.GeneratedCode(\"eithergen\", \"1.0.0\")]\n            \
             public byte Index => _index;\n"
        ));
        assert!(!unit.source.contains("<summary>"));
    }
}

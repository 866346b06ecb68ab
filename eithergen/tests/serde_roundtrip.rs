use eithergen::{CancellationToken, GenerateError, Generator, GeneratorOptions, GeneratorOutput};
use eithergen_syntax::{ParseOptions, model::Declaration};

const SOURCE: &str = r#"
    #nullable enable
    namespace Shapes
    {
        [Either]
        public readonly partial struct Shape<TCircle, TSquare> where TCircle : notnull where TSquare : notnull { }

        [Either(typeof(int), typeof(int))]
        public partial struct Broken { }
    }
"#;

#[test]
fn declarations_from_json() -> anyhow::Result<()> {
    let declarations = eithergen_syntax::declarations(SOURCE, &ParseOptions::default())?;
    let json = serde_json::to_string(&declarations)?;
    let received: Vec<Declaration> = serde_json::from_str(&json)?;
    assert_eq!(received, declarations);

    let generator = Generator::default();
    let cancel = CancellationToken::new();
    assert_eq!(
        generator.generate(&received, &cancel)?,
        generator.generate(&declarations, &cancel)?
    );
    Ok(())
}

#[test]
fn output_to_json() -> anyhow::Result<()> {
    let declarations = eithergen_syntax::declarations(SOURCE, &ParseOptions::default())?;
    let output = Generator::default().generate(&declarations, &CancellationToken::new())?;

    let value = serde_json::to_value(&output)?;
    assert_eq!(value["units"][0]["hint_name"], "Shapes.Shape`2.g.cs");
    assert_eq!(value["diagnostics"][0]["kind"]["TypeAlreadyUsed"]["ty"], "int");

    let back: GeneratorOutput = serde_json::from_value(value)?;
    assert_eq!(back, output);
    Ok(())
}

#[test]
fn options_from_json() -> anyhow::Result<()> {
    let options: GeneratorOptions = serde_json::from_str(
        r#"{ "tool_name": "shapes", "tool_version": "2.1.0", "printer": { "indentation": 2 } }"#,
    )?;
    let declarations = eithergen_syntax::declarations(SOURCE, &ParseOptions::default())?;
    let output = Generator::new(options).generate(&declarations, &CancellationToken::new())?;
    assert!(output.units[0].source.contains("// Generated by shapes 2.1.0."));
    assert!(output.units[0].source.contains("GeneratedCode(\"shapes\", \"2.1.0\")"));
    Ok(())
}

#[test]
fn cancelled_pass() {
    let declarations =
        eithergen_syntax::declarations(SOURCE, &ParseOptions::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(matches!(
        Generator::default().generate(&declarations, &cancel),
        Err(GenerateError::Cancelled)
    ));
}

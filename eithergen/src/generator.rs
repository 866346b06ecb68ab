//! The driver: one pass over a compilation's union declarations.

use std::collections::{HashMap, HashSet};

use eithergen_syntax::{ParseOptions, model::Declaration};
use serde::{Deserialize, Serialize};

use crate::{
    CancellationToken, Diagnostic, GenerateError, GeneratorOptions,
    emit::{self, GeneratedUnit},
    synth::{self, SynthContext},
    union::UnionDeclaration,
};

/// What a single declaration produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Generated(GeneratedUnit),
    /// The declaration is invalid and nothing was generated for it.
    Rejected(Vec<Diagnostic>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOutput {
    pub units: Vec<GeneratedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratorOutput {
    fn push(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Generated(unit) => {
                if self.units.iter().any(|existing| existing.hint_name == unit.hint_name) {
                    log::debug!("`{}` was already generated in this pass", unit.hint_name);
                } else {
                    self.units.push(unit);
                }
            }
            Outcome::Rejected(diagnostics) => self.diagnostics.extend(diagnostics),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn generate_one(
        &self,
        declaration: &Declaration,
        cancel: &CancellationToken,
    ) -> Result<Outcome, GenerateError> {
        let union = match UnionDeclaration::build(declaration, cancel)? {
            Ok(union) => union,
            Err(diagnostics) => {
                for diagnostic in &diagnostics {
                    log::debug!("`{}`: {diagnostic}", declaration.qualified_name());
                }
                return Ok(Outcome::Rejected(diagnostics));
            }
        };

        let ctx = SynthContext::new(&union, &self.options, cancel);
        let members = synth::synthesize(&ctx)?;
        let unit = emit::emit(&union, members, &self.options)?;
        log::debug!("generated `{}`", unit.hint_name);
        Ok(Outcome::Generated(unit))
    }

    /// Generates every declaration. Cancellation abandons the whole pass.
    pub fn generate(
        &self,
        declarations: &[Declaration],
        cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, GenerateError> {
        let mut output = GeneratorOutput::default();
        for declaration in declarations {
            cancel.check()?;
            output.push(self.generate_one(declaration, cancel)?);
        }
        Ok(output)
    }
}

/// A [`Generator`] that remembers the outcome for each declaration across
/// passes. Outcomes only depend on the declaration and the options, so the
/// output of a pass is the same with or without the cache.
#[derive(Debug, Default)]
pub struct IncrementalGenerator {
    generator: Generator,
    cache: HashMap<Declaration, Outcome>,
}

impl IncrementalGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            generator: Generator::new(options),
            cache: HashMap::new(),
        }
    }

    /// The number of remembered declarations.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Like [`Generator::generate`]. Declarations not seen in this pass are
    /// forgotten; a cancelled pass leaves the cache as it was.
    pub fn generate(
        &mut self,
        declarations: &[Declaration],
        cancel: &CancellationToken,
    ) -> Result<GeneratorOutput, GenerateError> {
        let mut fresh = HashMap::with_capacity(declarations.len());
        let mut seen = HashSet::new();
        let mut output = GeneratorOutput::default();
        let mut hits = 0usize;

        for declaration in declarations {
            cancel.check()?;
            if !seen.insert(declaration) {
                continue;
            }
            let outcome = match self.cache.get(declaration) {
                Some(outcome) => {
                    hits += 1;
                    outcome.clone()
                }
                None => self.generator.generate_one(declaration, cancel)?,
            };
            output.push(outcome.clone());
            fresh.insert(declaration.clone(), outcome);
        }

        log::debug!(
            "{hits} of {} declaration(s) reused, {} forgotten",
            seen.len(),
            self.cache.keys().filter(|key| !seen.contains(key)).count()
        );
        self.cache = fresh;
        Ok(output)
    }
}

/// Parses, binds and generates a single C# source file.
pub fn generate_source(
    source: &str,
    parse: &ParseOptions,
    options: &GeneratorOptions,
) -> Result<GeneratorOutput, GenerateError> {
    let declarations = eithergen_syntax::declarations(source, parse)?;
    Generator::new(options.clone()).generate(&declarations, &CancellationToken::new())
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = r#"
        [Either] public partial struct Pair<T1, T2> { }
        [Either] public struct Broken<T1, T2> { }
    "#;

    #[test]
    fn valid_and_invalid_declarations() {
        let output =
            generate_source(SOURCE, &ParseOptions::default(), &GeneratorOptions::default())
                .unwrap();
        assert_eq!(output.units.len(), 1);
        assert_eq!(output.units[0].hint_name, "Pair`2.g.cs");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].id(), "EG0001");
    }

    #[test]
    fn incremental_reuses_and_evicts() {
        let declarations =
            eithergen_syntax::declarations(SOURCE, &ParseOptions::default()).unwrap();
        let cancel = CancellationToken::new();
        let mut generator = IncrementalGenerator::default();

        let first = generator.generate(&declarations, &cancel).unwrap();
        assert_eq!(generator.cached(), 2);
        let second = generator.generate(&declarations, &cancel).unwrap();
        assert_eq!(first, second);

        generator.generate(&declarations[..1], &cancel).unwrap();
        assert_eq!(generator.cached(), 1);
    }

    #[test]
    fn cancellation_keeps_the_cache() {
        let declarations =
            eithergen_syntax::declarations(SOURCE, &ParseOptions::default()).unwrap();
        let mut generator = IncrementalGenerator::default();
        generator
            .generate(&declarations, &CancellationToken::new())
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            generator.generate(&declarations[..1], &cancel),
            Err(GenerateError::Cancelled)
        ));
        assert_eq!(generator.cached(), 2);
    }
}

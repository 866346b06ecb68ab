//! Member synthesizers.
//!
//! Every generated member family is a [`Synthesizer`]. They all read the same
//! [`SynthContext`] and never see each other's output; [`synthesize`] runs
//! them in [`SYNTHESIZERS`] order, which is the order members appear in the
//! generated type.

mod binding;
mod constructors;
mod equality;
mod fields;
mod flavor;
mod index;
mod mapping;
mod matching;
mod object;
mod operators;
mod serialization;
mod switching;
mod try_pick;

use eithergen_syntax::model::TypeRef;

use crate::{
    CancellationToken, GenerateError, GenerateMembers, GeneratorOptions,
    cs::{Expr, Literal, Member, Modifier, Stmt, SwitchArm, types},
    union::{UnionDeclaration, Variant},
};

pub use flavor::Flavor;

/// Immutable inputs shared by every synthesizer for one union.
#[derive(Debug, Clone, Copy)]
pub struct SynthContext<'a> {
    pub union: &'a UnionDeclaration,
    /// The effective selection, see [`GenerateMembers::effective`].
    pub members: GenerateMembers,
    pub options: &'a GeneratorOptions,
    pub cancel: &'a CancellationToken,
}

impl<'a> SynthContext<'a> {
    pub fn new(
        union: &'a UnionDeclaration,
        options: &'a GeneratorOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            union,
            members: union.members.effective(),
            options,
            cancel,
        }
    }

    pub fn variants(&self) -> &'a [Variant] {
        &self.union.variants
    }

    pub fn check(&self) -> Result<(), GenerateError> {
        self.cancel.check()
    }
}

pub trait Synthesizer: Sync {
    fn name(&self) -> &'static str;

    fn applies(&self, _ctx: &SynthContext) -> bool {
        true
    }

    fn synthesize(&self, ctx: &SynthContext) -> Result<Vec<Member>, GenerateError>;
}

pub const SYNTHESIZERS: &[&dyn Synthesizer] = &[
    &fields::Fields,
    &constructors::Constructors,
    &serialization::Serialization,
    &index::IndexProperty,
    &operators::Operators,
    &object::ObjectOverrides,
    &equality::Equality,
    &try_pick::TryPick,
    &matching::Matching,
    &switching::Switching,
    &mapping::Mapping,
    &binding::Binding,
];

/// Runs every applicable synthesizer.
pub fn synthesize(ctx: &SynthContext) -> Result<Vec<Member>, GenerateError> {
    let mut members = vec![];
    for synthesizer in SYNTHESIZERS {
        ctx.check()?;
        if !synthesizer.applies(ctx) {
            log::trace!("{} skipped for `{}`", synthesizer.name(), ctx.union.name());
            continue;
        }
        let generated = synthesizer.synthesize(ctx)?;
        log::trace!(
            "{} produced {} member(s) for `{}`",
            synthesizer.name(),
            generated.len(),
            ctx.union.name()
        );
        members.extend(generated);
    }
    Ok(members)
}

pub(crate) const INDEX_FIELD: &str = "_index";

pub(crate) fn index() -> Expr {
    Expr::ident(INDEX_FIELD)
}

pub(crate) fn discriminant(variant: &Variant) -> Expr {
    Expr::Literal(Literal::Int(variant.index as i64))
}

pub(crate) fn public() -> Vec<Modifier> {
    vec![Modifier::Public]
}

/// The exception thrown when the discriminant matches no variant, which
/// only happens for a `default` instance.
pub(crate) fn invalid_state() -> Expr {
    Expr::new_object(
        types::system("InvalidOperationException"),
        vec![Expr::str(
            "The union does not hold a value, it was not created through one of its constructors.",
        )],
    )
}

/// `_index switch { 1 => ..., _ => throw ... }`
pub(crate) fn index_switch(arms: impl IntoIterator<Item = (Expr, Expr)>) -> Expr {
    let mut arms: Vec<SwitchArm> = arms
        .into_iter()
        .map(|(pattern, value)| SwitchArm {
            pattern: Some(pattern),
            value,
        })
        .collect();
    arms.push(SwitchArm {
        pattern: None,
        value: invalid_state().throw(),
    });
    Expr::Switch {
        subject: Box::new(index()),
        arms,
    }
}

/// Null guards for every continuation parameter.
pub(crate) fn guard_continuations(variants: &[Variant]) -> Vec<Stmt> {
    variants
        .iter()
        .map(|variant| Stmt::guard_null(&variant.continuation()))
        .collect()
}

/// Escapes text for an XML doc comment.
pub(crate) fn xml(text: impl std::fmt::Display) -> String {
    text.to_string()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn doc_type(ty: &TypeRef) -> String {
    format!("<c>{}</c>", xml(ty))
}

#[cfg(test)]
pub(crate) mod testing {
    use eithergen_syntax::ParseOptions;

    use super::*;
    use crate::cs::{Printer, PrinterConfig};

    pub fn union(source: &str) -> UnionDeclaration {
        let declarations = eithergen_syntax::declarations(source, &ParseOptions::default()).unwrap();
        UnionDeclaration::build(&declarations[0], &CancellationToken::new())
            .unwrap()
            .unwrap()
    }

    pub fn members(synthesizer: &dyn Synthesizer, union: &UnionDeclaration) -> Vec<Member> {
        let options = GeneratorOptions::default();
        let cancel = CancellationToken::new();
        let ctx = SynthContext::new(union, &options, &cancel);
        if synthesizer.applies(&ctx) {
            synthesizer.synthesize(&ctx).unwrap()
        } else {
            vec![]
        }
    }

    /// Prints members without documentation, one after another.
    pub fn render(synthesizer: &dyn Synthesizer, union: &UnionDeclaration) -> String {
        let mut out = String::new();
        let mut printer = Printer::new(&mut out, PrinterConfig::default());
        for mut member in members(synthesizer, union) {
            member.doc.clear();
            printer.print_member(&member).unwrap();
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = r#"
        #nullable enable
        [Either]
        public readonly partial struct Result<TOk, TError> where TOk : notnull where TError : notnull
        {
        }
    "#;

    #[test]
    fn registry_order() {
        let names: Vec<&str> = SYNTHESIZERS.iter().map(|synthesizer| synthesizer.name()).collect();
        assert_eq!(
            names,
            [
                "fields",
                "constructors",
                "serialization",
                "index",
                "operators",
                "object",
                "equality",
                "try_pick",
                "match",
                "switch",
                "map",
                "bind",
            ]
        );
    }

    #[test]
    fn cancelled_synthesis_fails() {
        let union = testing::union(SOURCE);
        let options = GeneratorOptions::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = SynthContext::new(&union, &options, &cancel);
        assert!(matches!(synthesize(&ctx), Err(GenerateError::Cancelled)));
    }

    #[test]
    fn selection_limits_members() {
        let mut union = testing::union(SOURCE);
        union.members = GenerateMembers::none();
        let options = GeneratorOptions::default();
        let cancel = CancellationToken::new();
        let members = synthesize(&SynthContext::new(&union, &options, &cancel)).unwrap();
        let names: Vec<&str> = members.iter().map(Member::name).collect();
        assert!(!names.contains(&"Match"));
        assert!(!names.contains(&"TryPick"));
        assert!(!names.contains(&"Index"));
        assert!(names.contains(&"Equals"));
        assert!(names.contains(&"_index"));
    }

    #[test]
    fn xml_escapes_generics() {
        assert_eq!(xml("List<int>"), "List&lt;int&gt;");
    }
}

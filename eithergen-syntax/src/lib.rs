//! C# declaration front-end for `eithergen`.
//!
//! This crate plays the part of the host compiler: it reads C# source, keeps
//! only what the union engine needs (type headers, type parameters and their
//! constraints, marker attributes, constructor signatures, member names, the
//! `#nullable` state) and binds every type reference to a [`TypeKind`].
//!
//! Source is lexed with [`proc_macro2`] and parsed with [`syn`]'s
//! [`ParseStream`](syn::parse::ParseStream) machinery. C# and Rust share
//! enough token structure for declarations; member bodies are skipped as
//! balanced groups.
//!
//! ```
//! # use eithergen_syntax::{ParseOptions, declarations};
//! let source = r#"
//!     #nullable enable
//!     namespace Shapes;
//!
//!     [Either]
//!     public readonly partial struct Shape<TCircle, TSquare>
//!         where TCircle : notnull
//!         where TSquare : struct
//!     {
//!     }
//! "#;
//!
//! let declarations = declarations(source, &ParseOptions::default()).unwrap();
//! assert_eq!(declarations.len(), 1);
//! assert_eq!(declarations[0].qualified_name(), "Shapes.Shape");
//! assert_eq!(declarations[0].type_parameters.len(), 2);
//! ```
//!
//! ### Lexing
//! The lexer is Rust's. C# literals it cannot read (verbatim, raw and
//! interpolated strings, `\u` escapes, character literals) are rewritten into
//! plain string literals first, and free text after `#region` or `#error` is
//! dropped. Line numbers are unchanged, columns after a rewritten literal on
//! the same line may shift.
//!
//! [`TypeKind`]: model::TypeKind

use proc_macro2::TokenStream;
use serde::{Deserialize, Serialize};
use syn::parse::{ParseStream, Parser as _};

pub mod bind;
mod literals;
pub mod model;
mod parsing;
pub mod tree;

pub use bind::bind;
use model::{Declaration, NullableContext};
use tree::CompilationUnit;

/// Front-end configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Name of the marker attribute, without the `Attribute` suffix.
    pub marker: String,
    /// The project-wide `<Nullable>` setting, restored by `#nullable restore`.
    pub nullable_context: NullableContext,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            marker: "Either".to_string(),
            nullable_context: NullableContext::Unspecified,
        }
    }
}

pub fn parse_str(source: &str, options: &ParseOptions) -> syn::Result<CompilationUnit> {
    let source = literals::mask(source);
    let tokens: TokenStream = source.parse().map_err(|error: proc_macro2::LexError| {
        syn::Error::new(
            proc_macro2::Span::call_site(),
            format!("failed to tokenize C# source: {error}"),
        )
    })?;
    parse2(tokens, options)
}

pub fn parse2(tokens: TokenStream, options: &ParseOptions) -> syn::Result<CompilationUnit> {
    let parser = parsing::SourceParser::new(options.nullable_context);
    (|input: ParseStream| parser.parse_unit(input)).parse2(tokens)
}

/// Parses and binds a single source file.
pub fn declarations(source: &str, options: &ParseOptions) -> syn::Result<Vec<Declaration>> {
    let unit = parse_str(source, options)?;
    Ok(bind(&[unit], options))
}

/// Parses every file of a compilation and binds them together, so types
/// declared in one file resolve in another. Errors from all files are
/// reported together.
pub fn compilation<'a>(
    sources: impl IntoIterator<Item = &'a str>,
    options: &ParseOptions,
) -> syn::Result<Vec<Declaration>> {
    let mut units = vec![];
    let mut error: Option<syn::Error> = None;

    for source in sources {
        match parse_str(source, options) {
            Ok(unit) => units.push(unit),
            Err(e) => match &mut error {
                Some(error) => error.combine(e),
                None => error = Some(e),
            },
        }
    }

    match error {
        Some(error) => Err(error),
        None => Ok(bind(&units, options)),
    }
}

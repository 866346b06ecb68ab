//! Synthesizes closed discriminated unions for C# partial types.
//!
//! A type marked `[Either]` gets a constructor, an implicit conversion, a
//! `TryPick` and a `Match` continuation per variant, along with equality,
//! hashing, `ToString` and (for generic unions) `Map` and `Bind`. The
//! variants come from one of three places:
//!
//! ```csharp
//! [Either] partial struct Result<TOk, TError> { }               // type parameters
//! [Either(typeof(string), typeof(int))] partial struct Id { }  // typeof arguments
//! [Either<string, int>] partial struct Key { }                  // generic attribute
//! ```
//!
//! The engine works on [`Declaration`]s from the host, which
//! [`eithergen_syntax`] can produce from C# source:
//!
//! ```
//! # use eithergen::{GeneratorOptions, generate_source};
//! # use eithergen_syntax::ParseOptions;
//! let source = r#"
//!     #nullable enable
//!     namespace Geometry;
//!
//!     [Either]
//!     public readonly partial struct Shape<TCircle, TSquare>
//!         where TCircle : notnull
//!         where TSquare : notnull
//!     {
//!     }
//! "#;
//!
//! let output = generate_source(source, &ParseOptions::default(), &GeneratorOptions::default())?;
//! assert!(output.diagnostics.is_empty());
//! assert_eq!(output.units[0].hint_name, "Geometry.Shape`2.g.cs");
//! assert!(output.units[0].source.contains("public TResult Match<TResult>("));
//! # Ok::<(), eithergen::GenerateError>(())
//! ```
//!
//! ### Nullability
//! Every variant is classified once, from its annotation, the `#nullable`
//! context and its type parameter constraints. Field types, parameter types,
//! null guards and how a slot is dereferenced all follow from that single
//! classification, so the generated members agree with each other.
//!
//! ### Invalid declarations
//! Problems with a declaration are reported as [`Diagnostic`]s and nothing is
//! generated for it. [`GenerateError`] is reserved for the pass itself
//! failing, such as on cancellation.
//!
//! [`Declaration`]: eithergen_syntax::model::Declaration

mod cancel;
pub mod classify;
pub mod cs;
mod diagnostic;
pub mod emit;
mod error;
pub mod generator;
mod options;
pub mod resolve;
pub mod synth;
pub mod union;
pub mod validate;

pub use cancel::CancellationToken;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use emit::GeneratedUnit;
pub use error::GenerateError;
pub use generator::{Generator, GeneratorOutput, IncrementalGenerator, Outcome, generate_source};
pub use options::{GenerateMembers, GeneratorOptions};
pub use union::UnionDeclaration;

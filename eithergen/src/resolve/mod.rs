//! Decides where a union's variants come from.
//!
//! Each strategy's resolver reports [`Outcome::Empty`] when the declaration
//! does not use it. [`arbitrate`] folds the three outcomes into a single
//! [`Parametrization`].

mod explicit;
mod generic;
mod generic_attr;

use eithergen_syntax::model::{Declaration, Location, TypeRef};
use serde::{Deserialize, Serialize};

use crate::{Diagnostic, DiagnosticKind};

pub const MIN_VARIANTS: usize = 2;
pub const MAX_VARIANTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// `[Either] partial struct Name<T1, T2>`
    Generic,
    /// `[Either(typeof(A), typeof(B))]`
    ExplicitTypes,
    /// `[Either<A, B>]`
    GenericAttribute,
}

/// A variant type before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ty: TypeRef,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Empty,
    Populated(Vec<Candidate>),
    Failed(Diagnostic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parametrization {
    Generic(Vec<Candidate>),
    ExplicitTypes(Vec<Candidate>),
    GenericAttribute(Vec<Candidate>),
    None,
    Ambiguous,
}

impl Parametrization {
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Self::Generic(_) => Some(Strategy::Generic),
            Self::ExplicitTypes(_) => Some(Strategy::ExplicitTypes),
            Self::GenericAttribute(_) => Some(Strategy::GenericAttribute),
            Self::None | Self::Ambiguous => None,
        }
    }

    /// The authoritative candidates, or the diagnostic for `None` and
    /// `Ambiguous`.
    pub fn into_candidates(
        self,
        declaration: &Declaration,
    ) -> Result<(Strategy, Vec<Candidate>), Diagnostic> {
        let name = declaration.header.name.clone();
        match self {
            Self::Generic(candidates) => Ok((Strategy::Generic, candidates)),
            Self::ExplicitTypes(candidates) => Ok((Strategy::ExplicitTypes, candidates)),
            Self::GenericAttribute(candidates) => Ok((Strategy::GenericAttribute, candidates)),
            Self::None => Err(Diagnostic::new(
                DiagnosticKind::NoTypeParameterSpecified { name },
                declaration.location(),
            )),
            Self::Ambiguous => Err(Diagnostic::new(
                DiagnosticKind::AmbiguousTypeParameters { name },
                declaration.location(),
            )),
        }
    }
}

/// Runs the resolvers in order and combines their outcomes. The first
/// failure wins; otherwise the number of populated strategies decides.
pub fn arbitrate(declaration: &Declaration) -> Result<Parametrization, Diagnostic> {
    let outcomes = [
        (Strategy::Generic, generic::resolve(declaration)),
        (Strategy::ExplicitTypes, explicit::resolve(declaration)),
        (Strategy::GenericAttribute, generic_attr::resolve(declaration)),
    ];

    let mut populated = vec![];
    for (strategy, outcome) in outcomes {
        match outcome {
            Outcome::Empty => {}
            Outcome::Populated(candidates) => populated.push((strategy, candidates)),
            Outcome::Failed(diagnostic) => return Err(diagnostic),
        }
    }

    let parametrization = match populated.len() {
        0 => Parametrization::None,
        1 => match populated.pop() {
            Some((Strategy::Generic, candidates)) => Parametrization::Generic(candidates),
            Some((Strategy::ExplicitTypes, candidates)) => Parametrization::ExplicitTypes(candidates),
            Some((Strategy::GenericAttribute, candidates)) => {
                Parametrization::GenericAttribute(candidates)
            }
            None => Parametrization::None,
        },
        _ => {
            log::debug!(
                "`{}` specifies variants with {:?}",
                declaration.qualified_name(),
                populated.iter().map(|(strategy, _)| *strategy).collect::<Vec<_>>()
            );
            Parametrization::Ambiguous
        }
    };
    Ok(parametrization)
}

pub fn check_arity(declaration: &Declaration, count: usize) -> Result<(), Diagnostic> {
    let name = declaration.header.name.clone();
    let kind = if count < MIN_VARIANTS {
        DiagnosticKind::TooFewTypeParameters { name, count }
    } else if count > MAX_VARIANTS {
        DiagnosticKind::TooManyTypeParameters { name, count }
    } else {
        return Ok(());
    };
    Err(Diagnostic::new(kind, declaration.location()))
}

/// Rejects a second marker of the same form.
fn single_marker<'a, T>(
    declaration: &Declaration,
    mut markers: impl Iterator<Item = &'a T>,
    location: impl Fn(&T) -> Location,
) -> Result<Option<&'a T>, Diagnostic> {
    let first = markers.next();
    match markers.next() {
        Some(second) => Err(Diagnostic::new(
            DiagnosticKind::AmbiguousTypeParameters {
                name: declaration.header.name.clone(),
            },
            location(second),
        )),
        None => Ok(first),
    }
}

#[cfg(test)]
mod test {
    use eithergen_syntax::model::{
        AttributeArgument, DeclKind, MarkerAttribute, Predefined, TypeHeader, TypeParameter,
    };

    use super::*;

    fn declaration(type_parameters: &[&str], markers: Vec<MarkerAttribute>) -> Declaration {
        let mut header = TypeHeader::new(DeclKind::Struct, "Shape");
        header.type_parameters = type_parameters.iter().map(ToString::to_string).collect();
        let mut declaration = Declaration::new(header);
        declaration.type_parameters = type_parameters
            .iter()
            .map(|name| TypeParameter::new(*name))
            .collect();
        declaration.markers = markers;
        declaration
    }

    fn type_of(predefined: Predefined) -> AttributeArgument {
        AttributeArgument::TypeOf {
            ty: TypeRef::Predefined(predefined),
            location: Location::default(),
        }
    }

    #[test]
    fn generic_parameters() {
        let declaration = declaration(&["T1", "T2"], vec![MarkerAttribute::default()]);
        let parametrization = arbitrate(&declaration).unwrap();
        assert_eq!(parametrization.strategy(), Some(Strategy::Generic));
    }

    #[test]
    fn explicit_types() {
        let declaration = declaration(
            &[],
            vec![MarkerAttribute {
                arguments: vec![type_of(Predefined::Int), type_of(Predefined::String)],
                ..Default::default()
            }],
        );
        let (strategy, candidates) = arbitrate(&declaration)
            .unwrap()
            .into_candidates(&declaration)
            .unwrap();
        assert_eq!(strategy, Strategy::ExplicitTypes);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn generic_and_explicit_is_ambiguous() {
        let declaration = declaration(
            &["T1", "T2"],
            vec![MarkerAttribute {
                arguments: vec![type_of(Predefined::Int), type_of(Predefined::String)],
                ..Default::default()
            }],
        );
        assert_eq!(arbitrate(&declaration).unwrap(), Parametrization::Ambiguous);
    }

    #[test]
    fn nothing_specified() {
        let declaration = declaration(&[], vec![MarkerAttribute::default()]);
        let error = arbitrate(&declaration)
            .unwrap()
            .into_candidates(&declaration)
            .unwrap_err();
        assert_eq!(error.id(), "EG0006");
    }

    #[test]
    fn failures_win_over_counting() {
        let declaration = declaration(
            &["T1", "T2"],
            vec![MarkerAttribute {
                arguments: vec![AttributeArgument::Other {
                    text: "\"int\"".to_string(),
                    location: Location::default(),
                }],
                ..Default::default()
            }],
        );
        assert_eq!(arbitrate(&declaration).unwrap_err().id(), "EG0009");
    }

    #[test]
    fn arity_limits() {
        let declaration = declaration(&[], vec![]);
        assert_eq!(check_arity(&declaration, 1).unwrap_err().id(), "EG0004");
        assert!(check_arity(&declaration, 2).is_ok());
        assert!(check_arity(&declaration, 8).is_ok());
        assert_eq!(check_arity(&declaration, 9).unwrap_err().id(), "EG0005");
    }
}

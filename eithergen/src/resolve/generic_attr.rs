use eithergen_syntax::model::Declaration;

use super::{Candidate, Outcome, single_marker};

/// Variants are type arguments of a generic marker, `[Either<A, B>]`.
pub(super) fn resolve(declaration: &Declaration) -> Outcome {
    let markers = declaration
        .markers
        .iter()
        .filter(|marker| !marker.type_arguments.is_empty());

    match single_marker(declaration, markers, |marker| marker.location) {
        Ok(Some(marker)) => Outcome::Populated(
            marker
                .type_arguments
                .iter()
                .map(|ty| Candidate {
                    ty: ty.clone(),
                    location: marker.location,
                })
                .collect(),
        ),
        Ok(None) => Outcome::Empty,
        Err(diagnostic) => Outcome::Failed(diagnostic),
    }
}

use eithergen_syntax::model::{AttributeArgument, Declaration};

use super::{Candidate, Outcome, single_marker};
use crate::{Diagnostic, DiagnosticKind};

/// Variants are `typeof` arguments of the marker.
pub(super) fn resolve(declaration: &Declaration) -> Outcome {
    let markers = declaration
        .markers
        .iter()
        .filter(|marker| !marker.arguments.is_empty());
    let marker = match single_marker(declaration, markers, |marker| marker.location) {
        Ok(Some(marker)) => marker,
        Ok(None) => return Outcome::Empty,
        Err(diagnostic) => return Outcome::Failed(diagnostic),
    };

    let mut candidates = vec![];
    for argument in &marker.arguments {
        match argument {
            AttributeArgument::TypeOf { ty, location } => candidates.push(Candidate {
                ty: ty.clone(),
                location: *location,
            }),
            AttributeArgument::Other { text, location } => {
                return Outcome::Failed(Diagnostic::new(
                    DiagnosticKind::InvalidVariantArgument {
                        argument: text.clone(),
                    },
                    *location,
                ));
            }
        }
    }
    Outcome::Populated(candidates)
}

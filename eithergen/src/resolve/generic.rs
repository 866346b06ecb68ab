use eithergen_syntax::model::{Declaration, TypeRef};

use super::{Candidate, Outcome};

/// Variants are the declaration's own type parameters.
pub(super) fn resolve(declaration: &Declaration) -> Outcome {
    if declaration.type_parameters.is_empty() {
        return Outcome::Empty;
    }

    Outcome::Populated(
        declaration
            .type_parameters
            .iter()
            .map(|parameter| Candidate {
                ty: TypeRef::TypeParameter(parameter.name.clone()),
                location: parameter.location,
            })
            .collect(),
    )
}

//! Checks that the union and every containing type can receive generated
//! members, and keeps their headers for emission.

use eithergen_syntax::model::{Declaration, TypeHeader};

use crate::{Diagnostic, DiagnosticKind};

/// Header text of the union and its containing types, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedHeader {
    pub containing: Vec<String>,
    pub target: String,
}

/// `public readonly partial struct Name<T1, T2>`, without constraints or
/// base types.
pub fn header_text(header: &TypeHeader) -> String {
    let mut words: Vec<&str> = header
        .modifiers
        .iter()
        .map(|modifier| modifier.keyword())
        .collect();
    words.push(header.kind.keyword());
    format!("{} {}", words.join(" "), header.type_syntax())
}

pub fn validate(declaration: &Declaration) -> Result<ValidatedHeader, Diagnostic> {
    let header = &declaration.header;
    if !header.is_partial() {
        return Err(Diagnostic::new(
            DiagnosticKind::TypeNotPartial {
                name: header.name.clone(),
            },
            header.location,
        ));
    }
    if header.is_static() {
        return Err(Diagnostic::new(
            DiagnosticKind::TypeIsStatic {
                name: header.name.clone(),
            },
            header.location,
        ));
    }

    // static containers are allowed
    if let Some(containing) = declaration
        .containing_types
        .iter()
        .find(|containing| !containing.is_partial())
    {
        return Err(Diagnostic::new(
            DiagnosticKind::TypeNotPartial {
                name: containing.name.clone(),
            },
            containing.location,
        ));
    }

    Ok(ValidatedHeader {
        containing: declaration.containing_types.iter().map(header_text).collect(),
        target: header_text(header),
    })
}

#[cfg(test)]
mod test {
    use eithergen_syntax::model::{DeclKind, Modifier};

    use super::*;

    fn declaration(modifiers: Vec<Modifier>) -> Declaration {
        let mut header = TypeHeader::new(DeclKind::Struct, "Shape");
        header.modifiers = modifiers;
        header.type_parameters = vec!["T1".to_string(), "T2".to_string()];
        Declaration::new(header)
    }

    #[test]
    fn header_keeps_modifiers() {
        let validated = validate(&declaration(vec![
            Modifier::Public,
            Modifier::Readonly,
            Modifier::Partial,
        ]))
        .unwrap();
        assert_eq!(validated.target, "public readonly partial struct Shape<T1, T2>");
    }

    #[test]
    fn rejects_non_partial_and_static() {
        let error = validate(&declaration(vec![Modifier::Public])).unwrap_err();
        assert_eq!(error.id(), "EG0001");

        let error = validate(&declaration(vec![Modifier::Static, Modifier::Partial])).unwrap_err();
        assert_eq!(error.id(), "EG0002");
    }

    #[test]
    fn containing_types_must_be_partial() {
        let mut declaration = declaration(vec![Modifier::Partial]);
        let mut outer = TypeHeader::new(DeclKind::Class, "Outer");
        outer.modifiers = vec![Modifier::Public, Modifier::Static];
        declaration.containing_types.push(outer);

        let error = validate(&declaration).unwrap_err();
        assert_eq!(
            error.kind,
            DiagnosticKind::TypeNotPartial {
                name: "Outer".to_string()
            }
        );
    }
}

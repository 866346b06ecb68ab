/// Failures of a generation pass. Problems with a declaration itself are
/// [`Diagnostic`](crate::Diagnostic)s, not errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation was cancelled")]
    Cancelled,

    #[error("failed to print generated source")]
    Format(#[from] std::fmt::Error),

    #[error("failed to parse C# source: {0}")]
    Parse(#[from] syn::Error),
}

use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// A descriptor declaration that cannot be compiled.
///
/// These are programmer errors: they are reported by
/// [`DescriptorBuilder::build`](super::DescriptorBuilder::build), before
/// any object is serialized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorError {
    #[error("unsupported relationship kind `{kind}` for `{name}` in {descriptor}")]
    UnsupportedKind {
        descriptor: String,
        name: String,
        kind: String,
    },

    #[error("field `{name}` is declared twice in {descriptor}")]
    Duplicate { descriptor: String, name: String },

    #[error("`{name}` names no attribute or relationship of {descriptor}")]
    UnknownField { descriptor: String, name: String },

    #[error("accessor `{name}` names no attribute of {descriptor}")]
    UnknownAttribute { descriptor: String, name: String },
}

use thiserror::Error;

/// The single failure of the translator: a declared type that has no
/// flat ABI representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("the type `{0}` cannot yet be translated into a compatible C type")]
    UnmappedType(String),
}
